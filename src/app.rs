//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and resolves the study configuration
//! - loads the measurement tables and runs the fits
//! - shows the chart and prints the summary once it is closed
//! - writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::cli::{Cli, Command, CompareArgs, StiffnessArgs};
use crate::config::StudyConfig;
use crate::error::{AppError, EXIT_INPUT};
use crate::tui::Screen;

pub mod pipeline;

/// Entry point for the `actuator` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    crate::logging::init_logger();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Stiffness(args) => handle_stiffness(config, args),
        Command::Compare(args) => handle_compare(config, args),
        Command::Config => handle_config(&config),
    }
}

fn load_config(path: Option<&Path>) -> Result<StudyConfig, AppError> {
    match path {
        Some(path) => {
            let config = StudyConfig::load_from_file(path)?;
            log::debug!("loaded study configuration from '{}'", path.display());
            Ok(config)
        }
        None => {
            log::debug!("using built-in study configuration");
            Ok(StudyConfig::default())
        }
    }
}

fn handle_stiffness(study: StudyConfig, args: StiffnessArgs) -> Result<(), AppError> {
    let mut config = study.stiffness;
    override_paths(config.series.iter_mut().map(|s| &mut s.path), &args.files, "stiffness series")?;
    args.style.apply(&mut config.style);
    config.validate()?;

    let run = pipeline::run_stiffness(&config)?;
    let chart = crate::plot::stiffness_chart(&run, &config);

    crate::tui::show(Screen::Stiffness(&chart))?;

    for line in crate::report::format_stiffness_summary(&run) {
        println!("{line}");
    }

    if let Some(path) = &args.export {
        crate::io::export::write_stiffness_json(path, &run)?;
    }
    Ok(())
}

fn handle_compare(study: StudyConfig, args: CompareArgs) -> Result<(), AppError> {
    let mut config = study.comparison;
    override_paths(config.sources.iter_mut().map(|s| &mut s.path), &args.files, "comparison sources")?;
    args.style.apply(&mut config.style);
    config.validate()?;

    let run = pipeline::run_comparison(&config)?;
    log::info!("{}", crate::report::format_comparison_counts(&run));
    let chart = crate::plot::comparison_chart(&run, &config);

    crate::tui::show(Screen::Comparison(&chart))?;

    if let Some(path) = &args.export {
        crate::io::export::write_table_csv(path, &run.combined)?;
    }
    Ok(())
}

fn handle_config(config: &StudyConfig) -> Result<(), AppError> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}

/// Replace configured paths, in order, with the ones given on the command line.
///
/// No files means "keep the configuration"; otherwise the counts must match.
fn override_paths<'a>(
    targets: impl ExactSizeIterator<Item = &'a mut PathBuf>,
    files: &[PathBuf],
    what: &str,
) -> Result<(), AppError> {
    if files.is_empty() {
        return Ok(());
    }
    if targets.len() != files.len() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!(
                "Expected {} CSV paths for the configured {what}, got {}",
                targets.len(),
                files.len()
            ),
        ));
    }
    for (target, file) in targets.zip(files) {
        *target = file.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_files_replace_configured_paths_in_order() {
        let mut config = StudyConfig::default().stiffness;
        let files = [PathBuf::from("a.csv"), PathBuf::from("b.csv")];

        override_paths(config.series.iter_mut().map(|s| &mut s.path), &files, "series").unwrap();

        assert_eq!(config.series[0].path, PathBuf::from("a.csv"));
        assert_eq!(config.series[1].path, PathBuf::from("b.csv"));
        assert_eq!(config.series[0].name, "SSPG");
    }

    #[test]
    fn no_positional_files_keeps_configuration() {
        let mut config = StudyConfig::default().comparison;
        let before: Vec<_> = config.sources.iter().map(|s| s.path.clone()).collect();

        override_paths(config.sources.iter_mut().map(|s| &mut s.path), &[], "sources").unwrap();

        let after: Vec<_> = config.sources.iter().map(|s| s.path.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn wrong_number_of_files_is_an_input_error() {
        let mut config = StudyConfig::default().comparison;
        let err = override_paths(
            config.sources.iter_mut().map(|s| &mut s.path),
            &[PathBuf::from("only.csv")],
            "comparison sources",
        )
        .unwrap_err();

        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert_eq!(err.message(), "Expected 4 CSV paths for the configured comparison sources, got 1");
    }
}
