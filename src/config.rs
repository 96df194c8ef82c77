//! Study configuration.
//!
//! Everything the workflows used to hard-code (file paths, gear ratios, series
//! labels, colors, chart decoration) lives here. The built-in defaults describe
//! the SSPG/CPG stiffness measurement and the four-way gearbox comparison; a
//! TOML file can replace any of it and CLI flags override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{ChartStyle, Rgb};

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Parse error: {0}")]
    Parse(toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    pub stiffness: StiffnessConfig,
    pub comparison: ComparisonConfig,
}

/// One measured transmission in the stiffness workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    /// Short design name, e.g. `SSPG`.
    pub name: String,
    pub path: PathBuf,
    /// The encoder sits on the motor side; dividing by the reduction ratio
    /// turns its position into output-side deflection.
    pub gear_ratio: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StiffnessConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<SeriesConfig>,
    pub style: ChartStyle,
}

impl Default for StiffnessConfig {
    fn default() -> Self {
        Self {
            title: "Transmission stiffness".to_string(),
            x_label: "Actuator Torque [Nm]".to_string(),
            y_label: "Deflection [rad]".to_string(),
            series: vec![
                SeriesConfig {
                    name: "SSPG".to_string(),
                    path: PathBuf::from("transmission_stiffness_sspg.csv"),
                    gear_ratio: 7.2,
                    color: Rgb::BLUE,
                },
                SeriesConfig {
                    name: "CPG".to_string(),
                    path: PathBuf::from("transmission_stiffness_cpg.csv"),
                    gear_ratio: 14.0,
                    color: Rgb::RED,
                },
            ],
            style: ChartStyle {
                axis_label_size: 20,
                tick_label_size: 18,
                legend_size: 18,
                line_width: 3.0,
            },
        }
    }
}

/// One design sweep in the comparison workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub label: String,
    pub path: PathBuf,
    /// Falls back to the categorical cycle when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub title: String,
    pub x_metric: String,
    pub x_label: String,
    pub y_metrics: Vec<String>,
    /// Column appended to the combined table holding each row's source label.
    pub tag_column: String,
    pub sources: Vec<SourceConfig>,
    pub style: ChartStyle,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        let source = |label: &str| SourceConfig {
            label: label.to_string(),
            path: PathBuf::from(format!("{label}_MAD.csv")),
            color: None,
        };
        Self {
            title: "Gearbox performance comparison".to_string(),
            x_metric: "gearRatio".to_string(),
            x_label: "Gear Ratio".to_string(),
            y_metrics: ["mass", "eff", "Cost", "Actuator_width"].map(String::from).to_vec(),
            tag_column: "Type".to_string(),
            sources: vec![source("CPG"), source("DSPG"), source("SSPG"), source("WPG")],
            style: ChartStyle::default(),
        }
    }
}

impl StudyConfig {
    /// Load a TOML study file.
    ///
    /// Relative data paths are resolved against the file's directory so a
    /// study folder can be run from anywhere.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StudyConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for series in &mut self.stiffness.series {
            if series.path.is_relative() {
                series.path = base.join(&series.path);
            }
        }
        for source in &mut self.comparison.sources {
            if source.path.is_relative() {
                source.path = base.join(&source.path);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stiffness.validate()?;
        self.comparison.validate()
    }
}

impl StiffnessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.series.is_empty() {
            return Err(ConfigError::Validation(
                "stiffness needs at least one series".to_string(),
            ));
        }
        for series in &self.series {
            if !series.gear_ratio.is_finite() || series.gear_ratio == 0.0 {
                return Err(ConfigError::Validation(format!(
                    "series '{}' has invalid gear_ratio {} (must be finite and non-zero)",
                    series.name, series.gear_ratio
                )));
            }
        }
        validate_style(&self.style)
    }
}

impl ComparisonConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Validation(
                "comparison needs at least one source".to_string(),
            ));
        }
        if self.y_metrics.is_empty() {
            return Err(ConfigError::Validation(
                "comparison needs at least one y metric".to_string(),
            ));
        }
        if self.tag_column.trim().is_empty() {
            return Err(ConfigError::Validation("tag_column must not be empty".to_string()));
        }
        validate_style(&self.style)
    }
}

fn validate_style(style: &ChartStyle) -> Result<(), ConfigError> {
    if style.axis_label_size == 0 || style.tick_label_size == 0 || style.legend_size == 0 {
        return Err(ConfigError::Validation("font sizes must be positive".to_string()));
    }
    if !(style.line_width.is_finite() && style.line_width > 0.0) {
        return Err(ConfigError::Validation(format!(
            "line_width must be positive, got {}",
            style.line_width
        )));
    }
    Ok(())
}
