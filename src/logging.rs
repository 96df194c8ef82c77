use std::io::Write;

use chrono::Local;
use env_logger::Builder;
use log::Level;

/// Install the global logger.
///
/// Filter comes from `RUST_LOG` (default `info`). Records go to stderr so that
/// stdout carries only the fit summary.
pub fn init_logger() {
    let result = Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let time = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let level_color = match record.level() {
                Level::Error => "\x1b[31m\x1b[1m",
                Level::Warn => "\x1b[33m\x1b[1m",
                Level::Info => "\x1b[32m\x1b[1m",
                Level::Debug => "\x1b[36m\x1b[1m",
                Level::Trace => "\x1b[90m\x1b[1m",
            };
            writeln!(
                buf,
                "{time}{level_color} {}\x1b[0m [{}] {}",
                record.level(),
                record.target(),
                record.args(),
            )
        })
        .try_init();

    if let Err(err) = result {
        eprintln!("logger already initialized: {err}");
    }
}
