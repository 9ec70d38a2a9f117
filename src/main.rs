// src/main.rs

mod app_logic;
mod cli;
mod core;

use crate::core::path_utils;
use clap::Parser;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const LOG_FILENAME: &str = "tlp_profile.log";

/// The log file sits next to the settings file in use.
fn log_dir_for(settings_file: Option<&Path>) -> Option<PathBuf> {
    match settings_file {
        Some(file) => match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
            _ => Some(PathBuf::from(".")),
        },
        None => path_utils::get_base_app_config_local_dir(path_utils::APP_NAME),
    }
}

fn init_logging(verbosity: u8, settings_file: Option<&Path>) {
    let term_level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(dir) = log_dir_for(settings_file) {
        let log_path = dir.join(LOG_FILENAME);
        match OpenOptions::new().create(true).append(true).open(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(e) => eprintln!("Failed to open log file {}: {e}", log_path.display()),
        }
    }

    if let Err(e) = CombinedLogger::init(loggers) {
        eprintln!("Failed to initialize logger: {e}");
    }
}

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose, cli.config.as_deref());
    log::debug!("Main: tlp-profile {} starting", env!("CARGO_PKG_VERSION"));

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Main: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
