use crate::common::timestamp_utils;
use crate::config_loader::MasterConfig;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::Path;

pub fn initialize_logging(config: Option<&MasterConfig>, cli_matches: &clap::ArgMatches) {
    let mut builder = Builder::new();

    // Determine log level from CLI, then config, then default
    let log_level_str = if cli_matches.get_flag("debug") {
        "debug".to_string()
    } else {
        config
            .and_then(|c| c.app_settings.log_level.clone())
            .unwrap_or_else(|| "info".to_string()) // Default log level
    };

    match log_level_str.to_lowercase().as_str() {
        "error" => builder.filter_level(LevelFilter::Error),
        "warn" => builder.filter_level(LevelFilter::Warn),
        "info" => builder.filter_level(LevelFilter::Info),
        "debug" => builder.filter_level(LevelFilter::Debug),
        "trace" => builder.filter_level(LevelFilter::Trace),
        s => {
            eprintln!("Unrecognized log level '{}', defaulting to info.", s);
            builder.filter_level(LevelFilter::Info)
        }
    };

    // When a log directory is configured, append to a daily file in it
    // (logs/2024-01-01.log). The file name is fixed at startup; a restart
    // rolls over to the new day's file.
    if let Some(log_dir) = config.and_then(|c| c.app_settings.log_directory.as_deref()) {
        match open_daily_log_file(log_dir) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!(
                    "Failed to open daily log file in '{}': {}. Falling back to stderr.",
                    log_dir, e
                );
            }
        }
    }

    builder.try_init().unwrap_or_else(|e| {
        eprintln!(
            "Failed to initialize logger: {}. Logging might not work as expected.",
            e
        );
    });
}

fn open_daily_log_file(log_dir: &str) -> std::io::Result<std::fs::File> {
    let dir = Path::new(log_dir);
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    let filename = format!("{}.log", timestamp_utils::current_local_date_str());
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_log_file_is_created_in_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let log_dir = tmp.path().join("logs");
        open_daily_log_file(log_dir.to_str().unwrap()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(&log_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let name = entries[0].as_ref().unwrap().file_name();
        assert!(name.to_str().unwrap().ends_with(".log"));
    }
}
