use crate::config::LoggingConfig;
use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

/// Appends timestamped records to a file.
pub struct FileLogger {
    file: Mutex<std::fs::File>,
    level: LevelFilter,
}

impl FileLogger {
    pub fn new(log_file: &str, level: LevelFilter) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;

        Ok(Self {
            file: Mutex::new(file),
            level,
        })
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(
                file,
                "{} [{}] {}: {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}

/// Installs the global logger: a file logger when `config.file` is set,
/// env_logger on stderr otherwise (`RUST_LOG` still refines it).
pub fn init(config: &LoggingConfig, debug: bool) -> anyhow::Result<()> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        parse_level(&config.level)
    };

    match &config.file {
        Some(path) => {
            let logger = FileLogger::new(path, level)?;
            log::set_boxed_logger(Box::new(logger))?;
            log::set_max_level(level);
        }
        None => {
            env_logger::Builder::new()
                .filter_level(level)
                .parse_default_env()
                .try_init()?;
        }
    }
    Ok(())
}
