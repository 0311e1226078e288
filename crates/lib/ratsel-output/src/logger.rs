use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::runtime::ConfigErrors;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct LogSettings {
    pub log_path: String,
    pub log_level: String,
    pub log_file_name: String,
    pub log_overwrite: bool,
}

pub fn setup_logging(log_level: &str, log_file_path: PathBuf) -> Result<Config, ConfigErrors> {
    let level = parse_level(log_level);
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y.%m.%d %H:%M:%S)} | {({l}):5.5} | {({f}:{L}):>40.40} - {m}{n}",
        )))
        .build(log_file_path)
        .expect("failed to create the log file appender");
    Config::builder()
        .appender(Appender::builder().build("sim", Box::new(appender)))
        .build(Root::builder().appender("sim").build(level))
}

fn parse_level(log_level: &str) -> LevelFilter {
    match log_level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Sets up the file logger under the scenario's log directory. An existing log
/// file is either cleared or kept aside with a timestamp suffix, depending on the
/// overwrite flag.
pub fn initiate_logger(base_path: &Path, settings: &LogSettings) {
    let log_dir = base_path.join(&settings.log_path).join("logs");
    if !log_dir.exists() {
        fs::create_dir_all(&log_dir).expect("failed to create the log directory");
    }

    let mut log_file_path = log_dir.join(&settings.log_file_name);
    if log_file_path.exists() {
        if settings.log_overwrite {
            fs::remove_file(&log_file_path).expect("failed to clear the old log file");
        } else {
            let suffix = Utc::now().format("_%d%m%Y_%H%M%S").to_string();
            let stem = settings
                .log_file_name
                .split('.')
                .next()
                .expect("empty log file name");
            log_file_path = log_dir.join(format!("{}{}.log", stem, suffix));
        }
    }

    let config = match setup_logging(&settings.log_level, log_file_path) {
        Ok(config) => config,
        Err(e) => panic!("Error while configuring the logger: {}", e),
    };
    if let Err(e) = log4rs::init_config(config) {
        panic!("Error while initializing the logger: {}", e);
    }
}
