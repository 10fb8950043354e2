// reads the tunables at startup and writes them back on request.
// Sequences themselves are never saved; only the config lives on disk.
use std::path::{Path, PathBuf};

use crate::pipeline::config::{Config, ConfigError};

pub const CVSEQ_DIR: &str = ".cvseq";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "cvseq.log";

// <dir>/.cvseq/config.json
pub fn config_file_path(dir: &Path) -> PathBuf {
    dir.join(CVSEQ_DIR).join(CONFIG_FILE)
}

// <dir>/.cvseq/cvseq.log
pub fn log_file_path(dir: &Path) -> PathBuf {
    dir.join(CVSEQ_DIR).join(LOG_FILE)
}

/// A missing file is the factory config; anything unreadable or invalid is an
/// error, so a typo never silently runs with defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = match std::fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("no config at {}, using defaults", path.display());
            Config::default()
        }
        Err(e) => return Err(e.into()),
    };
    config.validate()?;
    Ok(config)
}

// making the directory if it doesn't exist already
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
