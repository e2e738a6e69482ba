use std::path::PathBuf;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "IFINANCE_DATA";
/// Environment variable holding the default log filter.
pub const LOG_ENV: &str = "IFINANCE_LOG";

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Runtime settings resolved from command-line flags and the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding one `<key>.json` file per collection.
    pub data_dir: PathBuf,
    /// `tracing_subscriber::EnvFilter` directive.
    pub log_level: String,
}

impl Config {
    /// Resolves settings; explicit flags win over environment variables.
    pub fn resolve(data_dir: Option<PathBuf>, log_level: Option<String>) -> Config {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let log_level = log_level
            .or_else(|| std::env::var(LOG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        Config { data_dir, log_level }
    }
}

/// Returns the directory the collections live in.
///
/// The path is determined in the following order:
/// 1. `IFINANCE_DATA` environment variable.
/// 2. `~/.local/share/ifinance` (on Linux).
/// 3. `./ifinance-data` (fallback).
pub fn default_data_dir() -> PathBuf {
    std::env::var(DATA_DIR_ENV).map(PathBuf::from).unwrap_or_else(|_| {
        match dirs::data_local_dir() {
            Some(mut p) => {
                p.push("ifinance");
                p
            }
            None => PathBuf::from("ifinance-data"),
        }
    })
}
