//! Application configuration. Data directory, operation timeout.

use serde::Deserialize;

/// Default bound on a single store transaction. A commit slower than this
/// surfaces as OperationTimedOut and is left to the store's rollback.
pub const DEFAULT_OP_TIMEOUT_MS: u64 = 5000;

/// Default directory for the JSON-file store collections.
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding one JSON file per collection. Read from FABRICA_DATA_DIR.
    pub data_dir: Option<String>,

    /// Timeout in ms for a single atomic commit. Read from FABRICA_OP_TIMEOUT_MS.
    #[serde(default)]
    pub op_timeout_ms: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("FABRICA"));
        if let Ok(path) = std::env::var("FABRICA_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let cfg: Self = c.build()?.try_deserialize()?;
        Ok(cfg)
    }

    /// Returns the data directory. Defaults to ./data if unset.
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    /// Returns the commit timeout in ms. Defaults to DEFAULT_OP_TIMEOUT_MS if unset.
    pub fn op_timeout_ms_or_default(&self) -> u64 {
        self.op_timeout_ms.unwrap_or(DEFAULT_OP_TIMEOUT_MS)
    }
}
