use std::{env, path::PathBuf};
use tracing_subscriber::EnvFilter;

pub const DEFAULT_CURRENCY: &str = "₹";
const CURRENCY_VAR: &str = "SPLITDIARY_CURRENCY";
const DATA_DIR_VAR: &str = "SPLITDIARY_DATA_DIR";

/// Settings read from the environment and an optional `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub currency: String,
    pub data_dir: PathBuf,
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let currency = lookup(CURRENCY_VAR)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        Self { currency, data_dir }
    }
}

/// Log to stderr so ledger output on stdout stays clean. `RUST_LOG` wins
/// over the `info` default.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
