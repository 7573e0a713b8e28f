//! User settings shared by every front end.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::history::HISTORY_LIMIT;

/// Global application settings. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of history entries kept
    pub history_limit: usize,

    /// Where history and favorites are stored. `None` uses the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,

    /// Prefix for money amounts (e.g., "₹", "$")
    pub currency_symbol: String,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            history_limit: HISTORY_LIMIT,
            data_dir: None,
            currency_symbol: "₹".to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.history_limit, 50);
        assert_eq!(settings.currency_symbol, "₹");
        assert_eq!(settings.log_filter, "warn");
        assert!(settings.data_dir.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency_symbol": "$"}"#).unwrap();
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.history_limit, 50);
    }
}
