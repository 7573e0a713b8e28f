//! Loading [`Settings`] from `~/.calcumaster/config.toml`.
//!
//! ```toml
//! history_limit = 100
//! currency_symbol = "$"
//! data_dir = "/home/me/.local/share/calcumaster"
//! log_filter = "calc_core=debug"
//! ```

use std::path::{Path, PathBuf};

use calc_core::Settings;

/// Read settings from `explicit` or the default config path.
///
/// A missing file yields defaults. A file that cannot be read or parsed
/// also yields defaults, plus a warning for the caller to log once tracing
/// is initialized.
pub fn load(explicit: Option<&Path>) -> (Settings, Vec<String>) {
    let mut warnings = Vec::new();
    let path = match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => path,
        None => return (Settings::default(), warnings),
    };
    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file {:?} does not exist, using defaults", path));
        }
        return (Settings::default(), warnings);
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            warnings.push(format!("Failed to read config at {:?}: {}", path, err));
            return (Settings::default(), warnings);
        }
    };

    let settings = parse(&content).unwrap_or_else(|err| {
        warnings.push(format!("Failed to parse config at {:?}: {}", path, err));
        Settings::default()
    });
    (settings, warnings)
}

pub fn parse(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".calcumaster").join("config.toml"))
}

/// `data_dir` from settings, else the platform data directory.
pub fn data_dir(settings: &Settings) -> Option<PathBuf> {
    settings
        .data_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|dir| dir.join("calcumaster")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let settings = parse("currency_symbol = \"$\"\nhistory_limit = 10\n").unwrap();
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.history_limit, 10);
        assert_eq!(settings.log_filter, "warn");
    }

    #[test]
    fn test_parse_invalid_config() {
        assert!(parse("history_limit = \"lots\"").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (settings, warnings) = load(Some(&dir.path().join("absent.toml")));
        assert_eq!(settings, Settings::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_load_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        let (settings, warnings) = load(Some(&path));
        assert_eq!(settings, Settings::default());
        assert!(warnings[0].starts_with("Failed to parse config"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, format!("data_dir = {:?}\n", dir.path().join("data"))).unwrap();
        let (settings, warnings) = load(Some(&path));
        assert!(warnings.is_empty());
        assert_eq!(data_dir(&settings), Some(dir.path().join("data")));
    }
}
