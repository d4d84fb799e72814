//! User configuration (`config.toml`).

use clap::ValueEnum;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// How the sheet is printed to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown table of display text.
    #[default]
    Table,
    /// Raw expressions in delimited form (the save format).
    Text,
    /// Display text in delimited form.
    Values,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// Rows of a fresh sheet.
    pub rows: usize,
    /// Columns of a fresh sheet.
    pub cols: usize,
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rows: 5,
            cols: 5,
            format: OutputFormat::Table,
        }
    }
}

/// Load configuration from `explicit`, or from the user config dir.
/// Problems never fail the run: they fall back to defaults with a warning.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = explicit.map(Path::to_path_buf).or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file {} not found", path.display()));
        }
        return (Config::default(), warnings);
    }

    let config = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!("Failed to read {}: {}", path.display(), err));
            None
        }
    };

    (config.unwrap_or_default(), warnings)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str("rows = 12\nformat = \"values\"\n").unwrap();
        assert_eq!(config.rows, 12);
        assert_eq!(config.cols, 5);
        assert_eq!(config.format, OutputFormat::Values);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("colour = \"red\"").is_err());
    }

    #[test]
    fn test_bad_file_falls_back_with_warning() {
        let path = std::env::temp_dir().join(format!(
            "cellcalc_bad_config_{}_{:?}.toml",
            std::process::id(),
            std::thread::current().id(),
        ));
        struct Cleanup(PathBuf);
        impl Drop for Cleanup {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }
        let _cleanup = Cleanup(path.clone());
        std::fs::write(&path, "rows = \"many\"").unwrap();

        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Failed to parse"));
    }

    #[test]
    fn test_missing_explicit_file_warns() {
        let (config, warnings) = load_config(Some(Path::new("/nonexistent/cellcalc.toml")));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }
}
