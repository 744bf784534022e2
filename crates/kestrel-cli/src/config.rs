//! Configuration file parsing for kestrel.toml.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Listing settings
    #[serde(default)]
    pub disasm: DisasmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            disasm: DisasmConfig::default(),
        }
    }
}

/// Listing configuration.
#[derive(Debug, Default, Deserialize)]
pub struct DisasmConfig {
    /// Prefix each line with its byte offset
    #[serde(default)]
    pub offsets: bool,

    /// Print a header before each code unit
    #[serde(default)]
    pub unit_headers: bool,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

/// Listing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Column-aligned text, one instruction per line
    #[default]
    Text,
    /// JSON array of decoded lines
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a file or search for default config files.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config_path = path.map(PathBuf::from).or_else(find_config_file);

    match config_path {
        Some(path) if path.exists() => {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
            Ok(config)
        }
        _ => Ok(Config::default()),
    }
}

/// Search for configuration file in the current directory and parent directories.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_ancestors(&cwd)
}

fn find_config_in_ancestors(start: &Path) -> Option<PathBuf> {
    const CONFIG_NAMES: &[&str] = &["kestrel.toml", ".kestrelrc.toml"];

    let mut dir = Some(start);
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.disasm.offsets);
        assert!(!config.disasm.unit_headers);
        assert_eq!(config.disasm.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
log_level = "debug"

[disasm]
offsets = true
format = "json"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.disasm.offsets);
        assert!(!config.disasm.unit_headers);
        assert_eq!(config.disasm.format, OutputFormat::Json);
    }

    #[test]
    fn test_find_config_in_parent() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("kestrel.toml"), "[disasm]\nunit_headers = true\n").unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = find_config_in_ancestors(&nested).unwrap();
        assert_eq!(found, root.path().join("kestrel.toml"));

        let config = load_config(Some(found.as_path())).unwrap();
        assert!(config.disasm.unit_headers);
    }

    #[test]
    fn test_missing_explicit_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("none.toml");
        let config = load_config(Some(missing.as_path())).unwrap();
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kestrel.toml");
        std::fs::write(&path, "[disasm]\nformat = \"xml\"\n").unwrap();
        assert!(load_config(Some(path.as_path())).is_err());
    }
}
