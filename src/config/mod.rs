//! Application Configuration
//!
//! Default extraction settings stored in TOML format. CLI flags override
//! anything loaded from here.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::Origin;
use crate::vision::RecognitionMethod;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Recognition settings
    pub recognition: RecognitionSettings,
    /// Output settings
    pub output: OutputSettings,
}

/// Recognition-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionSettings {
    /// Default vertical-origin convention
    pub origin: Origin,
    /// Default speed/accuracy tradeoff
    pub method: RecognitionMethod,
    /// OCR language tag (e.g. "en-US"); used by the Windows backend
    pub language: String,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            origin: Origin::Bottom,
            method: RecognitionMethod::Accurate,
            language: "en-US".to_string(),
        }
    }
}

/// Output-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Pretty-print the JSON output
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty: false }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "textlift", "textlift")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        assert_eq!(config.recognition.origin, Origin::Bottom);
        assert_eq!(config.recognition.method, RecognitionMethod::Accurate);
        assert_eq!(config.recognition.language, "en-US");
        assert!(!config.output.pretty);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.recognition.origin, parsed.recognition.origin);
        assert_eq!(config.recognition.method, parsed.recognition.method);
        assert_eq!(config.recognition.language, parsed.recognition.language);
        assert_eq!(config.output.pretty, parsed.output.pretty);
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.recognition.origin = Origin::Top;
        config.recognition.method = RecognitionMethod::Fast;
        config.recognition.language = "de-DE".to_string();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.recognition.origin, Origin::Top);
        assert_eq!(parsed.recognition.method, RecognitionMethod::Fast);
        assert_eq!(parsed.recognition.language, "de-DE");
    }

    #[test]
    fn test_save_and_load_config() {
        let config = AppConfig::default();

        let temp_file = NamedTempFile::new().unwrap();
        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(config.recognition.language, loaded.recognition.language);
        assert_eq!(config.recognition.origin, loaded.recognition.origin);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
