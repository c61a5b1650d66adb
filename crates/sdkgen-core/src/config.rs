//! Configuration management for SDK code generation.
//!
//! This module defines the `Config` struct and related functionality for managing
//! code generation settings. The configuration can be loaded from a YAML or JSON
//! file or created programmatically.
//!
//! # Examples
//!
//! ```no_run
//! use sdkgen_core::config::Config;
//!
//! # #[tokio::main]
//! # async fn main() -> sdkgen_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new("api.yaml", "sdk");
//! config.languages = vec!["Dart".to_string(), "Python".to_string()];
//! config.api_version = Some("4.0".to_string());
//!
//! // Or load from a config file
//! let config = Config::from_file("sdkgen.yaml").await?;
//! let registry = config.registry();
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::error::Error;
use crate::registry::Registry;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Version stamp a generator is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// API version being generated, e.g. `4.0`
    pub api_version: String,
    /// Release of the SDK being produced, stamped into generated headers
    #[serde(default)]
    pub sdk_version: Option<String>,
}

impl VersionInfo {
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            sdk_version: None,
        }
    }
}

/// Naming used across generated SDKs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkSettings {
    /// Product name used in class names and headers
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Package or library name used in output paths and imports
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// API version treated as the default API
    #[serde(default = "default_api_version")]
    pub default_api_version: String,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            package_name: default_package_name(),
            default_api_version: default_api_version(),
        }
    }
}

/// Per-language change applied on top of the built-in registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOverride {
    /// Language or label of the entry to change
    pub language: String,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub path: Option<String>,

    /// Replacement option string for the legacy generator
    #[serde(default)]
    pub options: Option<String>,

    #[serde(default)]
    pub legacy: Option<String>,

    /// Remove the in-process factory for this language
    #[serde(default)]
    pub disabled: bool,
}

/// Configuration for SDK generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the normalized model document
    pub model_path: String,

    /// Output directory for generated code
    pub output_dir: String,

    /// Languages to generate; empty means every registered generator
    #[serde(default)]
    pub languages: Vec<String>,

    /// API version to stamp; defaults to the model version
    #[serde(default)]
    pub api_version: Option<String>,

    #[serde(default)]
    pub sdk_version: Option<String>,

    #[serde(default)]
    pub sdk: SdkSettings,

    #[serde(default)]
    pub overrides: Vec<GeneratorOverride>,
}

impl Config {
    /// Create a new Config with default values
    pub fn new(model_path: impl Into<String>, output_dir: impl Into<String>) -> Self {
        Self {
            model_path: model_path.into(),
            output_dir: output_dir.into(),
            languages: Vec::new(),
            api_version: None,
            sdk_version: None,
            sdk: SdkSettings::default(),
            overrides: Vec::new(),
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)?
        };
        fs::write(path, content).await?;
        Ok(())
    }

    /// Version stamp for generators, when an API version is configured
    pub fn version_info(&self) -> Option<VersionInfo> {
        self.api_version.as_ref().map(|api_version| VersionInfo {
            api_version: api_version.clone(),
            sdk_version: self.sdk_version.clone(),
        })
    }

    /// The built-in registry with this configuration's overrides applied
    pub fn registry(&self) -> Registry {
        Registry::builtin().with_overrides(&self.overrides)
    }

    /// Languages to generate, every registered generator when none are listed.
    ///
    /// A listed name the registry does not know is a configuration error.
    pub fn selected_languages(&self) -> crate::Result<Vec<String>> {
        let registry = self.registry();
        if let Some(unknown) = self
            .languages
            .iter()
            .find(|language| registry.find_generator(language).is_none())
        {
            return Err(Error::config(format!("unknown language '{}'", unknown)));
        }
        Ok(registry.resolve_languages(&self.languages))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn default_product_name() -> String {
    "Looker".to_string()
}

fn default_package_name() -> String {
    "looker_sdk".to_string()
}

fn default_api_version() -> String {
    "4.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_config_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;

        let mut config = Config::new("model.yaml", "sdk");
        config.languages = vec!["Dart".to_string()];
        config.overrides.push(GeneratorOverride {
            language: "Go".to_string(),
            options: Some("-papiPackage=Acme".to_string()),
            ..Default::default()
        });

        for file_name in ["config.yaml", "config.json"] {
            let file_path = dir.path().join(file_name);
            config.save(&file_path).await?;

            let loaded = Config::from_file(&file_path).await?;
            assert_eq!(loaded.model_path, "model.yaml");
            assert_eq!(loaded.output_dir, "sdk");
            assert_eq!(loaded.languages, vec!["Dart".to_string()]);
            assert_eq!(loaded.sdk, SdkSettings::default());
            assert_eq!(loaded.overrides, config.overrides);
        }

        Ok(())
    }

    #[test]
    fn test_defaults_from_minimal_yaml() {
        let config: Config = serde_yaml::from_str("model_path: m.yaml\noutput_dir: out\n").unwrap();
        assert!(config.languages.is_empty());
        assert_eq!(config.sdk.product_name, "Looker");
        assert_eq!(config.sdk.default_api_version, "4.0");
        assert!(config.version_info().is_none());
    }

    #[test]
    fn test_selected_languages() {
        let mut config = Config::new("m.yaml", "out");
        config.overrides.push(GeneratorOverride {
            language: "kotlin".to_string(),
            disabled: true,
            ..Default::default()
        });
        assert_eq!(
            config.selected_languages().unwrap(),
            ["Python", "Typescript", "csharp", "Swift", "Dart"]
        );

        config.languages = vec!["Go".to_string(), "C#".to_string()];
        assert_eq!(config.selected_languages().unwrap(), ["Go", "C#"]);

        config.languages.push("klingon".to_string());
        let err = config.selected_languages().unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg == "unknown language 'klingon'"));
    }

    #[test]
    fn test_version_info() {
        let mut config = Config::new("m.yaml", "out");
        config.api_version = Some("3.1".to_string());
        config.sdk_version = Some("22.4".to_string());
        let versions = config.version_info().unwrap();
        assert_eq!(versions.api_version, "3.1");
        assert_eq!(versions.sdk_version.as_deref(), Some("22.4"));
    }
}
