//! Configuration management for the CLI.
//!
//! The file lives at `~/.folio/config.toml` unless `--config` is given:
//!
//! ```toml
//! cache_dir = ".cache"
//! output_dir = "output"
//!
//! [provider]
//! kind = "gemini"
//! model = "gemini-2.5-flash"
//!
//! [pipeline]
//! max_chunk_size = 150000
//! reconcile_mode = "batch"
//! ```

use crate::error::{CliError, Result};
use folio_extractor::PipelineConfig;
use folio_pdf::{OcrConfig, QualityGate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Model used with Ollama when none is configured
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Result cache directory
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directory for saved artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Model provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Chunking, timeout and reconciliation settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Text-layer quality thresholds
    #[serde(default)]
    pub quality: QualityGate,

    /// OCR tool settings
    #[serde(default)]
    pub ocr: OcrConfig,

    /// Output settings
    #[serde(default)]
    pub settings: Settings,
}

/// Which model API to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google Generative Language API
    #[default]
    Gemini,
    /// Local Ollama server
    Ollama,
}

/// Provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider kind
    #[serde(default)]
    pub kind: ProviderKind,

    /// Model name; each provider has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API base URL; each provider has its own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key (Gemini only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".folio").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. A missing file at the default path
    /// yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Self::from_toml(&contents)
        } else if explicit {
            Err(CliError::Config(format!("Config file not found: {}", path.display())))
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate().map_err(CliError::Config)?;
        if !(0.0..=1.0).contains(&self.quality.max_symbol_ratio) {
            return Err(CliError::Config(
                "quality.max_symbol_ratio must be between 0.0 and 1.0".into(),
            ));
        }
        if self.ocr.dpi == 0 {
            return Err(CliError::Config("ocr.dpi must be greater than 0".into()));
        }
        Ok(())
    }
}

impl ProviderConfig {
    /// Configured model, or the provider default.
    pub fn model_or_default(&self) -> &str {
        match (&self.model, self.kind) {
            (Some(model), _) => model,
            (None, ProviderKind::Gemini) => folio_llm::gemini::DEFAULT_MODEL,
            (None, ProviderKind::Ollama) => DEFAULT_OLLAMA_MODEL,
        }
    }

    /// Configured endpoint, or the provider default.
    pub fn endpoint_or_default(&self) -> &str {
        match (&self.endpoint, self.kind) {
            (Some(endpoint), _) => endpoint,
            (None, ProviderKind::Gemini) => folio_llm::gemini::DEFAULT_ENDPOINT,
            (None, ProviderKind::Ollama) => folio_llm::ollama::DEFAULT_ENDPOINT,
        }
    }

    /// The configured key, falling back to `env_value`.
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env_value.filter(|k| !k.trim().is_empty()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            output_dir: default_output_dir(),
            provider: ProviderConfig::default(),
            pipeline: PipelineConfig::default(),
            quality: QualityGate::default(),
            ocr: OcrConfig::default(),
            settings: Settings::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".cache")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_extractor::ReconcileMode;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cache_dir, PathBuf::from(".cache"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.provider.kind, ProviderKind::Gemini);
        assert!(config.settings.color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            output_dir = "results"

            [provider]
            kind = "ollama"
            model = "mistral"

            [pipeline]
            reconcile_mode = "per_record"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.cache_dir, PathBuf::from(".cache"));
        assert_eq!(config.provider.model_or_default(), "mistral");
        assert_eq!(config.provider.endpoint_or_default(), "http://localhost:11434");
        assert_eq!(config.pipeline.reconcile_mode, ReconcileMode::PerRecord);
        assert_eq!(config.pipeline.max_chunk_size, PipelineConfig::default().max_chunk_size);
    }

    #[test]
    fn test_invalid_sections_rejected() {
        assert!(Config::from_toml("[pipeline]\nmax_chunk_size = 0\n").is_err());
        assert!(Config::from_toml("[quality]\nmax_symbol_ratio = 1.5\n").is_err());
        assert!(Config::from_toml("[provider]\nkind = \"openai\"\n").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.provider.kind = ProviderKind::Ollama;
        config.pipeline = PipelineConfig::lenient();
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/folio.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_api_key_resolution() {
        let mut provider = ProviderConfig::default();
        assert_eq!(provider.resolve_api_key(None), None);
        assert_eq!(provider.resolve_api_key(Some("env-key".into())).as_deref(), Some("env-key"));

        provider.api_key = Some("file-key".into());
        assert_eq!(provider.resolve_api_key(Some("env-key".into())).as_deref(), Some("file-key"));

        provider.api_key = Some("  ".into());
        assert_eq!(provider.resolve_api_key(Some(String::new())), None);
    }

    #[test]
    fn test_provider_defaults() {
        let provider = ProviderConfig::default();
        assert_eq!(provider.model_or_default(), folio_llm::gemini::DEFAULT_MODEL);
        assert_eq!(provider.endpoint_or_default(), folio_llm::gemini::DEFAULT_ENDPOINT);
    }
}
