use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::QcosError;

/// Top-level configuration loaded from `.qcos.toml`.
///
/// Every section has defaults, so an empty file is a valid configuration.
/// Resolution order is CLI flags > env vars > config file > defaults.
///
/// # Examples
///
/// ```
/// use qcos_core::QcosConfig;
///
/// let config = QcosConfig::default();
/// assert_eq!(config.diff.context_lines, 3);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QcosConfig {
    /// Completion provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Key-value store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Diff rendering settings.
    #[serde(default)]
    pub diff: DiffConfig,
    /// Telemetry ticker settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl QcosConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`QcosError::Io`] if the file cannot be read, or
    /// [`QcosError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use qcos_core::QcosConfig;
    /// use std::path::Path;
    ///
    /// let config = QcosConfig::from_file(Path::new(".qcos.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, QcosError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`QcosError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use qcos_core::QcosConfig;
    ///
    /// let toml = r#"
    /// [diff]
    /// context_lines = 5
    /// "#;
    /// let config = QcosConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.diff.context_lines, 5);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, QcosError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// Completion provider configuration.
///
/// Any OpenAI-compatible chat completions endpoint works; `provider` only
/// decides which environment variable holds the API key.
///
/// # Examples
///
/// ```
/// use qcos_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o-mini");
/// assert_eq!(config.api_key_env(), "OPENAI_API_KEY");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (e.g. `"openai"`, `"anthropic"`, `"gemini"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// How many times a rate-limited request is retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay for exponential backoff between retries.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_ms() -> u64 {
    500
}

impl LlmConfig {
    /// Name of the environment variable that holds the API key for `provider`.
    pub fn api_key_env(&self) -> &'static str {
        match self.provider.as_str() {
            "anthropic" => "ANTHROPIC_API_KEY",
            "gemini" => "GEMINI_API_KEY",
            _ => "OPENAI_API_KEY",
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
        }
    }
}

/// Where the key-value store lives on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON store file (default: `.qcos/store.json`).
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".qcos/store.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Diff rendering configuration.
///
/// # Examples
///
/// ```
/// use qcos_core::DiffConfig;
///
/// let config = DiffConfig::default();
/// assert_eq!(config.context_lines, 3);
/// assert_eq!(config.warn_cells, 4_000_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Unchanged lines shown around each hunk in unified output.
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
    /// LCS table size above which a warning is logged.
    #[serde(default = "default_warn_cells")]
    pub warn_cells: usize,
}

fn default_context_lines() -> usize {
    3
}

fn default_warn_cells() -> usize {
    4_000_000
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            warn_cells: default_warn_cells(),
        }
    }
}

/// Telemetry ticker cadence and tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Milliseconds between core temperature updates (default: 1500).
    #[serde(default = "default_core_temp_interval_ms")]
    pub core_temp_interval_ms: u64,
    /// Milliseconds between system health updates (default: 2000).
    #[serde(default = "default_health_interval_ms")]
    pub health_interval_ms: u64,
    /// Cooling efficiency multiplier applied to core temperatures.
    #[serde(default = "default_efficiency")]
    pub efficiency: f64,
}

fn default_core_temp_interval_ms() -> u64 {
    1500
}

fn default_health_interval_ms() -> u64 {
    2000
}

fn default_efficiency() -> f64 {
    1.0
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            core_temp_interval_ms: default_core_temp_interval_ms(),
            health_interval_ms: default_health_interval_ms(),
            efficiency: default_efficiency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = QcosConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.llm.max_retries, 2);
        assert_eq!(config.llm.retry_base_ms, 500);
        assert_eq!(config.store.path, PathBuf::from(".qcos/store.json"));
        assert_eq!(config.diff.context_lines, 3);
        assert_eq!(config.telemetry.core_temp_interval_ms, 1500);
        assert_eq!(config.telemetry.health_interval_ms, 2000);
        assert_eq!(config.telemetry.efficiency, 1.0);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
provider = "gemini"
model = "gemini-2.5-flash"
base_url = "http://localhost:8080"
max_retries = 5

[store]
path = "/tmp/qcos-store.json"

[diff]
context_lines = 1

[telemetry]
core_temp_interval_ms = 250
efficiency = 0.98
"#;
        let config = QcosConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.llm.api_key_env(), "GEMINI_API_KEY");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.llm.max_retries, 5);
        assert_eq!(config.llm.retry_base_ms, 500);
        assert_eq!(config.store.path, PathBuf::from("/tmp/qcos-store.json"));
        assert_eq!(config.diff.context_lines, 1);
        assert_eq!(config.diff.warn_cells, 4_000_000);
        assert_eq!(config.telemetry.core_temp_interval_ms, 250);
        assert_eq!(config.telemetry.health_interval_ms, 2000);
        assert_eq!(config.telemetry.efficiency, 0.98);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = QcosConfig::from_toml("").unwrap();
        assert_eq!(config.diff.context_lines, 3);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = QcosConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(QcosError::Toml(_))));
    }

    #[test]
    fn api_key_env_follows_provider() {
        let mut config = LlmConfig::default();
        assert_eq!(config.api_key_env(), "OPENAI_API_KEY");
        config.provider = "anthropic".into();
        assert_eq!(config.api_key_env(), "ANTHROPIC_API_KEY");
        config.provider = "ollama".into();
        assert_eq!(config.api_key_env(), "OPENAI_API_KEY");
    }
}
