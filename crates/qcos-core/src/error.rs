use std::path::PathBuf;

/// Errors that can occur across QCOS.
///
/// Each variant wraps a specific error domain. Library crates return this
/// type directly; the binary reports it through `miette`, so user-facing
/// variants carry a diagnostic code and help text.
///
/// # Examples
///
/// ```
/// use qcos_core::QcosError;
///
/// let err = QcosError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum QcosError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(qcos::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(qcos::config), help("run `qcos doctor` to inspect your setup"))]
    Config(String),

    /// Completion API or response error.
    #[error("LLM error: {0}")]
    #[diagnostic(code(qcos::llm))]
    Llm(String),

    /// The completion API rejected the request with HTTP 429.
    #[error("rate limit reached: {0}")]
    #[diagnostic(
        code(qcos::rate_limited),
        help("wait a moment before trying again, or raise `llm.max_retries`")
    )]
    RateLimited(String),

    /// Key-value store could not be read or written.
    #[error("store error: {0}")]
    #[diagnostic(code(qcos::store))]
    Store(String),

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(qcos::serialization))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(qcos::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found on disk.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(qcos::file_not_found))]
    FileNotFound(PathBuf),

    /// A path is not part of the persisted codebase.
    #[error("no such file in codebase: {0}")]
    #[diagnostic(
        code(qcos::unknown_file),
        help("run `qcos codebase list` to see the available paths")
    )]
    UnknownFile(String),

    /// A caller-supplied request was rejected before doing any work.
    #[error("invalid request: {0}")]
    #[diagnostic(code(qcos::invalid_request))]
    InvalidRequest(String),
}

impl QcosError {
    /// Returns `true` if retrying the same call later might succeed.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, QcosError::RateLimited(_))
    }
}
