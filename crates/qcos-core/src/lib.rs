//! Core types, configuration, and error handling for QCOS.
//!
//! This crate provides the shared foundation used by all other QCOS crates:
//! - [`QcosError`]: unified error type using `thiserror` and `miette`
//! - [`QcosConfig`]: configuration loaded from `.qcos.toml`
//! - Diff types: [`DiffKind`], [`DiffLine`], [`EditScript`], [`DiffStats`],
//!   [`Hunk`], plus the CLI [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{DiffConfig, LlmConfig, QcosConfig, StoreConfig, TelemetryConfig};
pub use error::QcosError;
pub use types::{DiffKind, DiffLine, DiffStats, EditScript, Hunk, OutputFormat};

/// A convenience `Result` type for QCOS operations.
pub type Result<T> = std::result::Result<T, QcosError>;
