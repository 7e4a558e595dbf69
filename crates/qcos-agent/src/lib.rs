//! Services around the diff engine: AI completions, persistence, the
//! metaprogramming patch workflow, and simulated telemetry.
//!
//! - [`llm`]: the [`TextCompletionService`](llm::TextCompletionService) trait
//!   and an OpenAI-compatible client
//! - [`store`]: the [`KeyValueTextStore`](store::KeyValueTextStore) trait with
//!   in-memory and JSON-file backends
//! - [`codebase`] / [`library`]: the persisted file map and protocol library
//! - [`patch`]: propose, review, and apply AI-generated file rewrites
//! - [`telemetry`]: a ticker driving pure next-state metric transforms

pub mod codebase;
pub mod library;
pub mod llm;
pub mod patch;
pub mod prompt;
pub mod store;
pub mod telemetry;
