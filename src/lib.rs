//! # papercite
//!
//! Research Paper Citation Compiler - Rust Microservice
//!
//! ## Modules
//!
//! - [`fields`] - Fixed 14-field data model and response parsing
//! - [`prompts`] - Extraction prompt templates
//! - [`extractor`] - Generation-service client and field extraction
//! - [`compiler`] - Session-keyed accumulation of compiled rows
//! - [`export`] - Excel workbook serialization
//! - [`render`] - HTML form and table rendering
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use papercite::compiler::{compile_batch, SessionStore};
//! use papercite::extractor::{ChatCompletionClient, LlmConfig};
//! use papercite::fields::PaperInput;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ChatCompletionClient::new(LlmConfig {
//!         base_url: papercite::extractor::DEFAULT_BASE_URL.to_string(),
//!         api_key: std::env::var("API_KEY")?,
//!         model: papercite::extractor::DEFAULT_MODEL.to_string(),
//!     })?;
//!     let store = SessionStore::new();
//!     let batch = vec![PaperInput::new("http://a", "Paper about X")];
//!     let table = compile_batch(&client, &store, "session-1", &batch).await;
//!     println!("Accumulated {} rows", table.len());
//!     Ok(())
//! }
//! ```

pub mod compiler;
pub mod error;
pub mod export;
pub mod extractor;
pub mod fields;
pub mod prompts;
pub mod render;

pub use error::{CiteError, Result};
