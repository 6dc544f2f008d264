#![cfg_attr(docsrs, feature(doc_cfg))]
//! Tabula answers natural-language questions about uploaded tables.
//!
//! A language model is given a small catalog of read-only functions over a
//! SQLite store and loops, calling them and reading their results, until it
//! can answer. The pieces, leaves first:
//!
//! - [`store`]: the SQLite gateway (introspection, read-only queries, uploads)
//! - [`tool`] and [`tools`]: the function catalog and the dispatcher that
//!   turns every call into a `{"success": ...}` result
//! - [`guardrail`]: the read-only SQL gate in front of model-authored queries
//! - [`providers`]: model access behind the [`Model`](providers::Model) trait
//! - [`agent`]: the bounded conversation loop
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabula::prelude::*;
//!
//! let settings = Settings::from_env()?;
//! let store = Arc::new(DataStore::open(&settings.database_path)?);
//! let model = OpenAIClient::from_settings(&settings)?.completion_model(&settings.model);
//! let dispatcher = Arc::new(Dispatcher::new(database_registry(), store));
//! let analyst = Analyst::new(Arc::new(model), dispatcher)
//!     .with_config(AnalystConfig::from_settings(&settings));
//!
//! let outcome = analyst.chat("How many rows does sales have?", None).await?;
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod guardrail;
pub mod message;
pub mod prelude;
pub mod providers;
pub mod store;
pub mod tool;
pub mod tools;

pub use error::{Error, LlmError, LlmErrorKind, Result, ToolError};
