//! The conversation loop.
//!
//! An [`Analyst`] pairs a [`Model`](crate::providers::Model) with a
//! [`Dispatcher`](crate::tool::Dispatcher) and answers one question per
//! [`chat`](Analyst::chat) call:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabula::agent::Analyst;
//!
//! let analyst = Analyst::new(model, dispatcher).max_iterations(7);
//! let outcome = analyst.chat("Which region sold the most?", None).await?;
//! println!("{}", outcome.answer);
//! for call in &outcome.function_calls {
//!     println!("{} -> {}", call.function, call.result);
//! }
//! ```

mod prompt;
mod result;
mod runner;

pub use prompt::{BUDGET_EXHAUSTED_ANSWER, SYSTEM_PROMPT};
pub use result::{ChatOutcome, FunctionCallRecord, NextStep};
pub use runner::{Analyst, AnalystConfig};
