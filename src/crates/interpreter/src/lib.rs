//! Natural-language device-command interpretation core for droidpilot.
//!
//! Free-text automation instructions go in; validated, bounds-checked
//! command objects come out. The pipeline has three parts:
//!
//! - A **primary interpreter** that asks a language-model backend to
//!   translate the instruction into a structured candidate.
//! - A schema-driven **validator** that coerces, clamps and checks every
//!   field against the immutable action registry, recursing into
//!   composite actions.
//! - A deterministic **fallback interpreter** — an ordered rule table —
//!   used whenever the primary stage is unavailable or produced an
//!   unusable candidate.
//!
//! This crate never executes commands; the device executor and the HTTP
//! surface live elsewhere.
//!
//! # Example
//!
//! ```rust,ignore
//! use interpreter::Pipeline;
//! use llm::{BackendConfig, OllamaClient};
//! use std::sync::Arc;
//!
//! let client = OllamaClient::new(BackendConfig::default())?;
//! let pipeline = Pipeline::new(Arc::new(client));
//! pipeline.probe_backend().await;
//!
//! let command = pipeline.run("take a screenshot").await?;
//! assert_eq!(serde_json::to_value(&command)?, serde_json::json!({"action": "screenshot"}));
//! ```

pub mod command;
pub mod error;
pub mod fallback;
pub mod pipeline;
pub mod primary;
pub mod registry;
pub mod schema;
pub mod validate;

pub use command::{Command, Condition, RawCommand, Region};
pub use error::{CommandError, Result};
pub use fallback::{FallbackInterpreter, FallbackRule};
pub use pipeline::{BackendReadiness, Pipeline, ReadyState, MAX_INSTRUCTION_LEN};
pub use primary::PrimaryInterpreter;
pub use registry::Registry;
pub use schema::{ActionSchema, FieldKind, FieldRequirement, FieldSpec, ScreenBounds};
pub use validate::{Validator, MAX_NESTING_DEPTH};
