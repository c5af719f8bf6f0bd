//! Two-stage interpretation pipeline.
//!
//! `run(text)` tries the model-backed primary interpreter, validates its
//! candidate, and on any primary-stage failure retries the same text
//! through the deterministic fallback interpreter. Callers only ever see
//! a validated command or a `Composite` failure carrying both stage
//! errors; there are no retries beyond the two stages and no corrective
//! re-querying of the model.
//!
//! Apart from the readiness cell, every `run` invocation is stateless;
//! concurrent calls share the immutable registry without locking.

use crate::command::Command;
use crate::error::{CommandError, Result};
use crate::fallback::FallbackInterpreter;
use crate::primary::PrimaryInterpreter;
use crate::registry::Registry;
use crate::schema::ScreenBounds;
use crate::validate::Validator;
use llm::ChatModel;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Maximum accepted instruction length, in characters. Longer inputs are
/// truncated, not rejected — the same tolerance policy as numeric
/// clamping.
pub const MAX_INSTRUCTION_LEN: usize = 2000;

/// Lifecycle of the language-model backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    /// No readiness probe has run yet.
    Unknown = 0,
    /// A probe is in flight.
    Loading = 1,
    /// The backend answered the probe and serves the configured model.
    Ready = 2,
    /// The probe failed; the primary stage is skipped.
    Failed = 3,
}

/// Atomic state cell for backend readiness.
///
/// Written once by the readiness probe, read by every `run` call, so the
/// transition from loading to ready is observed without tearing.
pub struct BackendReadiness {
    state: AtomicU8,
}

impl BackendReadiness {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ReadyState::Unknown as u8),
        }
    }

    pub fn state(&self) -> ReadyState {
        match self.state.load(Ordering::Acquire) {
            1 => ReadyState::Loading,
            2 => ReadyState::Ready,
            3 => ReadyState::Failed,
            _ => ReadyState::Unknown,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ReadyState::Ready
    }

    fn set(&self, state: ReadyState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl Default for BackendReadiness {
    fn default() -> Self {
        Self::new()
    }
}

/// The command-interpretation pipeline.
pub struct Pipeline {
    registry: Registry,
    bounds: ScreenBounds,
    model: Arc<dyn ChatModel>,
    primary: PrimaryInterpreter,
    fallback: FallbackInterpreter,
    readiness: BackendReadiness,
}

impl Pipeline {
    /// Build a pipeline around a chat backend. The schema registry is
    /// constructed here, once, and shared by all subsequent calls.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        let registry = Registry::new();
        let primary = PrimaryInterpreter::new(model.clone(), &registry);
        Self {
            registry,
            bounds: ScreenBounds::default(),
            model,
            primary,
            fallback: FallbackInterpreter::new(),
            readiness: BackendReadiness::new(),
        }
    }

    /// Use the device's reported screen dimensions for coordinate bounds.
    pub fn with_screen_bounds(mut self, bounds: ScreenBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn readiness(&self) -> ReadyState {
        self.readiness.state()
    }

    /// Probe the backend and record the outcome in the readiness cell.
    ///
    /// Meant to run once at startup (typically on a background worker);
    /// until it marks the backend ready, `run` goes straight to the
    /// fallback stage.
    pub async fn probe_backend(&self) -> ReadyState {
        self.readiness.set(ReadyState::Loading);
        match self.model.verify().await {
            Ok(()) => {
                info!("language-model backend is ready");
                self.readiness.set(ReadyState::Ready);
            }
            Err(e) => {
                warn!(error = %e, "language-model backend unavailable");
                self.readiness.set(ReadyState::Failed);
            }
        }
        self.readiness.state()
    }

    /// Interpret one instruction into a validated command.
    pub async fn run(&self, text: &str) -> Result<Command> {
        let text = truncate_instruction(text);

        let primary_err = match self.try_primary(text).await {
            Ok(command) => {
                debug!("primary stage produced a valid command");
                return Ok(command);
            }
            Err(e) => e,
        };
        debug!(error = %primary_err, "primary stage failed, trying fallback");

        match self.try_fallback(text) {
            Ok(command) => {
                debug!("fallback stage produced a valid command");
                Ok(command)
            }
            Err(fallback_err) => Err(CommandError::Composite {
                primary: Box::new(primary_err),
                fallback: Box::new(fallback_err),
            }),
        }
    }

    async fn try_primary(&self, text: &str) -> Result<Command> {
        let state = self.readiness.state();
        if state != ReadyState::Ready {
            return Err(CommandError::BackendUnavailable(format!(
                "backend state is {state:?}"
            )));
        }

        let raw = self.primary.interpret(text).await?;
        Validator::new(&self.registry, self.bounds).validate(&raw)
    }

    fn try_fallback(&self, text: &str) -> Result<Command> {
        let raw = match self.fallback.interpret(text) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("no fallback rule matched");
                return Err(e);
            }
        };

        Validator::new(&self.registry, self.bounds)
            .validate(&raw)
            .map_err(|e| {
                // A rule that emits an invalid command is a defect in the
                // rule table, not a property of the input.
                error!(error = %e, "fallback rule produced an invalid command");
                e
            })
    }
}

/// Bound the instruction length, cutting at a char boundary.
fn truncate_instruction(text: &str) -> &str {
    if text.len() <= MAX_INSTRUCTION_LEN {
        return text;
    }
    let mut end = MAX_INSTRUCTION_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    warn!(
        original_len = text.len(),
        "instruction truncated to {MAX_INSTRUCTION_LEN} characters"
    );
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_starts_unknown() {
        let readiness = BackendReadiness::new();
        assert_eq!(readiness.state(), ReadyState::Unknown);
        assert!(!readiness.is_ready());
    }

    #[test]
    fn test_readiness_transitions() {
        let readiness = BackendReadiness::new();
        readiness.set(ReadyState::Loading);
        assert_eq!(readiness.state(), ReadyState::Loading);
        readiness.set(ReadyState::Ready);
        assert!(readiness.is_ready());
        readiness.set(ReadyState::Failed);
        assert_eq!(readiness.state(), ReadyState::Failed);
    }

    #[test]
    fn test_truncate_short_input_untouched() {
        assert_eq!(truncate_instruction("tap the screen"), "tap the screen");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // Multi-byte chars straddling the cut must not split.
        let long = "ü".repeat(MAX_INSTRUCTION_LEN);
        let truncated = truncate_instruction(&long);
        assert!(truncated.len() <= MAX_INSTRUCTION_LEN);
        assert!(truncated.chars().all(|c| c == 'ü'));
    }
}
