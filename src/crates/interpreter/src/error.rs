//! Error taxonomy for the command-interpretation pipeline.
//!
//! Failures at the primary stage are never surfaced to callers directly;
//! they trigger the fallback stage, and only a `Composite` failure (both
//! stages exhausted) leaves the pipeline.

use thiserror::Error;

/// Result type for interpretation and validation.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Errors that can occur while interpreting an instruction.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The language-model backend could not be reached or is not ready.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend answered, but no JSON object could be extracted.
    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    /// The action name is not in the schema registry.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A required field is absent.
    #[error("{action}: missing required field `{field}`")]
    MissingField { action: String, field: String },

    /// A field value could not be coerced to its declared kind.
    #[error("{action}: field `{field}` expects {expected}, got {got}")]
    TypeCoercion {
        action: String,
        field: String,
        expected: &'static str,
        got: String,
    },

    /// An enum field value is not a member of its closed set.
    #[error("{action}: `{field}` must be one of [{}], got `{value}`", .allowed.join(", "))]
    InvalidEnumValue {
        action: String,
        field: String,
        value: String,
        allowed: &'static [&'static str],
    },

    /// A nested command inside a composite action failed validation.
    #[error("nested command at `{path}`: {source}")]
    InvalidNested {
        path: String,
        source: Box<CommandError>,
    },

    /// Composite nesting exceeded the supported depth.
    #[error("command nesting exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },

    /// No fallback rule matched the instruction.
    #[error("no rule matched the instruction")]
    Unparsable,

    /// Both pipeline stages failed.
    #[error("primary stage failed ({primary}); fallback stage failed ({fallback})")]
    Composite {
        primary: Box<CommandError>,
        fallback: Box<CommandError>,
    },
}

impl CommandError {
    /// Wrap a nested-command failure with the path of the failing element,
    /// flattening chains so the path reads `actions[1].then` instead of a
    /// tower of wrappers.
    pub(crate) fn nested(path: impl Into<String>, err: CommandError) -> CommandError {
        let path = path.into();
        match err {
            CommandError::InvalidNested {
                path: inner,
                source,
            } => CommandError::InvalidNested {
                path: format!("{}.{}", path, inner),
                source,
            },
            other => CommandError::InvalidNested {
                path,
                source: Box::new(other),
            },
        }
    }
}

impl From<llm::LlmError> for CommandError {
    fn from(err: llm::LlmError) -> Self {
        if err.is_transport() {
            CommandError::BackendUnavailable(err.to_string())
        } else {
            CommandError::MalformedResponse(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_error_display_lists_allowed_values() {
        let err = CommandError::InvalidEnumValue {
            action: "scroll".into(),
            field: "direction".into(),
            value: "diagonal".into(),
            allowed: &["up", "down", "left", "right"],
        };
        let msg = err.to_string();
        assert!(msg.contains("up, down, left, right"));
        assert!(msg.contains("diagonal"));
    }

    #[test]
    fn test_nested_paths_flatten() {
        let leaf = CommandError::MissingField {
            action: "tap".into(),
            field: "x".into(),
        };
        let wrapped = CommandError::nested("then", leaf);
        let wrapped = CommandError::nested("actions[1]", wrapped);

        match &wrapped {
            CommandError::InvalidNested { path, .. } => assert_eq!(path, "actions[1].then"),
            other => panic!("expected InvalidNested, got {other:?}"),
        }
        assert!(wrapped.to_string().contains("actions[1].then"));
    }

    #[test]
    fn test_transport_error_maps_to_backend_unavailable() {
        let err: CommandError = llm::LlmError::ServiceUnavailable("down".into()).into();
        assert!(matches!(err, CommandError::BackendUnavailable(_)));

        let err: CommandError = llm::LlmError::InvalidResponse("garbled".into()).into();
        assert!(matches!(err, CommandError::MalformedResponse(_)));
    }
}
