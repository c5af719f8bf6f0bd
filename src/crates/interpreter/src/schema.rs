//! Declarative field schemas for device actions.
//!
//! Each action is described by an ordered list of `FieldSpec`s; one
//! generic validation routine interprets the specs, so no per-action
//! branching exists at the call sites.

use serde_json::Value;

/// Screen dimensions used to bound coordinate fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Center point of the screen.
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }
}

impl Default for ScreenBounds {
    /// Fallback dimensions when the device has not reported its screen.
    fn default() -> Self {
        Self::new(1080, 1920)
    }
}

/// The shape and constraints of one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Bounded integer; out-of-range values are clamped.
    Int { min: i64, max: i64 },
    /// Horizontal coordinate, clamped to `[0, screen width]`.
    CoordX,
    /// Vertical coordinate, clamped to `[0, screen height]`.
    CoordY,
    /// Bounded float; out-of-range values are clamped.
    Float { min: f64, max: f64 },
    /// Boolean; accepts JSON bool, 0/1, and "true"/"false".
    Bool,
    /// Closed string set; membership is exact, never coerced.
    Enum(&'static [&'static str]),
    /// Free string, silently truncated to `max_len` characters.
    Text { max_len: usize },
    /// List of integers.
    IntList,
    /// One nested command, validated recursively.
    Command,
    /// List of nested commands, validated recursively.
    CommandList,
    /// UI-probe object `{method, value, exists}`.
    Condition,
    /// Rectangle `{x, y, width, height}` in screen coordinates.
    Region,
    /// Free-form JSON object, passed through untouched.
    Json,
}

impl FieldKind {
    /// Placeholder shown for this field in the model-facing catalog.
    pub fn prompt_hint(&self) -> String {
        match self {
            FieldKind::Int { .. } | FieldKind::CoordX | FieldKind::CoordY => "int".to_string(),
            FieldKind::Float { .. } => "float".to_string(),
            FieldKind::Bool => "bool".to_string(),
            FieldKind::Enum(set) => format!("\"{}\"", set.join("|")),
            FieldKind::Text { .. } => "\"string\"".to_string(),
            FieldKind::IntList => "[int]".to_string(),
            FieldKind::Command => "{...}".to_string(),
            FieldKind::CommandList => "[{...}]".to_string(),
            FieldKind::Condition => {
                "{\"method\": \"text|id|class|xpath\", \"value\": \"string\", \"exists\": bool}"
                    .to_string()
            }
            FieldKind::Region => {
                "{\"x\": int, \"y\": int, \"width\": int, \"height\": int}".to_string()
            }
            FieldKind::Json => "{}".to_string(),
        }
    }
}

/// Default value applied to an absent optional field.
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    Int(i64),
    Float(f64),
    Str(&'static str),
    Bool(bool),
}

impl FieldDefault {
    pub fn to_value(self) -> Value {
        match self {
            FieldDefault::Int(v) => Value::from(v),
            FieldDefault::Float(v) => Value::from(v),
            FieldDefault::Str(v) => Value::from(v),
            FieldDefault::Bool(v) => Value::from(v),
        }
    }
}

/// Whether and when a field must be present.
#[derive(Debug, Clone, Copy)]
pub enum FieldRequirement {
    /// Absence is a validation failure.
    Required,
    /// Absent fields stay absent.
    Optional,
    /// Absent fields are filled with a default.
    Default(FieldDefault),
    /// Required only when a sibling field holds one of the given values.
    RequiredWhen {
        field: &'static str,
        equals: &'static [&'static str],
    },
}

/// One parameter of an action.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub requirement: FieldRequirement,
}

/// Ordered field schema for one action.
///
/// Field order matters: conditionally-required fields must be listed
/// after the sibling field that gates them.
#[derive(Debug, Clone)]
pub struct ActionSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl ActionSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Add a required field.
    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            requirement: FieldRequirement::Required,
        });
        self
    }

    /// Add an optional field without a default.
    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            requirement: FieldRequirement::Optional,
        });
        self
    }

    /// Add an optional field filled with `default` when absent.
    pub fn with_default(mut self, name: &'static str, kind: FieldKind, default: FieldDefault) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            requirement: FieldRequirement::Default(default),
        });
        self
    }

    /// Add a field required only when `gate` holds one of `equals`.
    pub fn required_when(
        mut self,
        name: &'static str,
        kind: FieldKind,
        gate: &'static str,
        equals: &'static [&'static str],
    ) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            requirement: FieldRequirement::RequiredWhen {
                field: gate,
                equals,
            },
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_screen_bounds() {
        let bounds = ScreenBounds::default();
        assert_eq!(bounds.width, 1080);
        assert_eq!(bounds.height, 1920);
        assert_eq!(bounds.center(), (540, 960));
    }

    #[test]
    fn test_schema_builder_preserves_field_order() {
        let schema = ActionSchema::new("file_operation")
            .required("operation", FieldKind::Enum(&["copy", "move", "delete"]))
            .required("source", FieldKind::Text { max_len: 4096 })
            .required_when(
                "destination",
                FieldKind::Text { max_len: 4096 },
                "operation",
                &["copy", "move"],
            );

        let names: Vec<&str> = schema.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["operation", "source", "destination"]);
    }

    #[test]
    fn test_enum_prompt_hint() {
        let hint = FieldKind::Enum(&["up", "down"]).prompt_hint();
        assert_eq!(hint, "\"up|down\"");
    }
}
