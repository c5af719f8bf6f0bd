//! Schema-driven command validation.
//!
//! One generic routine interprets the `FieldSpec`s of the registry:
//! required-field checks, type coercion, silent clamping of bounded
//! numerics, exact enum membership, conditional requirements, defaults,
//! and recursive validation of composite actions. Numeric tolerance is
//! deliberate: a model-proposed tap at (2000, 3000) on a 1080x1920 screen
//! becomes (1080, 1920), not an error. Enum values are never coerced.

use crate::command::{Command, RawCommand};
use crate::error::{CommandError, Result};
use crate::registry::{Registry, ELEMENT_METHODS};
use crate::schema::{ActionSchema, FieldKind, FieldRequirement, FieldSpec, ScreenBounds};
use serde_json::{Map, Value};
use tracing::debug;

/// Maximum nesting depth for composite commands. The original design had
/// no limit; a bound keeps hostile or runaway model output from
/// exhausting the stack.
pub const MAX_NESTING_DEPTH: usize = 10;

/// Validates raw candidates against the schema registry.
pub struct Validator<'a> {
    registry: &'a Registry,
    bounds: ScreenBounds,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a Registry, bounds: ScreenBounds) -> Self {
        Self { registry, bounds }
    }

    /// Validate a raw candidate into a typed command.
    ///
    /// All-or-nothing: any failure means no command, never a partially
    /// defaulted one. Validation is idempotent — re-validating a
    /// serialized valid command yields the identical command.
    pub fn validate(&self, raw: &RawCommand) -> Result<Command> {
        let action = raw.action().unwrap_or("<unknown>").to_string();
        let canonical = self.canonicalize(raw.fields(), 0)?;

        serde_json::from_value(Value::Object(canonical)).map_err(|e| {
            // Only reachable if the registry and the typed model disagree.
            CommandError::TypeCoercion {
                action,
                field: "<typed conversion>".into(),
                expected: "a schema-conforming command",
                got: e.to_string(),
            }
        })
    }

    /// Apply the schema to one (possibly nested) command object, producing
    /// the canonical field map: coerced, clamped, defaulted, and stripped
    /// of keys the schema does not declare.
    fn canonicalize(&self, fields: &Map<String, Value>, depth: usize) -> Result<Map<String, Value>> {
        if depth > MAX_NESTING_DEPTH {
            return Err(CommandError::DepthExceeded {
                max: MAX_NESTING_DEPTH,
            });
        }

        let action = fields
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| CommandError::MissingField {
                action: "command".into(),
                field: "action".into(),
            })?;

        let schema: &ActionSchema = self
            .registry
            .lookup(action)
            .ok_or_else(|| CommandError::UnknownAction(action.to_string()))?;

        let mut out = Map::new();
        out.insert("action".to_string(), Value::from(action));

        for spec in &schema.fields {
            // JSON null counts as absent, so optional fields serialized as
            // null re-validate to the same command.
            match fields.get(spec.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    let coerced = self.coerce(action, spec, value, depth)?;
                    out.insert(spec.name.to_string(), coerced);
                }
                None => match spec.requirement {
                    FieldRequirement::Required => {
                        return Err(CommandError::MissingField {
                            action: action.to_string(),
                            field: spec.name.to_string(),
                        });
                    }
                    FieldRequirement::Default(default) => {
                        out.insert(spec.name.to_string(), default.to_value());
                    }
                    FieldRequirement::Optional => {}
                    FieldRequirement::RequiredWhen { field, equals } => {
                        // Gate fields are declared before their dependents,
                        // so the coerced gate value is already in `out`.
                        let gated = out
                            .get(field)
                            .and_then(Value::as_str)
                            .is_some_and(|v| equals.contains(&v));
                        if gated {
                            return Err(CommandError::MissingField {
                                action: action.to_string(),
                                field: spec.name.to_string(),
                            });
                        }
                    }
                },
            }
        }

        Ok(out)
    }

    fn coerce(&self, action: &str, spec: &FieldSpec, value: &Value, depth: usize) -> Result<Value> {
        let type_error = |expected: &'static str| CommandError::TypeCoercion {
            action: action.to_string(),
            field: spec.name.to_string(),
            expected,
            got: describe(value),
        };

        match spec.kind {
            FieldKind::Int { min, max } => {
                let v = coerce_i64(value).ok_or_else(|| type_error("an integer"))?;
                Ok(Value::from(self.clamp_i64(action, spec.name, v, min, max)))
            }
            FieldKind::CoordX => {
                let v = coerce_i64(value).ok_or_else(|| type_error("an integer"))?;
                Ok(Value::from(self.clamp_i64(
                    action,
                    spec.name,
                    v,
                    0,
                    i64::from(self.bounds.width),
                )))
            }
            FieldKind::CoordY => {
                let v = coerce_i64(value).ok_or_else(|| type_error("an integer"))?;
                Ok(Value::from(self.clamp_i64(
                    action,
                    spec.name,
                    v,
                    0,
                    i64::from(self.bounds.height),
                )))
            }
            FieldKind::Float { min, max } => {
                let v = coerce_f64(value).ok_or_else(|| type_error("a number"))?;
                Ok(Value::from(self.clamp_f64(action, spec.name, v, min, max)))
            }
            FieldKind::Bool => {
                let v = coerce_bool(value).ok_or_else(|| type_error("a boolean"))?;
                Ok(Value::from(v))
            }
            FieldKind::Enum(allowed) => {
                let v = value.as_str().ok_or_else(|| type_error("a string"))?;
                if allowed.contains(&v) {
                    Ok(Value::from(v))
                } else {
                    Err(CommandError::InvalidEnumValue {
                        action: action.to_string(),
                        field: spec.name.to_string(),
                        value: v.to_string(),
                        allowed,
                    })
                }
            }
            FieldKind::Text { max_len } => {
                let v = coerce_string(value).ok_or_else(|| type_error("a string"))?;
                Ok(Value::from(truncate_chars(v, max_len)))
            }
            FieldKind::IntList => {
                let items = value.as_array().ok_or_else(|| type_error("a list of integers"))?;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let v = coerce_i64(item).ok_or_else(|| CommandError::TypeCoercion {
                        action: action.to_string(),
                        field: format!("{}[{}]", spec.name, i),
                        expected: "an integer",
                        got: describe(item),
                    })?;
                    out.push(Value::from(v));
                }
                Ok(Value::Array(out))
            }
            FieldKind::Command => {
                let nested = value.as_object().ok_or_else(|| type_error("a nested command"))?;
                let canonical = self
                    .canonicalize(nested, depth + 1)
                    .map_err(|e| CommandError::nested(spec.name, e))?;
                Ok(Value::Object(canonical))
            }
            FieldKind::CommandList => {
                let items = value
                    .as_array()
                    .ok_or_else(|| type_error("a list of nested commands"))?;
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let path = format!("{}[{}]", spec.name, i);
                    let nested = item.as_object().ok_or_else(|| CommandError::TypeCoercion {
                        action: action.to_string(),
                        field: path.clone(),
                        expected: "a nested command",
                        got: describe(item),
                    })?;
                    let canonical = self
                        .canonicalize(nested, depth + 1)
                        .map_err(|e| CommandError::nested(path, e))?;
                    out.push(Value::Object(canonical));
                }
                Ok(Value::Array(out))
            }
            FieldKind::Condition => self.coerce_condition(action, spec.name, value),
            FieldKind::Region => self.coerce_region(action, spec.name, value),
            FieldKind::Json => {
                if value.is_object() {
                    Ok(value.clone())
                } else {
                    Err(type_error("an object"))
                }
            }
        }
    }

    fn coerce_condition(&self, action: &str, field: &str, value: &Value) -> Result<Value> {
        let obj = value.as_object().ok_or_else(|| CommandError::TypeCoercion {
            action: action.to_string(),
            field: field.to_string(),
            expected: "a condition object",
            got: describe(value),
        })?;

        let method = obj
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| CommandError::MissingField {
                action: action.to_string(),
                field: format!("{field}.method"),
            })?;
        if !ELEMENT_METHODS.contains(&method) {
            return Err(CommandError::InvalidEnumValue {
                action: action.to_string(),
                field: format!("{field}.method"),
                value: method.to_string(),
                allowed: ELEMENT_METHODS,
            });
        }

        let probe_value = obj
            .get("value")
            .and_then(coerce_string)
            .ok_or_else(|| CommandError::MissingField {
                action: action.to_string(),
                field: format!("{field}.value"),
            })?;

        let exists = match obj.get("exists").filter(|v| !v.is_null()) {
            Some(v) => coerce_bool(v).ok_or_else(|| CommandError::TypeCoercion {
                action: action.to_string(),
                field: format!("{field}.exists"),
                expected: "a boolean",
                got: describe(v),
            })?,
            None => true,
        };

        let mut out = Map::new();
        out.insert("method".into(), Value::from(method));
        out.insert("value".into(), Value::from(truncate_chars(probe_value, 1000)));
        out.insert("exists".into(), Value::from(exists));
        Ok(Value::Object(out))
    }

    fn coerce_region(&self, action: &str, field: &str, value: &Value) -> Result<Value> {
        let obj = value.as_object().ok_or_else(|| CommandError::TypeCoercion {
            action: action.to_string(),
            field: field.to_string(),
            expected: "a region object",
            got: describe(value),
        })?;

        let width_max = i64::from(self.bounds.width);
        let height_max = i64::from(self.bounds.height);
        let mut out = Map::new();
        for (key, min, max) in [
            ("x", 0, width_max),
            ("y", 0, height_max),
            ("width", 1, width_max),
            ("height", 1, height_max),
        ] {
            let v = obj
                .get(key)
                .filter(|v| !v.is_null())
                .ok_or_else(|| CommandError::MissingField {
                    action: action.to_string(),
                    field: format!("{field}.{key}"),
                })
                .and_then(|v| {
                    coerce_i64(v).ok_or_else(|| CommandError::TypeCoercion {
                        action: action.to_string(),
                        field: format!("{field}.{key}"),
                        expected: "an integer",
                        got: describe(v),
                    })
                })?;
            out.insert(key.into(), Value::from(self.clamp_i64(action, key, v, min, max)));
        }
        Ok(Value::Object(out))
    }

    fn clamp_i64(&self, action: &str, field: &str, v: i64, min: i64, max: i64) -> i64 {
        let clamped = v.clamp(min, max);
        if clamped != v {
            debug!(action, field, from = v, to = clamped, "clamped out-of-range value");
        }
        clamped
    }

    fn clamp_f64(&self, action: &str, field: &str, v: f64, min: f64, max: f64) -> f64 {
        let clamped = v.clamp(min, max);
        if clamped != v {
            debug!(action, field, from = v, to = clamped, "clamped out-of-range value");
        }
        clamped
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
    .to_string()
}
