//! Value coercion: turning raw input into values of a declared type.
//!
//! Dispatch follows [`FieldType::classify`]:
//!
//! | shape                     | accepted raw input                                     |
//! |---------------------------|--------------------------------------------------------|
//! | config class              | instance of the class, variant-name string, mapping    |
//! | optional config class     | as above, or null / `"none"` / `"null"`                |
//! | union with a config class | as above, or a scalar matching a non-config member     |
//! | list of config classes    | list (or JSON array string), coerced element-wise      |
//! | anything else             | JSON literal string, then the lax scalar table         |
//!
//! The lax scalar table converts numeric strings to numbers, integral
//! floats to ints, ints to floats and the usual boolean spellings to bools.
//! Unions try every member exactly first and loosely second, in order.

use std::sync::Arc;

use crate::builder::Resolver;
use crate::class::ConfigClass;
use crate::error::{Error, Result};
use crate::types::{FieldType, TypeShape};
use crate::value::{Value, MAX_DISPLAY_LEN};

/// How loosely [`validate`] matches a value against a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only values already of the right kind.
    Exact,
    /// Also lossless conversions and string parsing.
    Lax,
}

impl Resolver<'_> {
    /// Coerces `raw` to `ty`.
    ///
    /// Config-typed values recurse into the builder; `path` is the dotted
    /// path used in diagnostics and for nested fields.
    ///
    /// # Errors
    ///
    /// Any build error of a nested config. [`Error::TypeMismatch`] when the
    /// value cannot be coerced and the resolver is strict; a lenient resolver
    /// logs a warning and returns `raw` unchanged instead.
    pub fn coerce(&self, raw: Value, ty: &FieldType, path: &str) -> Result<Value> {
        log::trace!("coercing '{path}' ({}) to {ty}", raw.kind());
        match ty.classify() {
            TypeShape::ConfigType(class) => self.coerce_config(raw, ty, class, &[], path),
            TypeShape::OptionalConfigType(class) => {
                if raw.is_null_like() {
                    Ok(Value::Null)
                } else {
                    self.coerce_config(raw, ty, class, &[], path)
                }
            }
            TypeShape::Union {
                members,
                config: Some(class),
            } => self.coerce_config(raw, ty, class, members, path),
            TypeShape::Optional(inner) if inner.is_config_type() || inner.is_config_list() => {
                if raw.is_null_like() {
                    Ok(Value::Null)
                } else {
                    self.coerce(raw, inner, path)
                }
            }
            TypeShape::List(element) if element.is_config_type() => {
                self.coerce_config_list(raw, ty, element, path)
            }
            _ => self.coerce_scalar(raw, ty, path),
        }
    }

    fn coerce_config(
        &self,
        raw: Value,
        ty: &FieldType,
        class: &Arc<ConfigClass>,
        union_members: &[FieldType],
        path: &str,
    ) -> Result<Value> {
        match raw {
            Value::Config(instance) if instance.class().is_subclass_of(class) => {
                Ok(Value::Config(instance))
            }
            raw @ (Value::Str(_) | Value::Map(_)) => {
                self.build(class, raw, path).map(Value::Config)
            }
            other => {
                let scalars: Vec<FieldType> = union_members
                    .iter()
                    .filter(|member| !member.is_config_type())
                    .cloned()
                    .collect();
                if !scalars.is_empty() {
                    if let Ok(value) = validate(&other, &FieldType::Union(scalars), Mode::Lax) {
                        return Ok(value);
                    }
                }
                let reason = match &other {
                    Value::Config(instance) => format!(
                        "{} is not {} or one of its variants",
                        instance.class().name(),
                        class.name()
                    ),
                    value => format!(
                        "expected a variant name or mapping for {}, got {}",
                        class.name(),
                        value.kind()
                    ),
                };
                self.mismatch(other, ty, path, reason)
            }
        }
    }

    fn coerce_config_list(
        &self,
        raw: Value,
        ty: &FieldType,
        element: &FieldType,
        path: &str,
    ) -> Result<Value> {
        let items = match raw {
            Value::List(items) => items,
            Value::Str(text) => match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(serde_json::Value::Array(items)) => items.into_iter().map(Value::from).collect(),
                _ => {
                    return self.mismatch(
                        Value::Str(text),
                        ty,
                        path,
                        "string is not a JSON array".to_string(),
                    )
                }
            },
            other => {
                let reason = format!("expected a list, got {}", other.kind());
                return self.mismatch(other, ty, path, reason);
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| self.coerce(item, element, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }

    fn coerce_scalar(&self, raw: Value, ty: &FieldType, path: &str) -> Result<Value> {
        if let Value::Str(text) = &raw {
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(text) {
                if let Ok(value) = validate(&Value::from(parsed), ty, Mode::Lax) {
                    return Ok(value);
                }
            }
        }
        match validate(&raw, ty, Mode::Lax) {
            Ok(value) => Ok(value),
            Err(reason) => self.mismatch(raw, ty, path, reason),
        }
    }

    fn mismatch(&self, raw: Value, ty: &FieldType, path: &str, reason: String) -> Result<Value> {
        let shown = raw.display_truncated(MAX_DISPLAY_LEN);
        if self.options().strict {
            return Err(Error::TypeMismatch {
                path: path.to_string(),
                expected: ty.to_string(),
                value: shown,
                reason,
            });
        }
        log::warn!("could not coerce '{path}' to {ty} ({reason}); keeping {shown} as given");
        Ok(raw)
    }
}

/// Matches `value` against `ty`, converting where `mode` allows.
///
/// Config classes are matched by instance only; building from mappings is
/// the resolver's job.
///
/// # Errors
///
/// A human-readable reason when the value does not fit.
///
/// # Examples
///
/// ```
/// use cfgforge::coerce::{validate, Mode};
/// use cfgforge::{FieldType, Value};
///
/// assert_eq!(validate(&Value::from(" 42 "), &FieldType::Int, Mode::Lax), Ok(Value::Int(42)));
/// assert!(validate(&Value::from("42"), &FieldType::Int, Mode::Exact).is_err());
/// ```
pub fn validate(value: &Value, ty: &FieldType, mode: Mode) -> std::result::Result<Value, String> {
    let lax = mode == Mode::Lax;
    match (ty, value) {
        (FieldType::Any, v) => Ok(v.clone()),

        (FieldType::Bool, Value::Bool(b)) => Ok(Value::Bool(*b)),
        (FieldType::Bool, Value::Int(i @ (0 | 1))) if lax => Ok(Value::Bool(*i == 1)),
        (FieldType::Bool, Value::Str(s)) if lax => parse_bool(s)
            .map(Value::Bool)
            .ok_or_else(|| format!("'{s}' is not a valid boolean")),

        (FieldType::Int, Value::Int(i)) => Ok(Value::Int(*i)),
        (FieldType::Int, Value::Float(x)) if lax => float_to_int(*x)
            .map(Value::Int)
            .ok_or_else(|| format!("{x:?} has a fractional part or is out of range")),
        (FieldType::Int, Value::Str(s)) if lax => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| format!("'{s}' is not a valid integer: {e}")),

        (FieldType::Float, Value::Float(x)) => Ok(Value::Float(*x)),
        (FieldType::Float, Value::Int(i)) if lax => Ok(Value::Float(int_to_float(*i))),
        (FieldType::Float, Value::Str(s)) if lax => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| format!("'{s}' is not a valid float: {e}")),

        (FieldType::Str, Value::Str(s)) => Ok(Value::Str(s.clone())),

        (FieldType::Optional(_), Value::Null) => Ok(Value::Null),
        (FieldType::Optional(_), v) if lax && v.is_null_like() => Ok(Value::Null),
        (FieldType::Optional(inner), v) => validate(v, inner, mode),

        (FieldType::List(element), Value::List(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| validate(item, element, mode).map_err(|e| format!("item {i}: {e}")))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::List),

        (FieldType::Union(members), v) => {
            let passes: &[Mode] = if lax {
                &[Mode::Exact, Mode::Lax]
            } else {
                &[Mode::Exact]
            };
            passes
                .iter()
                .find_map(|pass| members.iter().find_map(|m| validate(v, m, *pass).ok()))
                .ok_or_else(|| format!("{} matches no member of {ty}", v.kind()))
        }

        (FieldType::Config(class), Value::Config(instance))
            if instance.class().is_subclass_of(class) =>
        {
            Ok(value.clone())
        }

        (ty, v) => Err(format!("expected {ty}, got {}", v.kind())),
    }
}

/// Parses the common boolean spellings, case-insensitively.
#[must_use]
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn int_to_float(i: i64) -> f64 {
    i as f64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_int(x: f64) -> Option<i64> {
    let in_range = x >= i64::MIN as f64 && x < i64::MAX as f64;
    (x.is_finite() && x.fract() == 0.0 && in_range).then(|| x as i64)
}
