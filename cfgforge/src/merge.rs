//! Layering of nested mappings.
//!
//! Sources are merged from lowest to highest precedence. Mappings merge
//! key-by-key; every other value is replaced wholesale. Two mappings that
//! select different variants (`_name`) do not merge: the higher-precedence
//! one replaces the other, so fields of the old variant are dropped.
//!
//! A scalar met by a mapping is read as a bare variant name and promoted to
//! `{"_name": scalar}` first, the same rule the flat-key normalizer applies,
//! so `model: dit` in one source and `model.layers: 8` in the next select
//! `dit` with eight layers.

use crate::value::{Mapping, Value};
use crate::VARIANT_KEY;

/// Merges `overlay` into `base`, overlay winning.
///
/// # Examples
///
/// ```
/// use cfgforge::{deep_merge, Mapping, Value};
///
/// let base = Mapping::from([
///     ("lr".to_string(), Value::Float(0.1)),
///     ("steps".to_string(), Value::Int(10)),
/// ]);
/// let overlay = Mapping::from([("lr".to_string(), Value::Float(0.01))]);
///
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["lr"], Value::Float(0.01));
/// assert_eq!(merged["steps"], Value::Int(10));
/// ```
#[must_use]
pub fn deep_merge(base: Mapping, overlay: Mapping) -> Mapping {
    let mut merged = base;
    for (key, incoming) in overlay {
        let value = match (merged.remove(&key).and_then(as_mapping), incoming) {
            (Some(existing), Value::Map(incoming)) if same_variant(&existing, &incoming) => {
                Value::Map(deep_merge(existing, incoming))
            }
            (_, incoming) => incoming,
        };
        merged.insert(key, value);
    }
    merged
}

/// Merges every source in order, lowest precedence first.
#[must_use]
pub fn deep_merge_all<I>(sources: I) -> Mapping
where
    I: IntoIterator<Item = Mapping>,
{
    sources.into_iter().fold(Mapping::new(), deep_merge)
}

/// The mapping view of a base value about to receive an overlay mapping.
fn as_mapping(value: Value) -> Option<Mapping> {
    match value {
        Value::Map(map) => Some(map),
        Value::Config(instance) => Some(instance.to_mapping(false)),
        scalar @ (Value::Str(_) | Value::Int(_) | Value::Float(_) | Value::Bool(_)) => {
            Some(Mapping::from([(VARIANT_KEY.to_string(), scalar)]))
        }
        Value::Null | Value::List(_) => None,
    }
}

fn same_variant(base: &Mapping, overlay: &Mapping) -> bool {
    let name = |map: &Mapping| {
        map.get(VARIANT_KEY)
            .and_then(Value::as_str)
            .map(str::to_lowercase)
    };
    match (name(base), name(overlay)) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}
