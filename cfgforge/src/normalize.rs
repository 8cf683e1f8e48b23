//! Conversion between flat dotted-key mappings and nested mappings.

use crate::builder::CollisionPolicy;
use crate::error::{Error, Result};
use crate::value::{Mapping, Value};
use crate::VARIANT_KEY;

/// Converts flat `separator`-joined keys into a nested mapping.
///
/// Entries are applied shallowest first (ties keep their input order), so a
/// bare variant name such as `model = "dit"` is in place before
/// `model.layers` is layered on top of it. When a prefix already holds a
/// non-mapping value, `policy` decides: [`CollisionPolicy::Promote`] turns
/// the value into `{"_name": value}`, [`CollisionPolicy::Reject`] fails.
/// For any full key the last entry wins.
///
/// # Errors
///
/// Returns [`Error::KeyCollision`] under [`CollisionPolicy::Reject`].
///
/// # Examples
///
/// ```
/// use cfgforge::{normalize, CollisionPolicy, Value};
///
/// let nested = normalize(
///     [("model.layers", Value::from(8)), ("model", Value::from("dit"))],
///     '.',
///     CollisionPolicy::Promote,
/// )
/// .unwrap();
///
/// let model = nested["model"].as_map().unwrap();
/// assert_eq!(model["_name"], Value::from("dit"));
/// assert_eq!(model["layers"], Value::Int(8));
/// ```
pub fn normalize<I, K>(flat: I, separator: char, policy: CollisionPolicy) -> Result<Mapping>
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    let mut entries: Vec<(String, Value)> = flat.into_iter().map(|(k, v)| (k.into(), v)).collect();
    entries.sort_by_key(|(key, _)| key.split(separator).count());

    let mut nested = Mapping::new();
    for (key, value) in entries {
        let segments: Vec<&str> = key.split(separator).collect();
        let Some((last, parents)) = segments.split_last() else {
            continue;
        };

        let mut node = &mut nested;
        for depth in 0..parents.len() {
            node = descend(node, &segments, depth, separator, policy)?;
        }
        node.insert((*last).to_string(), value);
    }
    Ok(nested)
}

/// Returns the mapping at `segments[depth]` inside `node`, creating or
/// promoting it as needed.
fn descend<'m>(
    node: &'m mut Mapping,
    segments: &[&str],
    depth: usize,
    separator: char,
    policy: CollisionPolicy,
) -> Result<&'m mut Mapping> {
    let collision = || Error::KeyCollision {
        path: segments[..=depth].join(&separator.to_string()),
    };

    let slot = node
        .entry(segments[depth].to_string())
        .or_insert_with(|| Value::Map(Mapping::new()));
    if !matches!(*slot, Value::Map(_)) {
        match policy {
            CollisionPolicy::Reject => return Err(collision()),
            CollisionPolicy::Promote => {
                let scalar = std::mem::take(slot);
                log::debug!(
                    "promoting '{}' = {scalar} to a variant selection",
                    segments[..=depth].join(&separator.to_string())
                );
                *slot = Value::Map(Mapping::from([(VARIANT_KEY.to_string(), scalar)]));
            }
        }
    }
    match slot {
        Value::Map(map) => Ok(map),
        _ => Err(collision()),
    }
}

/// Flattens a nested mapping into `separator`-joined keys.
///
/// Lists and empty mappings are kept as values, as is any mapping with an
/// empty key or a key containing `separator`, so that [`normalize`] rebuilds
/// the same tree. Config instances are flattened through their own mapping.
#[must_use]
pub fn flatten(nested: &Mapping, separator: char) -> Mapping {
    let mut flat = Mapping::new();
    flatten_into(&mut flat, "", nested, separator);
    flat
}

fn flatten_into(flat: &mut Mapping, prefix: &str, nested: &Mapping, separator: char) {
    for (key, value) in nested {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{separator}{key}")
        };
        match value {
            Value::Map(inner) if splittable(inner, separator) => {
                flatten_into(flat, &full, inner, separator);
            }
            Value::Config(instance) => {
                flatten_into(flat, &full, &instance.to_mapping(false), separator);
            }
            other => {
                flat.insert(full, other.clone());
            }
        }
    }
}

fn splittable(map: &Mapping, separator: char) -> bool {
    !map.is_empty()
        && map
            .keys()
            .all(|key| !key.is_empty() && !key.contains(separator))
}
