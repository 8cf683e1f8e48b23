//! Default resolution across a class's ancestry.

use crate::class::ConfigClass;
use crate::value::Mapping;

/// Collects every field default visible on `class`.
///
/// Walks the ancestry from the category root down to `class` itself, so a
/// default declared (or overridden) by a more-derived class replaces the one
/// inherited from its ancestors. A field missing from the result has no
/// default anywhere and is therefore required.
///
/// Values are cloned out of the declarations; config instances and lists in
/// the result are never shared with the class or with other callers.
///
/// # Examples
///
/// ```
/// use cfgforge::{gather_defaults, ConfigClass, FieldType, Value};
///
/// let base = ConfigClass::root("A")
///     .field_with_default("field", FieldType::Int, 1)
///     .field("required", FieldType::Str)
///     .build()
///     .unwrap();
/// let derived = ConfigClass::extends("B", &base).default("field", 2).build().unwrap();
///
/// let defaults = gather_defaults(&derived);
/// assert_eq!(defaults["field"], Value::Int(2));
/// assert!(!defaults.contains_key("required"));
/// ```
#[must_use]
pub fn gather_defaults(class: &ConfigClass) -> Mapping {
    let mut defaults = Mapping::new();
    for ancestor in class.ancestry() {
        for decl in ancestor.own_fields() {
            if let Some(value) = decl.default() {
                defaults.insert(decl.name().to_string(), value.clone());
            }
        }
        for (field, value) in ancestor.own_default_overrides() {
            defaults.insert(field.clone(), value.clone());
        }
    }
    defaults
}
