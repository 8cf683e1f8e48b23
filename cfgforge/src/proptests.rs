//! Property-based tests for resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;

use crate::builder::{CollisionPolicy, Resolver};
use crate::class::ConfigClass;
use crate::normalize::normalize;
use crate::registry::Registry;
use crate::types::FieldType;
use crate::value::Value;

struct Hierarchy {
    registry: Registry,
    experiment: Arc<ConfigClass>,
}

fn hierarchy() -> Hierarchy {
    let model = ConfigClass::root("ModelConfig")
        .field_with_default("version", FieldType::Str, "0.1.0")
        .build()
        .unwrap();
    let dit = ConfigClass::extends("DiT", &model)
        .field_with_default("layers", FieldType::Int, 16)
        .field_with_default("dropout", FieldType::Float, 0.1)
        .field_with_default("tags", FieldType::list(FieldType::Str), Value::List(vec![]))
        .build()
        .unwrap();
    let unet = ConfigClass::extends("Unet", &model)
        .field_with_default("conv", FieldType::Str, "DISCO")
        .field_with_default("channels", FieldType::list(FieldType::Int), "[64, 128]")
        .build()
        .unwrap();
    let experiment = ConfigClass::root("Experiment")
        .field("model", FieldType::config(&model))
        .field("seed", FieldType::Int)
        .field_with_default("lr", FieldType::Float, 0.001)
        .field_with_default("note", FieldType::optional(FieldType::Str), Value::Null)
        .build()
        .unwrap();

    let mut registry = Registry::new();
    for class in [&model, &dit, &unet, &experiment] {
        registry.register(class);
    }
    Hierarchy {
        registry,
        experiment,
    }
}

// Strategy for flat overrides of an Experiment
fn overrides_strategy() -> impl Strategy<Value = Vec<(String, Value)>> {
    let dit = (
        any::<i64>(),
        -1.0e6f64..1.0e6,
        prop::collection::vec("[a-z0-9]{1,8}", 0..4),
    )
        .prop_map(|(layers, dropout, tags)| {
            vec![
                ("model".to_string(), Value::from("dit")),
                ("model.layers".to_string(), Value::from(layers.to_string())),
                ("model.dropout".to_string(), Value::Float(dropout)),
                (
                    "model.tags".to_string(),
                    Value::List(tags.into_iter().map(Value::from).collect()),
                ),
            ]
        });
    let unet = ("[A-Za-z]{1,10}", prop::collection::vec(any::<i32>(), 0..4)).prop_map(
        |(conv, channels)| {
            vec![
                ("model._name".to_string(), Value::from("UNET")),
                ("model.conv".to_string(), Value::from(conv)),
                (
                    "model.channels".to_string(),
                    Value::List(channels.into_iter().map(Value::from).collect()),
                ),
            ]
        },
    );
    (
        prop_oneof![dit, unet],
        any::<i64>(),
        prop::option::of("[a-z ]{0,12}"),
    )
        .prop_map(|(mut pairs, seed, note)| {
            pairs.push(("seed".to_string(), Value::Int(seed)));
            if let Some(note) = note {
                pairs.push(("note".to_string(), Value::from(note)));
            }
            pairs
        })
}

// Distinct dotted keys over a tiny alphabet so prefixes collide often
fn flat_keys_strategy() -> impl Strategy<Value = BTreeMap<String, i64>> {
    prop::collection::btree_map("[a-c](\\.[a-c]){0,2}", any::<i64>(), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        max_shrink_iters: 1000,
        .. ProptestConfig::default()
    })]

    // Flattening an instance and rebuilding it yields an equal instance
    #[test]
    fn flat_round_trip(overrides in overrides_strategy()) {
        let h = hierarchy();
        let resolver = Resolver::new(&h.registry);
        let built = resolver.build_from_flat(&h.experiment, overrides).unwrap();
        let rebuilt = resolver
            .build_from_flat(built.class(), built.to_mapping(true))
            .unwrap();
        prop_assert_eq!(rebuilt, built);
    }

    // A descendant's default replaces the ancestor's
    #[test]
    fn descendant_default_wins(ancestor in any::<i64>(), descendant in any::<i64>()) {
        let a = ConfigClass::root("A")
            .field_with_default("field", FieldType::Int, ancestor)
            .build()
            .unwrap();
        let b = ConfigClass::extends("B", &a).default("field", descendant).build().unwrap();
        let registry = Registry::new();

        prop_assert_eq!(&b.defaults()["field"], &Value::Int(descendant));
        let built = registry.build_from_nested(&b, BTreeMap::new(), true).unwrap();
        prop_assert_eq!(built.get("field"), Some(&Value::Int(descendant)));
    }

    // Normalization does not depend on the order keys arrive in
    #[test]
    fn normalize_is_order_independent(keys in flat_keys_strategy()) {
        let forward: Vec<(String, Value)> =
            keys.iter().map(|(k, v)| (k.clone(), Value::Int(*v))).collect();
        let mut backward = forward.clone();
        backward.reverse();

        let a = normalize(forward, '.', CollisionPolicy::Promote).unwrap();
        let b = normalize(backward, '.', CollisionPolicy::Promote).unwrap();
        prop_assert_eq!(a, b);
    }

    // Integer strings coerce to the integer they spell
    #[test]
    fn integer_strings_coerce(n in any::<i64>()) {
        let registry = Registry::new();
        let value = Resolver::new(&registry)
            .coerce(Value::from(n.to_string()), &FieldType::Int, "n")
            .unwrap();
        prop_assert_eq!(value, Value::Int(n));
    }
}
