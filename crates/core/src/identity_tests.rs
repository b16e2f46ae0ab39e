// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use proptest::prelude::*;
use serde_json::json;

use super::*;

fn hash_of(id: &SourceIdentity) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn identical_configs_in_different_key_order_are_equal() {
    let a = SourceIdentity::new(
        ModuleClass::from("pkg.Source"),
        json!({"a": 1, "b": {"y": 2, "x": 1}}),
    )
    .unwrap();
    let b = SourceIdentity::new(
        ModuleClass::from("pkg.Source"),
        json!({"b": {"x": 1, "y": 2}, "a": 1}),
    )
    .unwrap();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn different_module_class_is_a_different_identity() {
    let a = SourceIdentity::new(ModuleClass::from("pkg.A"), json!({"x": 1})).unwrap();
    let b = SourceIdentity::new(ModuleClass::from("pkg.B"), json!({"x": 1})).unwrap();
    assert_ne!(a, b);
}

#[test]
fn different_values_are_a_different_identity() {
    let a = SourceIdentity::new(ModuleClass::from("pkg.A"), json!({"x": 1})).unwrap();
    let b = SourceIdentity::new(ModuleClass::from("pkg.A"), json!({"x": 2})).unwrap();
    assert_ne!(a, b);
}

#[test]
fn display_embeds_canonical_json() {
    let id = SourceIdentity::new(ModuleClass::from("pkg.A"), json!({"x": 1})).unwrap();
    assert_eq!(id.to_string(), r#"pkg.A({"x":1})"#);
}

proptest! {
    #[test]
    fn canonicalization_is_independent_of_key_order(
        a in 0i64..100,
        b in 0i64..100,
        c in 0i64..100,
    ) {
        let forward = SourceIdentity::new(
            ModuleClass::from("pkg.Source"),
            json!({"a": a, "b": b, "c": c}),
        ).unwrap();
        let shuffled = SourceIdentity::new(
            ModuleClass::from("pkg.Source"),
            json!({"c": c, "a": a, "b": b}),
        ).unwrap();
        prop_assert_eq!(forward, shuffled);
    }
}
