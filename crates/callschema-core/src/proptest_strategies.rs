//! Property-based testing strategies for generating test data
//!
//! Strategies for random annotations and schema nodes used by the
//! property tests in [`crate::prop_tests`].

#![cfg(test)]

use crate::annotation::{Annotation, LiteralValue, Origin};
use crate::schema::{PrimitiveKind, SchemaNode};
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy for literal constants; floats stay finite so equality holds
pub fn literal_value_strategy() -> impl Strategy<Value = LiteralValue> {
    prop_oneof![
        any::<bool>().prop_map(LiteralValue::Bool),
        (-5i64..5).prop_map(LiteralValue::Int),
        (-5i32..5).prop_map(|n| LiteralValue::Float(f64::from(n) / 2.0)),
        "[a-c]{1,2}".prop_map(LiteralValue::Str),
    ]
}

pub fn origin_strategy() -> impl Strategy<Value = Origin> {
    proptest::sample::select(Origin::ALL.to_vec())
}

/// Strategy for annotations, including aliases and metadata wrappers
pub fn annotation_strategy() -> impl Strategy<Value = Annotation> {
    let leaf = prop_oneof![
        Just(Annotation::Any),
        Just(Annotation::None),
        Just(Annotation::Int),
        Just(Annotation::Float),
        Just(Annotation::Str),
        Just(Annotation::Bool),
        vec(literal_value_strategy(), 1..4).prop_map(Annotation::Literal),
    ];

    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            vec(inner.clone(), 1..4).prop_map(Annotation::Union),
            (origin_strategy(), vec(inner.clone(), 0..3))
                .prop_map(|(origin, args)| Annotation::Generic { origin, args }),
            inner.clone().prop_map(Annotation::tuple_of),
            (inner.clone(), "[a-z]{1,6}")
                .prop_map(|(inner, tag)| Annotation::annotated(inner, [tag])),
            ("[A-Z][a-z]{0,5}", inner).prop_map(|(name, target)| Annotation::alias(name, target)),
        ]
    })
}

/// Strategy for unions over primitive leaves, optionally nullable
pub fn primitive_union_strategy() -> impl Strategy<Value = SchemaNode> {
    let kind = prop_oneof![
        Just(PrimitiveKind::Int),
        Just(PrimitiveKind::Float),
        Just(PrimitiveKind::Str),
        Just(PrimitiveKind::Bool),
    ];
    (vec(kind, 1..5), any::<bool>()).prop_map(|(kinds, nullable)| {
        let mut options: Vec<Option<SchemaNode>> = kinds
            .into_iter()
            .map(|kind| Some(SchemaNode::primitive(kind)))
            .collect();
        if nullable {
            options.push(None);
        }
        SchemaNode::union(options)
    })
}
