//! Property-based tests for normalization and projection
//!
//! These tests check invariants that must hold for every annotation the
//! declaration model can express.

#[cfg(test)]
mod tests {
    use crate::annotation::{Annotation, Origin};
    use crate::jsonschema::{JsonSchema, LeafType, LeafTypeName};
    use crate::normalize::normalize;
    use crate::proptest_strategies::*;
    use proptest::prelude::*;

    fn origins(annotation: &Annotation, out: &mut Vec<Origin>) {
        match annotation {
            Annotation::Generic { origin, args } => {
                out.push(*origin);
                args.iter().for_each(|arg| origins(arg, out));
            }
            Annotation::Union(arms) => arms.iter().for_each(|arm| origins(arm, out)),
            Annotation::Alias(alias) => origins(&alias.target, out),
            Annotation::Annotated { inner, .. } => origins(inner, out),
            _ => {}
        }
    }

    fn has_wrappers(annotation: &Annotation) -> bool {
        match annotation {
            Annotation::Alias(_) | Annotation::Annotated { .. } => true,
            Annotation::Generic { args, .. } => args.iter().any(has_wrappers),
            Annotation::Union(arms) => arms.iter().any(has_wrappers),
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(annotation in annotation_strategy(), concretize in any::<bool>()) {
            let once = normalize(&annotation, concretize);
            let twice = normalize(&once, concretize);
            prop_assert_eq!(&once, &twice, "annotation: {}", annotation);
        }

        #[test]
        fn normalize_strips_aliases_and_metadata(annotation in annotation_strategy()) {
            prop_assert!(!has_wrappers(&normalize(&annotation, false)));
        }

        #[test]
        fn concretize_leaves_only_concrete_origins(annotation in annotation_strategy()) {
            let mut found = Vec::new();
            origins(&normalize(&annotation, true), &mut found);
            prop_assert!(found.iter().all(|origin| !origin.is_abstract()), "{:?}", found);
        }

        #[test]
        fn union_projection_never_pairs_integer_and_number(node in primitive_union_strategy()) {
            if let Ok(JsonSchema::Leaf(leaf)) = node.json_schema(None) {
                if let LeafType::Many(names) = leaf.schema_type {
                    prop_assert!(
                        !(names.contains(&LeafTypeName::Integer) && names.contains(&LeafTypeName::Number))
                    );
                    prop_assert!(names.len() > 1);
                }
            }
        }

        #[test]
        fn literal_values_survive_normalization(values in proptest::collection::vec(literal_value_strategy(), 1..6)) {
            let normalized = normalize(&Annotation::Literal(values.clone()), false);
            let Annotation::Literal(kept) = normalized else {
                return Err(TestCaseError::fail("literal changed shape"));
            };
            prop_assert!(values.iter().all(|value| kept.contains(value)));
            prop_assert!(kept.len() <= values.len());
        }
    }
}
