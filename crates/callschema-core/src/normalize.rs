//! Annotation normalization
//!
//! Rewrites an [`Annotation`] into the canonical form extraction expects:
//! aliases resolved, metadata wrappers stripped, unions flattened with their
//! literal arms merged into one trailing `Literal`, and optionally abstract
//! container origins replaced by their concrete counterparts.
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

use crate::annotation::{Annotation, LiteralValue};
use tracing::trace;

/// Normalize an annotation to its canonical form
///
/// Applying the function to its own output returns the same annotation.
pub fn normalize(annotation: &Annotation, concretize: bool) -> Annotation {
    let normalized = normalize_rec(annotation, concretize);
    trace!(from = %annotation, to = %normalized, concretize, "normalized annotation");
    normalized
}

/// Inner type of an optional annotation
///
/// Returns `None` when `annotation` is not a union with a `None` arm.
/// The remaining arms are returned as a union, or as the single arm when only
/// one is left.
pub fn unpack_optional(annotation: &Annotation) -> Option<Annotation> {
    let Annotation::Union(arms) = annotation else {
        return None;
    };
    if !arms.iter().any(Annotation::is_none) {
        return None;
    }
    let mut rest: Vec<Annotation> = arms.iter().filter(|arm| !arm.is_none()).cloned().collect();
    match rest.len() {
        0 => Some(Annotation::None),
        1 => Some(rest.remove(0)),
        _ => Some(Annotation::Union(rest)),
    }
}

fn normalize_rec(annotation: &Annotation, concretize: bool) -> Annotation {
    match annotation {
        Annotation::Alias(alias) => normalize_rec(&alias.target, concretize),
        Annotation::Annotated { inner, .. } => normalize_rec(inner, concretize),
        Annotation::Union(arms) => normalize_union(arms, concretize),
        Annotation::Literal(values) => Annotation::Literal(dedup_literals(values.iter())),
        Annotation::Generic { origin, args } => Annotation::Generic {
            origin: if concretize { origin.concretize() } else { *origin },
            args: args.iter().map(|arg| normalize_rec(arg, concretize)).collect(),
        },
        Annotation::Any
        | Annotation::None
        | Annotation::Int
        | Annotation::Float
        | Annotation::Str
        | Annotation::Bool
        | Annotation::Ellipsis
        | Annotation::Class(_) => annotation.clone(),
    }
}

fn normalize_union(arms: &[Annotation], concretize: bool) -> Annotation {
    let mut flat = Vec::with_capacity(arms.len());
    for arm in arms {
        match normalize_rec(arm, concretize) {
            Annotation::Union(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut literals: Vec<&LiteralValue> = Vec::new();
    let mut others: Vec<Annotation> = Vec::new();
    for arm in &flat {
        match arm {
            Annotation::Literal(values) => literals.extend(values),
            other => {
                if !others.contains(other) {
                    others.push(other.clone());
                }
            }
        }
    }
    if !literals.is_empty() {
        others.push(Annotation::Literal(dedup_literals(literals.into_iter())));
    }

    if others.len() == 1 {
        others.remove(0)
    } else {
        Annotation::Union(others)
    }
}

/// Keeps the first occurrence of each value. `1`, `1.0` and `true` stay
/// distinct options.
fn dedup_literals<'a>(values: impl Iterator<Item = &'a LiteralValue>) -> Vec<LiteralValue> {
    let mut result: Vec<LiteralValue> = Vec::new();
    for value in values {
        if !result.iter().any(|seen| seen == value) {
            result.push(value.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{parse, Origin};

    fn norm(text: &str) -> Annotation {
        normalize(&parse(text).unwrap(), false)
    }

    #[test]
    fn test_normalize_table() {
        let cases = [
            ("list", "list"),
            ("list[Annotated[int, 'tag']]", "list[int]"),
            ("list[List[int]]", "list[list[int]]"),
            ("list[Tuple[int, str]]", "list[tuple[int, str]]"),
            ("Union[int, float]", "int | float"),
            ("Optional[int]", "int | None"),
            ("List", "list"),
            ("Union[Union[int, float], str]", "int | float | str"),
            ("Literal[1] | Literal[2] | Literal[3]", "Literal[1, 2, 3]"),
            ("Literal[1, 2] | Union[Literal[2, 3], Literal[3, 4]]", "Literal[1, 2, 3, 4]"),
        ];
        for (input, expected) in cases {
            assert_eq!(norm(input), parse(expected).unwrap(), "normalizing {}", input);
        }
    }

    #[test]
    fn test_literals_trail_other_arms() {
        let normalized = norm("Literal['hehe'] | float");
        assert_eq!(
            normalized,
            Annotation::Union(vec![Annotation::Float, Annotation::literal(["hehe"])])
        );
    }

    #[test]
    fn test_nested_literal_merge_is_stable() {
        let once = norm("Literal[1] | (str | Literal[2])");
        assert_eq!(once, parse("str | Literal[1, 2]").unwrap());
        assert_eq!(normalize(&once, false), once);
    }

    #[test]
    fn test_literal_dedup_keeps_kinds_apart() {
        let normalized = normalize(
            &Annotation::union([
                Annotation::literal([1i64]),
                Annotation::literal([1.0f64]),
                Annotation::literal([true]),
                Annotation::literal([1i64]),
            ]),
            false,
        );
        assert_eq!(
            normalized,
            Annotation::Literal(vec![
                LiteralValue::Int(1),
                LiteralValue::Float(1.0),
                LiteralValue::Bool(true),
            ])
        );
    }

    #[test]
    fn test_alias_resolution() {
        let alias = Annotation::alias("A", parse("int | float").unwrap());
        assert_eq!(normalize(&alias, false), parse("int | float").unwrap());
        assert_eq!(
            normalize(&Annotation::list(alias), false),
            parse("list[int | float]").unwrap()
        );
    }

    #[test]
    fn test_duplicate_arms_collapse() {
        assert_eq!(norm("int | int"), Annotation::Int);
        assert_eq!(norm("int | Annotated[int, 'x'] | None"), parse("int | None").unwrap());
    }

    #[test]
    fn test_unpack_optional() {
        assert_eq!(unpack_optional(&parse("Optional[int]").unwrap()), Some(Annotation::Int));
        assert_eq!(
            unpack_optional(&parse("int | float | None").unwrap()),
            Some(parse("int | float").unwrap())
        );
        assert_eq!(unpack_optional(&Annotation::Int), None);
        assert_eq!(unpack_optional(&parse("int | str").unwrap()), None);
    }

    #[test]
    fn test_concretize() {
        let cases = [
            ("List[collections.abc.Iterable[int]]", "list[list[int]]"),
            ("List[int]", "list[int]"),
            ("int", "int"),
            ("collections.abc.Mapping[str, List[int]]", "dict[str, list[int]]"),
            ("collections.abc.Set[str]", "set[str]"),
            ("ByteString", "bytes"),
        ];
        for (input, expected) in cases {
            assert_eq!(
                normalize(&parse(input).unwrap(), true),
                parse(expected).unwrap(),
                "concretizing {}",
                input
            );
        }
    }

    #[test]
    fn test_without_concretize_keeps_abstract_origin() {
        let normalized = norm("Sequence[int]");
        assert_eq!(normalized, Annotation::generic(Origin::Sequence, [Annotation::Int]));
    }
}
