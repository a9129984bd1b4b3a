//! Schema extraction from callable declarations
//!
//! [`SchemaExtractor::extract_schema`] turns a [`Callable`] into a
//! [`CallableSchema`]:
//!
//! 1. registered [`ExtractionStrategy`]s are consulted in order, and the
//!    first one that claims the declaration wins;
//! 2. otherwise the callable's signature is used, or for classes without
//!    one, the initializer's signature without its receiver;
//! 3. documentation supplies the object hint, the long description and the
//!    per-parameter hints (a class's own documentation takes precedence over
//!    its initializer's);
//! 4. every annotation is normalized and converted to a [`SchemaNode`],
//!    recursing into class annotations.
//!
//! The strategy list is fixed when the extractor is built, so one extractor
//! can be shared by any number of threads.
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

pub mod datetime;
mod strategy;

pub use datetime::DateTimeStrategy;
pub use strategy::ExtractionStrategy;

use crate::annotation::{Annotation, Origin};
use crate::callable::Callable;
use crate::docstring;
use crate::normalize::normalize;
use crate::schema::{CallableSchema, ObjectField, ObjectNode, PrimitiveKind, SchemaNode};
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Extracts schemas, consulting a fixed list of strategies first
#[derive(Clone)]
pub struct SchemaExtractor {
    strategies: Arc<[Arc<dyn ExtractionStrategy>]>,
}

impl std::fmt::Debug for SchemaExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaExtractor")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

impl Default for SchemaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaExtractor {
    /// Extractor with the built-in date/time strategy
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Extractor without any strategy
    pub fn empty() -> Self {
        Self::builder().without_defaults().build()
    }

    pub fn builder() -> SchemaExtractorBuilder {
        SchemaExtractorBuilder::new()
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Build the schema of `callable`
    ///
    /// Every failure is reported as [`Error::Extraction`] naming the callable.
    pub fn extract_schema(&self, callable: &Callable) -> Result<CallableSchema> {
        debug!(callable = callable.name(), "extracting schema");
        self.extract_inner(callable).map_err(|err| match err {
            Error::Extraction { ref target, .. } if target == callable.name() => err,
            other => Error::extraction(callable.name(), other),
        })
    }

    fn extract_inner(&self, callable: &Callable) -> Result<CallableSchema> {
        for strategy in self.strategies.iter() {
            if let Some(schema) = strategy.extract(callable)? {
                debug!(
                    callable = callable.name(),
                    strategy = strategy.name(),
                    "schema supplied by strategy"
                );
                return Ok(schema);
            }
        }

        let signature = match (callable.signature(), callable.initializer()) {
            (Some(signature), _) => signature.clone(),
            (None, Some(initializer)) => initializer.signature.strip_receiver(),
            (None, None) => {
                return Err(Error::extraction_msg(
                    callable.name(),
                    "callable has no introspectable signature",
                ))
            }
        };

        let hints = DocstringHints::of(callable);
        let fields = signature
            .parameters
            .iter()
            .map(|param| {
                let schema = match &param.annotation {
                    Some(annotation) => self.annotation_to_schema(annotation)?,
                    None => SchemaNode::undefined(Annotation::Any),
                };
                Ok(ObjectField {
                    name: param.name.clone(),
                    schema,
                    hint: hints.param_hints.get(&param.name).cloned(),
                    required: !param.has_default,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let return_schema = match &signature.returns {
            None => SchemaNode::undefined(Annotation::Any),
            Some(annotation) => self.annotation_to_schema(annotation)?,
        };

        Ok(CallableSchema {
            call_schema: ObjectNode {
                constructor: callable.constructor().clone(),
                positional_only: signature.positional_only(),
                name: callable.name().to_string(),
                fields,
                hint: hints.object_hint,
            },
            return_schema,
            long_description: hints.long_description,
        })
    }

    /// Convert an annotation to a schema node
    pub fn annotation_to_schema(&self, annotation: &Annotation) -> Result<SchemaNode> {
        let normalized = normalize(annotation, true);
        self.convert(&normalized)
    }

    fn convert(&self, annotation: &Annotation) -> Result<SchemaNode> {
        match annotation {
            Annotation::Any | Annotation::None => Ok(SchemaNode::undefined(annotation.clone())),
            Annotation::Int => Ok(SchemaNode::primitive(PrimitiveKind::Int)),
            Annotation::Float => Ok(SchemaNode::primitive(PrimitiveKind::Float)),
            Annotation::Str => Ok(SchemaNode::primitive(PrimitiveKind::Str)),
            Annotation::Bool => Ok(SchemaNode::primitive(PrimitiveKind::Bool)),
            Annotation::Literal(values) => Ok(SchemaNode::literal(values.clone())),
            Annotation::Union(arms) => {
                let options = arms
                    .iter()
                    .map(|arm| match arm {
                        Annotation::None => Ok(None),
                        other => self.convert(other).map(Some),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SchemaNode::union(options))
            }
            Annotation::Generic { origin, args } => self.convert_generic(annotation, *origin, args),
            Annotation::Class(class) => {
                let callable = class.callable();
                let nested = self
                    .extract_inner(callable)
                    .map_err(|err| Error::extraction(callable.name(), err))?;
                Ok(SchemaNode::Object(nested.call_schema))
            }
            Annotation::Alias(_) | Annotation::Annotated { .. } | Annotation::Ellipsis => {
                Err(unsupported_annotation(annotation))
            }
        }
    }

    fn convert_generic(
        &self,
        annotation: &Annotation,
        origin: Origin,
        args: &[Annotation],
    ) -> Result<SchemaNode> {
        match origin {
            Origin::List => match args {
                [item] => Ok(SchemaNode::sequence(origin, self.convert(item)?)),
                _ => Err(Error::declaration(format!(
                    "{} requires exactly one type argument, got {}",
                    annotation,
                    args.len()
                ))),
            },
            Origin::Tuple => match args {
                [item, Annotation::Ellipsis] => {
                    Ok(SchemaNode::sequence(origin, self.convert(item)?))
                }
                _ => {
                    let items = args
                        .iter()
                        .map(|arg| self.convert(arg))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(SchemaNode::tuple(origin, items))
                }
            },
            Origin::Dict => match args {
                [key, value] => Ok(SchemaNode::mapping(
                    origin,
                    self.convert(key)?,
                    self.convert(value)?,
                )),
                _ => Err(Error::declaration(format!(
                    "{} requires exactly two type arguments, got {}",
                    annotation,
                    args.len()
                ))),
            },
            Origin::Set
            | Origin::FrozenSet
            | Origin::Bytes
            | Origin::AbstractSet
            | Origin::MutableSet
            | Origin::Mapping
            | Origin::MutableMapping
            | Origin::MappingView
            | Origin::Sequence
            | Origin::MutableSequence
            | Origin::ValuesView
            | Origin::KeysView
            | Origin::Iterable
            | Origin::Iterator
            | Origin::Container
            | Origin::Collection
            | Origin::Sized
            | Origin::Reversible
            | Origin::ByteString => Err(unsupported_annotation(annotation)),
        }
    }
}

fn unsupported_annotation(annotation: &Annotation) -> Error {
    Error::declaration(format!("Unsupported type annotation: {}", annotation))
}

/// Hints gathered from a callable's documentation
#[derive(Debug, Default)]
struct DocstringHints {
    object_hint: Option<String>,
    long_description: Option<String>,
    param_hints: HashMap<String, String>,
}

impl DocstringHints {
    fn of(callable: &Callable) -> Self {
        let mut hints = DocstringHints::default();
        if let Some(doc) = callable.doc() {
            hints.absorb(&docstring::parse(doc));
        }
        if callable.is_class() {
            if let Some(doc) = callable.initializer().and_then(|init| init.doc.as_deref()) {
                hints.absorb(&docstring::parse(doc));
            }
        }
        hints
    }

    /// Fill whatever is still missing from `doc`
    fn absorb(&mut self, doc: &docstring::Docstring) {
        if self.object_hint.is_none() {
            self.object_hint = doc.short_description.clone();
        }
        if self.long_description.is_none() {
            self.long_description = doc.long_description.clone();
        }
        for param in &doc.params {
            if let Some(hint) = doc.param_hint(&param.name) {
                self.param_hints
                    .entry(param.name.clone())
                    .or_insert_with(|| hint.to_string());
            }
        }
    }
}

/// Builder for [`SchemaExtractor`]
///
/// Strategies are consulted in the order they are added, after the defaults
/// unless [`without_defaults`](Self::without_defaults) is called.
pub struct SchemaExtractorBuilder {
    defaults: bool,
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl SchemaExtractorBuilder {
    fn new() -> Self {
        Self {
            defaults: true,
            strategies: Vec::new(),
        }
    }

    /// Register a strategy
    pub fn strategy(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    /// Skip the built-in date/time strategy
    pub fn without_defaults(mut self) -> Self {
        self.defaults = false;
        self
    }

    pub fn build(self) -> SchemaExtractor {
        let mut strategies: Vec<Arc<dyn ExtractionStrategy>> = Vec::new();
        if self.defaults {
            strategies.push(Arc::new(DateTimeStrategy::new()));
        }
        strategies.extend(self.strategies);
        SchemaExtractor {
            strategies: strategies.into(),
        }
    }
}

/// Process-wide extractor with the default strategies
pub fn default_extractor() -> &'static SchemaExtractor {
    static DEFAULT: OnceLock<SchemaExtractor> = OnceLock::new();
    DEFAULT.get_or_init(SchemaExtractor::new)
}

/// Extract with the default extractor
pub fn extract_schema(callable: &Callable) -> Result<CallableSchema> {
    default_extractor().extract_schema(callable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::{Initializer, Parameter, RECEIVER};

    struct Fixed;

    impl ExtractionStrategy for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn extract(&self, callable: &Callable) -> Result<Option<CallableSchema>> {
            if callable.name() != "claimed" {
                return Ok(None);
            }
            Ok(Some(CallableSchema {
                call_schema: ObjectNode {
                    constructor: callable.constructor().clone(),
                    positional_only: vec![],
                    name: "claimed".into(),
                    fields: vec![],
                    hint: Some("From strategy.".into()),
                },
                return_schema: SchemaNode::undefined(Annotation::None),
                long_description: None,
            }))
        }
    }

    #[test]
    fn test_strategy_order() {
        let extractor = SchemaExtractor::builder().strategy(Fixed).build();
        assert_eq!(extractor.strategy_names(), vec!["datetime", "fixed"]);
        assert_eq!(SchemaExtractor::empty().strategy_names(), Vec::<&str>::new());

        let claimed = Callable::function("claimed")
            .param(Parameter::new("ignored", Annotation::Int))
            .build()
            .unwrap();
        let schema = extractor.extract_schema(&claimed).unwrap();
        assert!(schema.call_schema.fields.is_empty());
        assert_eq!(schema.call_schema.hint.as_deref(), Some("From strategy."));
    }

    #[test]
    fn test_function_fields() {
        let foo = Callable::function("foo")
            .param(Parameter::new("x", Annotation::Int))
            .param(Parameter::new("y", Annotation::Str).with_default())
            .build()
            .unwrap();
        let schema = SchemaExtractor::empty().extract_schema(&foo).unwrap();
        let fields: Vec<_> = schema
            .call_schema
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.schema.clone(), f.required))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("x", SchemaNode::primitive(PrimitiveKind::Int), true),
                ("y", SchemaNode::primitive(PrimitiveKind::Str), false),
            ]
        );
        assert_eq!(schema.return_schema, SchemaNode::undefined(Annotation::Any));
    }

    #[test]
    fn test_generic_conversion() {
        let extractor = SchemaExtractor::empty();
        let cases = vec![
            (
                Annotation::tuple_of(Annotation::Int),
                SchemaNode::sequence(Origin::Tuple, SchemaNode::primitive(PrimitiveKind::Int)),
            ),
            (
                Annotation::generic(Origin::Sequence, [Annotation::Str]),
                SchemaNode::sequence(Origin::List, SchemaNode::primitive(PrimitiveKind::Str)),
            ),
            (
                Annotation::generic(Origin::Mapping, [Annotation::Str, Annotation::Int]),
                SchemaNode::mapping(
                    Origin::Dict,
                    SchemaNode::primitive(PrimitiveKind::Str),
                    SchemaNode::primitive(PrimitiveKind::Int),
                ),
            ),
            (
                Annotation::optional(Annotation::Int),
                SchemaNode::union(vec![Some(SchemaNode::primitive(PrimitiveKind::Int)), None]),
            ),
        ];
        for (annotation, expected) in cases {
            assert_eq!(
                extractor.annotation_to_schema(&annotation).unwrap(),
                expected,
                "{}",
                annotation
            );
        }
    }

    #[test]
    fn test_rejected_annotations() {
        let extractor = SchemaExtractor::empty();
        let cases = vec![
            Annotation::generic(Origin::List, []),
            Annotation::generic(Origin::List, [Annotation::Int, Annotation::Str]),
            Annotation::generic(Origin::Dict, [Annotation::Str]),
            Annotation::generic(Origin::Set, [Annotation::Int]),
            Annotation::generic(Origin::Bytes, []),
        ];
        for annotation in cases {
            assert!(extractor.annotation_to_schema(&annotation).is_err(), "{}", annotation);
        }
    }

    #[test]
    fn test_errors_name_the_callable() {
        let bad = Callable::function("bad")
            .param(Parameter::new("s", Annotation::generic(Origin::Set, [Annotation::Int])))
            .build()
            .unwrap();
        let err = SchemaExtractor::empty().extract_schema(&bad).unwrap_err();
        match err {
            Error::Extraction { ref target, ref message, .. } => {
                assert_eq!(target, "bad");
                assert!(message.contains("Unsupported type annotation: set[int]"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_class_hints_take_precedence() {
        let class = Callable::class("Baz")
            .doc("I am Baz.\n\nArgs:\n    a: Class-level a.")
            .initializer(
                Initializer::new()
                    .doc("Init.\n\nArgs:\n    a: Init a.\n    b: Init b.")
                    .param(Parameter::untyped(RECEIVER))
                    .param(Parameter::new("a", Annotation::Int))
                    .param(Parameter::new("b", Annotation::Int)),
            )
            .build()
            .unwrap();
        let schema = SchemaExtractor::empty().extract_schema(&class).unwrap();
        let call = &schema.call_schema;
        assert_eq!(call.hint.as_deref(), Some("I am Baz."));
        assert_eq!(call.field("a").unwrap().hint.as_deref(), Some("Class-level a."));
        assert_eq!(call.field("b").unwrap().hint.as_deref(), Some("Init b."));
        assert!(call.field(RECEIVER).is_none());
    }

    #[test]
    fn test_missing_signature() {
        let opaque = Callable::class("Opaque").build().unwrap();
        let err = SchemaExtractor::empty().extract_schema(&opaque).unwrap_err();
        assert!(err.to_string().contains("no introspectable signature"));
    }

    #[test]
    fn test_default_extractor_is_shared() {
        assert!(std::ptr::eq(default_extractor(), default_extractor()));
    }
}
