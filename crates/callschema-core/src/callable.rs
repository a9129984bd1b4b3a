//! Callable declarations
//!
//! A [`Callable`] is the explicit, ahead-of-time description of a function
//! or class that extraction turns into a schema: its parameters and their
//! annotations, its documentation, and the constructor that evaluation will
//! invoke. Declarations are assembled with [`CallableBuilder`] and shared as
//! `Arc<Callable>`.
//!
//! ```
//! use callschema_core::{Annotation, Callable, Parameter};
//!
//! let foo = Callable::function("foo")
//!     .param(Parameter::new("x", Annotation::Int))
//!     .param(Parameter::new("y", Annotation::Str).with_default())
//!     .build()
//!     .unwrap();
//! assert_eq!(foo.name(), "foo");
//! ```
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

use crate::annotation::Annotation;
use crate::native::{CallArgs, Constructor, Native};
use crate::{Error, Result};
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;

/// Name of the implicit receiver dropped from initializer signatures
pub const RECEIVER: &str = "self";

/// Whether a callable is a plain function or a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallableKind {
    Function,
    Class,
}

/// How an argument may be passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    KeywordOnly,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    /// `None` when the parameter is unannotated
    pub annotation: Option<Annotation>,
    pub has_default: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, annotation: Annotation) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::PositionalOrKeyword,
            annotation: Some(annotation),
            has_default: false,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::PositionalOrKeyword,
            annotation: None,
            has_default: false,
        }
    }

    pub fn positional_only(name: impl Into<String>, annotation: Annotation) -> Self {
        Self::new(name, annotation).kind(ParameterKind::PositionalOnly)
    }

    pub fn keyword_only(name: impl Into<String>, annotation: Annotation) -> Self {
        Self::new(name, annotation).kind(ParameterKind::KeywordOnly)
    }

    pub fn kind(mut self, kind: ParameterKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark the parameter as having a default value
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }
}

/// Ordered parameter list plus return annotation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
    /// `None` when the return type is not annotated
    pub returns: Option<Annotation>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, annotation: Annotation) -> Self {
        self.returns = Some(annotation);
        self
    }

    /// The signature without its implicit receiver
    pub fn strip_receiver(&self) -> Signature {
        Signature {
            parameters: self
                .parameters
                .iter()
                .filter(|p| p.name != RECEIVER)
                .cloned()
                .collect(),
            returns: self.returns.clone(),
        }
    }

    /// Names of positional-only parameters, in order
    pub fn positional_only(&self) -> Vec<String> {
        self.parameters
            .iter()
            .filter(|p| p.kind == ParameterKind::PositionalOnly)
            .map(|p| p.name.clone())
            .collect()
    }

    fn check(&self, owner: &str) -> Result<()> {
        let mut seen = HashSet::new();
        let mut last_kind = ParameterKind::PositionalOnly;
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(Error::declaration(format!(
                    "duplicate parameter '{}' in '{}'",
                    param.name, owner
                )));
            }
            if rank(param.kind) < rank(last_kind) {
                return Err(Error::declaration(format!(
                    "parameter '{}' of '{}' is {:?} but follows a {:?} parameter",
                    param.name, owner, param.kind, last_kind
                )));
            }
            last_kind = param.kind;
        }
        Ok(())
    }
}

fn rank(kind: ParameterKind) -> u8 {
    match kind {
        ParameterKind::PositionalOnly => 0,
        ParameterKind::PositionalOrKeyword => 1,
        ParameterKind::KeywordOnly => 2,
    }
}

/// A class initializer: documentation plus a signature that may start with
/// the implicit receiver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Initializer {
    pub doc: Option<String>,
    pub signature: Signature,
}

impl Initializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.signature.parameters.push(parameter);
        self
    }
}

/// Declaration of a function or class
#[derive(Debug)]
pub struct Callable {
    name: String,
    kind: CallableKind,
    doc: Option<String>,
    signature: Option<Signature>,
    initializer: Option<Initializer>,
    constructor: Constructor,
    native_type: Option<TypeId>,
}

impl Callable {
    /// Start declaring a function
    pub fn function(name: impl Into<String>) -> CallableBuilder {
        CallableBuilder::new(name, CallableKind::Function)
    }

    /// Start declaring a class
    pub fn class(name: impl Into<String>) -> CallableBuilder {
        CallableBuilder::new(name, CallableKind::Class)
    }

    /// Start declaring a class backed by the native Rust type `T`
    ///
    /// Such classes usually have no signature of their own; an extraction
    /// strategy that recognizes `T` supplies their schema.
    pub fn native<T: 'static>(name: impl Into<String>) -> CallableBuilder {
        let mut builder = CallableBuilder::new(name, CallableKind::Class);
        builder.native_type = Some(TypeId::of::<T>());
        builder
    }

    /// Declaration of a native type whose schema comes from a strategy
    pub(crate) fn builtin<T: 'static>(name: &str, constructor: Constructor) -> Arc<Callable> {
        Arc::new(Callable {
            name: name.to_string(),
            kind: CallableKind::Class,
            doc: None,
            signature: None,
            initializer: None,
            constructor,
            native_type: Some(TypeId::of::<T>()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    pub fn is_class(&self) -> bool {
        self.kind == CallableKind::Class
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// The callable's own signature, if it exposes one
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    pub fn initializer(&self) -> Option<&Initializer> {
        self.initializer.as_ref()
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub fn native_type(&self) -> Option<TypeId> {
        self.native_type
    }

    /// Whether this declaration is backed by the native type `T`
    pub fn is_native<T: 'static>(&self) -> bool {
        self.native_type == Some(TypeId::of::<T>())
    }

    /// Call the constructor directly
    pub fn call(&self, args: CallArgs) -> anyhow::Result<Native> {
        self.constructor.call(args)
    }
}

/// Builder for [`Callable`] declarations
pub struct CallableBuilder {
    name: String,
    kind: CallableKind,
    doc: Option<String>,
    signature: Option<Signature>,
    initializer: Option<Initializer>,
    constructor: Option<Constructor>,
    native_type: Option<TypeId>,
}

impl CallableBuilder {
    fn new(name: impl Into<String>, kind: CallableKind) -> Self {
        Self {
            name: name.into(),
            signature: match kind {
                CallableKind::Function => Some(Signature::new()),
                CallableKind::Class => None,
            },
            kind,
            doc: None,
            initializer: None,
            constructor: None,
            native_type: None,
        }
    }

    /// Set the documentation text
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add a parameter to the callable's own signature
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.signature
            .get_or_insert_with(Signature::new)
            .parameters
            .push(parameter);
        self
    }

    /// Replace the callable's own signature
    pub fn signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Set the return annotation
    pub fn returns(mut self, annotation: Annotation) -> Self {
        self.signature.get_or_insert_with(Signature::new).returns = Some(annotation);
        self
    }

    pub fn initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Use a closure as the constructor
    pub fn construct_with<F>(self, f: F) -> Self
    where
        F: Fn(CallArgs) -> anyhow::Result<Native> + Send + Sync + 'static,
    {
        self.constructor(Constructor::new(f))
    }

    /// Build the declaration
    ///
    /// Without an explicit constructor, a record constructor named after the
    /// callable is installed.
    pub fn build(self) -> Result<Arc<Callable>> {
        if self.name.trim().is_empty() {
            return Err(Error::declaration("callable name must not be empty"));
        }
        if let Some(signature) = &self.signature {
            signature.check(&self.name)?;
        }
        if let Some(initializer) = &self.initializer {
            initializer.signature.check(&self.name)?;
        }

        let constructor = match self.constructor {
            Some(constructor) => constructor,
            None => {
                let positional = self
                    .signature
                    .as_ref()
                    .or(self.initializer.as_ref().map(|init| &init.signature))
                    .map(Signature::positional_only)
                    .unwrap_or_default();
                Constructor::record(self.name.clone(), positional)
            }
        };

        Ok(Arc::new(Callable {
            name: self.name,
            kind: self.kind,
            doc: self.doc,
            signature: self.signature,
            initializer: self.initializer,
            constructor,
            native_type: self.native_type,
        }))
    }
}
