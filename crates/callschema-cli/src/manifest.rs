//! Declaration manifests
//!
//! A manifest declares the functions a model may call, the record types
//! their parameters use, and named type aliases. Annotations are written in
//! the usual bracket notation and may name each other, the date/time
//! built-ins, or anything the notation itself knows.
//!
//! ```yaml
//! aliases:
//!   Number: "int | float"
//! types:
//!   - name: Point
//!     doc: "A point.\n\nArgs:\n    x: Horizontal.\n    y: Vertical."
//!     fields:
//!       - { name: x, type: Number }
//!       - { name: y, type: Number, default: 0 }
//! functions:
//!   - name: distance
//!     params:
//!       - { name: a, type: Point }
//!       - { name: b, type: Point }
//!     returns: float
//! ```

use crate::config::read_file;
use crate::error::{Error, Result};
use callschema_core::annotation::{parse, parse_with};
use callschema_core::extract::datetime;
use callschema_core::{
    Annotation, CallArgs, Callable, CallableBuilder, Constructor, Native, Parameter, ParameterKind, Record,
};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Manifest as written on disk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestFile {
    /// Alias name to annotation text
    pub aliases: IndexMap<String, String>,
    pub types: Vec<TypeDecl>,
    pub functions: Vec<FunctionDecl>,
}

/// Record class declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDecl {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub fields: Vec<ParamDecl>,
}

/// Function declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    /// Return annotation; absent means undeclared
    #[serde(default)]
    pub returns: Option<String>,
}

/// Parameter or field declaration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDecl {
    pub name: String,
    /// Annotation text; absent means unannotated
    #[serde(default, rename = "type")]
    pub annotation: Option<String>,
    /// Default value; a present `null` is a default of none
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default)]
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    PositionalOnly,
    #[default]
    PositionalOrKeyword,
    KeywordOnly,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl From<ParamKind> for ParameterKind {
    fn from(kind: ParamKind) -> Self {
        match kind {
            ParamKind::PositionalOnly => ParameterKind::PositionalOnly,
            ParamKind::PositionalOrKeyword => ParameterKind::PositionalOrKeyword,
            ParamKind::KeywordOnly => ParameterKind::KeywordOnly,
        }
    }
}

/// Resolved manifest: every declaration built and ready for extraction
#[derive(Debug)]
pub struct Manifest {
    names: HashMap<String, Annotation>,
    callables: IndexMap<String, Arc<Callable>>,
    functions: Vec<String>,
}

/// A named type-level declaration awaiting resolution
enum Named<'a> {
    Alias(&'a str),
    Type(&'a TypeDecl),
}

impl Named<'_> {
    fn annotation_texts(&self) -> Vec<&str> {
        match self {
            Named::Alias(text) => vec![*text],
            Named::Type(decl) => decl
                .fields
                .iter()
                .filter_map(|field| field.annotation.as_deref())
                .collect(),
        }
    }
}

impl Manifest {
    /// Read and resolve a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let file: ManifestFile = read_file(path)?;
        let manifest = Self::resolve(&file)?;
        info!(
            path = %path.display(),
            callables = manifest.callables.len(),
            "Manifest loaded"
        );
        Ok(manifest)
    }

    /// Build every declaration of `file`
    pub fn resolve(file: &ManifestFile) -> Result<Self> {
        let mut names = builtin_names();
        let mut named: IndexMap<&str, Named<'_>> = IndexMap::new();
        for (name, text) in &file.aliases {
            declare(&mut named, &names, name, Named::Alias(text))?;
        }
        for decl in &file.types {
            declare(&mut named, &names, &decl.name, Named::Type(decl))?;
        }

        let mut callables = IndexMap::new();
        for name in resolution_order(&named)? {
            match &named[name] {
                Named::Alias(text) => {
                    let target = parse_with(text, &names)?;
                    debug!(alias = name, target = %target, "Resolved alias");
                    names.insert(name.to_string(), Annotation::alias(name, target));
                }
                Named::Type(decl) => {
                    let callable = build_callable(
                        Callable::class(&decl.name),
                        &decl.name,
                        decl.doc.as_deref(),
                        &decl.fields,
                        None,
                        &names,
                    )?;
                    names.insert(name.to_string(), Annotation::class(Arc::clone(&callable)));
                    callables.insert(name.to_string(), callable);
                }
            }
        }

        let mut functions = Vec::with_capacity(file.functions.len());
        for decl in &file.functions {
            if callables.contains_key(&decl.name) {
                return Err(Error::manifest(format!("'{}' is declared twice", decl.name)));
            }
            let callable = build_callable(
                Callable::function(&decl.name),
                &decl.name,
                decl.doc.as_deref(),
                &decl.params,
                decl.returns.as_deref(),
                &names,
            )?;
            callables.insert(decl.name.clone(), callable);
            functions.push(decl.name.clone());
        }

        Ok(Manifest {
            names,
            callables,
            functions,
        })
    }

    /// Function or type by name
    pub fn callable(&self, name: &str) -> Result<&Arc<Callable>> {
        self.callables.get(name).ok_or_else(|| Error::ToolNotFound {
            name: name.to_string(),
        })
    }

    /// Declared functions, in manifest order
    pub fn functions(&self) -> impl Iterator<Item = &Arc<Callable>> {
        self.functions.iter().filter_map(|name| self.callables.get(name))
    }

    /// Parse annotation text against the manifest's names
    pub fn parse_annotation(&self, text: &str) -> Result<Annotation> {
        Ok(parse_with(text, &self.names)?)
    }
}

fn builtin_names() -> HashMap<String, Annotation> {
    [
        ("date", datetime::date()),
        ("datetime", datetime::datetime()),
        ("time", datetime::time()),
        ("timedelta", datetime::timedelta()),
    ]
    .into_iter()
    .map(|(name, callable)| (name.to_string(), Annotation::class(callable)))
    .collect()
}

/// Parse annotation text that may only use built-in names
pub fn parse_builtin(text: &str) -> Result<Annotation> {
    Ok(parse_with(text, &builtin_names())?)
}

fn declare<'a>(
    named: &mut IndexMap<&'a str, Named<'a>>,
    builtins: &HashMap<String, Annotation>,
    name: &'a str,
    declaration: Named<'a>,
) -> Result<()> {
    if !is_identifier(name) {
        return Err(Error::manifest(format!("'{}' is not a valid type name", name)));
    }
    if builtins.contains_key(name) || NOTATION_FORMS.contains(&name) || parse(name).is_ok() {
        return Err(Error::manifest(format!("'{}' shadows a built-in type", name)));
    }
    if named.insert(name, declaration).is_some() {
        return Err(Error::manifest(format!("'{}' is declared twice", name)));
    }
    Ok(())
}

/// Names the notation handles before consulting any resolver
const NOTATION_FORMS: [&str; 4] = ["Literal", "Annotated", "Optional", "Union"];

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("static regex"))
}

fn quoted_regex() -> &'static Regex {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    QUOTED.get_or_init(|| {
        Regex::new(r#"'(?:[^'\\]|\\.)*'|"(?:[^"\\]|\\.)*""#).expect("static regex")
    })
}

fn is_identifier(name: &str) -> bool {
    identifier_regex()
        .find(name)
        .is_some_and(|m| m.start() == 0 && m.end() == name.len())
}

/// Manifest names an annotation text refers to, outside string literals
fn references<'a>(text: &str, named: &IndexMap<&'a str, Named<'a>>) -> Vec<&'a str> {
    let unquoted = quoted_regex().replace_all(text, "''");
    let mut found = Vec::new();
    for candidate in identifier_regex().find_iter(&unquoted) {
        if let Some((name, _)) = named.get_key_value(candidate.as_str()) {
            if !found.contains(name) {
                found.push(*name);
            }
        }
    }
    found
}

/// Dependency order of the named declarations; cycles are rejected
fn resolution_order<'a>(named: &IndexMap<&'a str, Named<'a>>) -> Result<Vec<&'a str>> {
    fn visit<'a>(
        name: &'a str,
        named: &IndexMap<&'a str, Named<'a>>,
        done: &mut HashSet<&'a str>,
        stack: &mut Vec<&'a str>,
        order: &mut Vec<&'a str>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|n| *n == name) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(name);
            return Err(Error::manifest(format!(
                "cyclic type reference: {}",
                cycle.join(" -> ")
            )));
        }
        stack.push(name);
        for text in named[name].annotation_texts() {
            for dependency in references(text, named) {
                visit(dependency, named, done, stack, order)?;
            }
        }
        stack.pop();
        done.insert(name);
        order.push(name);
        Ok(())
    }

    let mut done = HashSet::new();
    let mut order = Vec::with_capacity(named.len());
    for name in named.keys() {
        visit(name, named, &mut done, &mut Vec::new(), &mut order)?;
    }
    Ok(order)
}

fn build_callable(
    builder: CallableBuilder,
    name: &str,
    doc: Option<&str>,
    params: &[ParamDecl],
    returns: Option<&str>,
    names: &HashMap<String, Annotation>,
) -> Result<Arc<Callable>> {
    let mut builder = match doc {
        Some(doc) => builder.doc(doc),
        None => builder,
    };
    let mut fields = Vec::with_capacity(params.len());
    for param in params {
        let parameter = match &param.annotation {
            Some(text) => Parameter::new(&param.name, parse_with(text, names)?),
            None => Parameter::untyped(&param.name),
        };
        let parameter = parameter.kind(param.kind.into());
        builder = builder.param(match param.default {
            Some(_) => parameter.with_default(),
            None => parameter,
        });
        fields.push(RecordField {
            name: param.name.clone(),
            positional_only: param.kind == ParamKind::PositionalOnly,
            default: param.default.as_ref().map(native_from_json),
        });
    }
    if let Some(text) = returns {
        builder = builder.returns(parse_with(text, names)?);
    }
    Ok(builder
        .constructor(record_constructor(name.to_string(), fields))
        .build()?)
}

struct RecordField {
    name: String,
    positional_only: bool,
    default: Option<Native>,
}

/// Constructor that builds a record in declaration order, filling defaults
fn record_constructor(name: String, fields: Vec<RecordField>) -> Constructor {
    Constructor::new(move |args: CallArgs| {
        let CallArgs {
            positional,
            mut keyword,
        } = args;
        let mut positional = positional.into_iter();
        let mut values = IndexMap::with_capacity(fields.len());
        for field in &fields {
            let supplied = if field.positional_only {
                positional.next()
            } else {
                keyword.shift_remove(&field.name)
            };
            if let Some(value) = supplied.or_else(|| field.default.clone()) {
                values.insert(field.name.clone(), value);
            }
        }
        Ok(Native::Record(Record {
            name: name.clone(),
            fields: values,
        }))
    })
}

/// Native rendering of a default value written in the manifest
fn native_from_json(value: &Value) -> Native {
    match value {
        Value::Null => Native::None,
        Value::Bool(b) => Native::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map(Native::Int)
            .unwrap_or_else(|| Native::Float(n.as_f64().unwrap_or_default())),
        Value::String(s) => Native::Str(s.clone()),
        Value::Array(items) => Native::List(items.iter().map(native_from_json).collect()),
        Value::Object(map) => Native::Record(Record {
            name: "dict".to_string(),
            fields: map
                .iter()
                .map(|(k, v)| (k.clone(), native_from_json(v)))
                .collect(),
        }),
    }
}
