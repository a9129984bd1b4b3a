//! Annotation notation parser
//!
//! Recursive descent over the bracket notation used in declarations and
//! manifests: `int | None`, `Optional[list[str]]`, `tuple[int, ...]`,
//! `Literal['a', 1]`, `Annotated[int, 'tag']`, `collections.abc.Mapping[str, int]`.
//! Names the parser does not know are handed to a [`NameResolver`].
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

use super::{Annotation, LiteralValue, Origin};
use crate::{Error, Result};
use std::collections::HashMap;

/// Resolves names that are not built into the notation (classes, aliases)
pub trait NameResolver {
    fn resolve(&self, name: &str) -> Option<Annotation>;
}

impl NameResolver for () {
    fn resolve(&self, _name: &str) -> Option<Annotation> {
        None
    }
}

impl NameResolver for HashMap<String, Annotation> {
    fn resolve(&self, name: &str) -> Option<Annotation> {
        self.get(name).cloned()
    }
}

/// Parse annotation text that uses only built-in names
pub fn parse(input: &str) -> Result<Annotation> {
    parse_with(input, &())
}

/// Parse annotation text, resolving unknown names through `resolver`
pub fn parse_with(input: &str, resolver: &dyn NameResolver) -> Result<Annotation> {
    let mut parser = Parser {
        input,
        position: 0,
        resolver,
    };
    let annotation = parser.parse_union()?;
    parser.skip_whitespace();
    if !parser.is_at_end() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(annotation)
}

struct Parser<'a> {
    input: &'a str,
    /// Byte offset into `input`
    position: usize,
    resolver: &'a dyn NameResolver,
}

impl<'a> Parser<'a> {
    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            input: self.input.to_string(),
            position: self.position,
            message: message.into(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current_char(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.current_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", expected)))
        }
    }

    /// union := primary ('|' primary)*
    fn parse_union(&mut self) -> Result<Annotation> {
        let first = self.parse_primary()?;
        let mut arms = vec![first];
        while self.eat('|') {
            arms.push(self.parse_primary()?);
        }
        if arms.len() == 1 {
            Ok(arms.remove(0))
        } else {
            Ok(Annotation::Union(arms))
        }
    }

    fn parse_primary(&mut self) -> Result<Annotation> {
        self.skip_whitespace();
        if self.input[self.position..].starts_with("...") {
            self.position += 3;
            return Ok(Annotation::Ellipsis);
        }
        if self.eat('(') {
            let inner = self.parse_union()?;
            self.expect(')')?;
            return Ok(inner);
        }

        let start = self.position;
        let path = self.parse_dotted_name()?;
        let name = unqualified(&path);
        let from_abc = path.starts_with("collections.abc.");

        match name {
            "Literal" => {
                self.expect('[')?;
                let values = self.parse_literal_values()?;
                return Ok(Annotation::Literal(values));
            }
            "Annotated" => {
                self.expect('[')?;
                let inner = self.parse_union()?;
                let mut metadata = Vec::new();
                while self.eat(',') {
                    metadata.push(self.parse_metadata()?);
                }
                self.expect(']')?;
                return Ok(Annotation::annotated(inner, metadata));
            }
            "Optional" => {
                let mut args = self.parse_type_args()?;
                if args.len() != 1 {
                    return Err(self.error("Optional takes exactly one argument"));
                }
                return Ok(Annotation::optional(args.remove(0)));
            }
            "Union" => {
                let args = self.parse_type_args()?;
                if args.is_empty() {
                    return Err(self.error("Union requires at least one argument"));
                }
                return Ok(Annotation::Union(args));
            }
            _ => {}
        }

        let scalar = match name {
            "Any" => Some(Annotation::Any),
            "None" | "NoneType" => Some(Annotation::None),
            "int" => Some(Annotation::Int),
            "float" => Some(Annotation::Float),
            "str" => Some(Annotation::Str),
            "bool" => Some(Annotation::Bool),
            _ => None,
        };
        if let Some(scalar) = scalar {
            return Ok(scalar);
        }

        if let Some(origin) = origin_for(name, from_abc) {
            let args = if self.peek_is('[') {
                self.parse_type_args()?
            } else {
                Vec::new()
            };
            return Ok(Annotation::Generic { origin, args });
        }

        match self.resolver.resolve(&path).or_else(|| self.resolver.resolve(name)) {
            Some(resolved) => Ok(resolved),
            None => {
                self.position = start;
                Err(self.error(format!("unknown type name '{}'", path)))
            }
        }
    }

    fn peek_is(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        self.current_char() == Some(expected)
    }

    fn parse_dotted_name(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' {
                self.advance();
            } else {
                break;
            }
        }
        let name = &self.input[start..self.position];
        if name.is_empty() || name.starts_with('.') || name.ends_with('.') {
            self.position = start;
            return Err(self.error("expected a type name"));
        }
        Ok(name.to_string())
    }

    /// '[' union (',' union)* ']'
    fn parse_type_args(&mut self) -> Result<Vec<Annotation>> {
        self.expect('[')?;
        let mut args = vec![self.parse_union()?];
        while self.eat(',') {
            args.push(self.parse_union()?);
        }
        self.expect(']')?;
        Ok(args)
    }

    fn parse_literal_values(&mut self) -> Result<Vec<LiteralValue>> {
        let mut values = vec![self.parse_literal_value()?];
        while self.eat(',') {
            values.push(self.parse_literal_value()?);
        }
        self.expect(']')?;
        Ok(values)
    }

    fn parse_literal_value(&mut self) -> Result<LiteralValue> {
        self.skip_whitespace();
        match self.current_char() {
            Some(quote @ ('\'' | '"')) => Ok(LiteralValue::Str(self.parse_quoted(quote)?)),
            Some(ch) if ch.is_ascii_digit() || ch == '-' => self.parse_number(),
            Some(_) => {
                let name = self.parse_dotted_name()?;
                match name.as_str() {
                    "True" | "true" => Ok(LiteralValue::Bool(true)),
                    "False" | "false" => Ok(LiteralValue::Bool(false)),
                    _ => Err(self.error(format!("'{}' is not a literal constant", name))),
                }
            }
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String> {
        self.advance();
        let mut value = String::new();
        loop {
            match self.current_char() {
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some(escaped) => {
                            value.push(escaped);
                            self.advance();
                        }
                        None => return Err(self.error("unterminated string")),
                    }
                }
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(value);
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn parse_number(&mut self) -> Result<LiteralValue> {
        let start = self.position;
        if self.current_char() == Some('-') {
            self.advance();
        }
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '_') {
                self.advance();
            } else {
                break;
            }
        }
        let text: String = self.input[start..self.position]
            .chars()
            .filter(|ch| *ch != '_')
            .collect();
        if let Ok(int) = text.parse::<i64>() {
            return Ok(LiteralValue::Int(int));
        }
        text.parse::<f64>().map(LiteralValue::Float).map_err(|_| {
            self.position = start;
            self.error(format!("invalid number '{}'", text))
        })
    }

    fn parse_metadata(&mut self) -> Result<String> {
        self.skip_whitespace();
        match self.current_char() {
            Some(quote @ ('\'' | '"')) => self.parse_quoted(quote),
            Some(ch) if ch.is_ascii_digit() || ch == '-' => {
                self.parse_number().map(|value| value.to_string())
            }
            _ => self.parse_dotted_name(),
        }
    }
}

/// Module prefixes under which built-in names may be spelled out
const KNOWN_MODULES: [&str; 3] = ["typing.", "collections.abc.", "builtins."];

/// Strip a known module prefix; other dotted names stay whole and can only
/// be resolved as written
fn unqualified(path: &str) -> &str {
    KNOWN_MODULES
        .iter()
        .find_map(|module| path.strip_prefix(module))
        .filter(|rest| !rest.contains('.'))
        .unwrap_or(path)
}

fn origin_for(name: &str, from_abc: bool) -> Option<Origin> {
    let origin = match name {
        "list" | "List" => Origin::List,
        "tuple" | "Tuple" => Origin::Tuple,
        "dict" | "Dict" => Origin::Dict,
        "Set" if from_abc => Origin::AbstractSet,
        "set" | "Set" => Origin::Set,
        "frozenset" | "FrozenSet" => Origin::FrozenSet,
        "bytes" => Origin::Bytes,
        "AbstractSet" => Origin::AbstractSet,
        "MutableSet" => Origin::MutableSet,
        "Mapping" => Origin::Mapping,
        "MutableMapping" => Origin::MutableMapping,
        "MappingView" => Origin::MappingView,
        "Sequence" => Origin::Sequence,
        "MutableSequence" => Origin::MutableSequence,
        "ValuesView" => Origin::ValuesView,
        "KeysView" => Origin::KeysView,
        "Iterable" => Origin::Iterable,
        "Iterator" => Origin::Iterator,
        "Container" => Origin::Container,
        "Collection" => Origin::Collection,
        "Sized" => Origin::Sized,
        "Reversible" => Origin::Reversible,
        "ByteString" => Origin::ByteString,
        _ => return None,
    };
    Some(origin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars_and_union() {
        assert_eq!(parse("int").unwrap(), Annotation::Int);
        assert_eq!(
            parse("int | None").unwrap(),
            Annotation::Union(vec![Annotation::Int, Annotation::None])
        );
        assert_eq!(
            parse("Optional[str]").unwrap(),
            Annotation::optional(Annotation::Str)
        );
    }

    #[test]
    fn test_parse_generics() {
        assert_eq!(
            parse("typing.List[int]").unwrap(),
            Annotation::list(Annotation::Int)
        );
        assert_eq!(
            parse("tuple[int, ...]").unwrap(),
            Annotation::tuple_of(Annotation::Int)
        );
        assert_eq!(
            parse("collections.abc.Set[int]").unwrap(),
            Annotation::generic(Origin::AbstractSet, [Annotation::Int])
        );
        assert_eq!(
            parse("typing.Set[int]").unwrap(),
            Annotation::generic(Origin::Set, [Annotation::Int])
        );
        assert_eq!(
            parse("List").unwrap(),
            Annotation::generic(Origin::List, [])
        );
    }

    #[test]
    fn test_parse_literal_and_annotated() {
        assert_eq!(
            parse("Literal['x', \"y\", 3, -1.5, True]").unwrap(),
            Annotation::Literal(vec![
                LiteralValue::Str("x".into()),
                LiteralValue::Str("y".into()),
                LiteralValue::Int(3),
                LiteralValue::Float(-1.5),
                LiteralValue::Bool(true),
            ])
        );
        assert_eq!(
            parse("Annotated[int, 'tag', units]").unwrap(),
            Annotation::annotated(Annotation::Int, ["tag".to_string(), "units".to_string()])
        );
    }

    #[test]
    fn test_parse_with_resolver() {
        let mut names = HashMap::new();
        names.insert("Number".to_string(), Annotation::alias("Number", parse("int | float").unwrap()));
        let parsed = parse_with("list[Number]", &names).unwrap();
        match parsed {
            Annotation::Generic { origin: Origin::List, args } => {
                assert!(matches!(&args[0], Annotation::Alias(alias) if alias.name == "Number"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        let err = parse("list[Foo]").unwrap_err();
        assert!(matches!(err, Error::Parse { position: 5, .. }), "{:?}", err);
        assert!(parse("list[int").is_err());
        assert!(parse("int |").is_err());
        assert!(parse("Literal[int]").is_err());
        assert!(parse("int str").is_err());
    }

    #[test]
    fn test_qualified_names_need_a_known_module() {
        assert_eq!(parse("builtins.int").unwrap(), Annotation::Int);
        assert_eq!(parse("typing.Optional[str]").unwrap(), Annotation::optional(Annotation::Str));
        assert!(matches!(parse("foo.int").unwrap_err(), Error::Parse { .. }));
        assert!(parse("typing.abc.List[int]").is_err());
        assert!(parse("collections.abc.typing.int").is_err());

        let mut names = HashMap::new();
        names.insert("geo.Point".to_string(), Annotation::Str);
        assert_eq!(parse_with("geo.Point", &names).unwrap(), Annotation::Str);
    }
}
