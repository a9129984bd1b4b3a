use super::*;
use crate::jsonschema::JsonSchemaFlavor;
use crate::native::{CallArgs, Native};
use crate::Error;
use serde_json::json;

fn int() -> SchemaNode {
    SchemaNode::primitive(PrimitiveKind::Int)
}

fn float() -> SchemaNode {
    SchemaNode::primitive(PrimitiveKind::Float)
}

fn string() -> SchemaNode {
    SchemaNode::primitive(PrimitiveKind::Str)
}

fn object(name: &str, fields: Vec<ObjectField>, positional_only: &[&str]) -> ObjectNode {
    let positional_only: Vec<String> = positional_only.iter().map(|s| s.to_string()).collect();
    ObjectNode {
        constructor: Constructor::record(name, positional_only.clone()),
        positional_only,
        name: name.to_string(),
        fields,
        hint: None,
    }
}

#[test]
fn test_primitive_projection_hint() {
    assert_eq!(
        int().json_schema(Some("The x.")).unwrap().to_value(),
        json!({"type": "integer", "description": "The x."})
    );
    assert_eq!(int().json_schema(None).unwrap().to_value(), json!({"type": "integer"}));
    assert_eq!(int().json_schema(Some("")).unwrap().to_value(), json!({"type": "integer"}));
}

#[test]
fn test_unprojectable_shapes() {
    let cases = vec![
        SchemaNode::undefined(Annotation::Any),
        SchemaNode::tuple(Origin::Tuple, vec![int(), string()]),
        SchemaNode::mapping(Origin::Dict, string(), int()),
        SchemaNode::literal(vec![LiteralValue::Int(1), LiteralValue::from("a")]),
        SchemaNode::union(vec![
            Some(int()),
            Some(SchemaNode::sequence(Origin::List, int())),
        ]),
    ];
    for node in cases {
        let err = node.json_schema(None).unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedSchema { .. }),
            "{} projected: {:?}",
            node,
            err
        );
    }
}

#[test]
fn test_union_projection() {
    let optional = SchemaNode::union(vec![Some(string()), None]);
    assert_eq!(
        optional.json_schema(Some("Name.")).unwrap().to_value(),
        json!({"type": "string", "description": "Name."})
    );

    let optional_list = SchemaNode::union(vec![
        None,
        Some(SchemaNode::sequence(Origin::List, int())),
    ]);
    assert_eq!(
        optional_list.json_schema(None).unwrap().to_value(),
        json!({"type": "array", "items": {"type": "integer"}})
    );

    let numbers = SchemaNode::union(vec![Some(int()), Some(float()), Some(string())]);
    assert_eq!(
        numbers.json_schema(None).unwrap().to_value(),
        json!({"type": ["number", "string"]})
    );

    let collapsed = SchemaNode::union(vec![Some(int()), Some(float()), None]);
    assert_eq!(collapsed.json_schema(None).unwrap().to_value(), json!({"type": "number"}));
}

#[test]
fn test_literal_and_sequence_projection() {
    let node = SchemaNode::sequence(
        Origin::List,
        SchemaNode::literal(vec!["x".into(), "y".into()]),
    );
    assert_eq!(
        node.json_schema(Some("Letters.")).unwrap().to_value(),
        json!({
            "type": "array",
            "items": {"type": "string", "enum": ["x", "y"]},
            "description": "Letters."
        })
    );
}

#[test]
fn test_object_description_joining() {
    let node = object("Inner", vec![ObjectField::new("a", int(), true)], &[])
        .with_hint(Some("Inner.".into()));
    let schema = node.json_schema(Some("The c.")).unwrap();
    assert_eq!(schema.description.as_deref(), Some("The c.\n\nInner."));
    assert_eq!(
        node.json_schema(None).unwrap().description.as_deref(),
        Some("Inner.")
    );
    assert_eq!(node.with_hint(None).json_schema(None).unwrap().description, None);
}

#[test]
fn test_callable_projection_flavors() {
    let call = object(
        "foo",
        vec![
            ObjectField::new("x", int(), true).with_hint("The x."),
            ObjectField::new("y", string(), false),
        ],
        &[],
    )
    .with_hint(Some("Foo!".into()));
    let schema = CallableSchema {
        call_schema: call,
        return_schema: SchemaNode::undefined(Annotation::Any),
        long_description: Some("Long.".into()),
    };

    let openai = schema.json_schema(JsonSchemaFlavor::OpenAi, false).unwrap();
    assert_eq!(
        openai.to_value(),
        json!({
            "name": "foo",
            "description": "Foo!",
            "parameters": {
                "type": "object",
                "properties": {
                    "x": {"type": "integer", "description": "The x."},
                    "y": {"type": "string"}
                },
                "required": ["x"]
            }
        })
    );

    let anthropic = schema.json_schema(JsonSchemaFlavor::Anthropic, true).unwrap();
    let value = anthropic.to_value();
    assert_eq!(value["description"], json!("Foo!\n\nLong."));
    assert!(value.get("parameters").is_none());
    assert_eq!(value["input_schema"]["required"], json!(["x"]));
}

#[test]
fn test_primitive_eval() {
    assert_eq!(float().eval(&json!(50)).unwrap(), Native::Float(50.0));
    assert_eq!(int().eval(&json!(7)).unwrap(), Native::Int(7));

    let err = int().eval(&json!("50")).unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().message,
        "Expected int, got \"50\""
    );
    assert!(int().eval(&json!(1.5)).is_err());
    assert!(int().eval(&json!(true)).is_err());
    assert!(SchemaNode::primitive(PrimitiveKind::Bool).eval(&json!(1)).is_err());
}

#[test]
fn test_sequence_and_tuple_eval() {
    let list = SchemaNode::sequence(Origin::List, int());
    assert_eq!(
        list.eval(&json!([1, 2])).unwrap(),
        Native::List(vec![Native::Int(1), Native::Int(2)])
    );
    let err = list.eval(&json!([1, "two"])).unwrap_err();
    assert_eq!(err.as_validation().unwrap().path, "$[1]");

    let homogeneous = SchemaNode::sequence(Origin::Tuple, int());
    assert_eq!(
        homogeneous.eval(&json!([])).unwrap(),
        Native::Tuple(vec![])
    );

    let pair = SchemaNode::tuple(Origin::Tuple, vec![int(), string()]);
    assert_eq!(
        pair.eval(&json!([1, "a"])).unwrap(),
        Native::Tuple(vec![Native::Int(1), Native::Str("a".into())])
    );
    let err = pair.eval(&json!([1])).unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().message,
        "Expected tuple of length 2, got 1"
    );
}

#[test]
fn test_union_eval_order() {
    let node = SchemaNode::union(vec![
        Some(SchemaNode::literal(vec!["hehe".into()])),
        Some(float()),
    ]);
    assert_eq!(node.eval(&json!(1.0)).unwrap(), Native::Float(1.0));
    assert_eq!(node.eval(&json!("hehe")).unwrap(), Native::Str("hehe".into()));

    let err = node.eval(&json!("nope")).unwrap_err();
    let validation = err.as_validation().unwrap();
    assert_eq!(validation.causes.len(), 2);
    assert_eq!(
        validation.message,
        format!("Value \"nope\" does not match any of the options: {}", node)
    );
    assert!(validation.message.ends_with("| float"));
}

#[test]
fn test_union_null_handling() {
    let optional = SchemaNode::union(vec![Some(int()), None]);
    assert_eq!(optional.eval(&json!(null)).unwrap(), Native::None);

    let required = SchemaNode::union(vec![Some(int()), Some(string())]);
    assert!(required.eval(&json!(null)).unwrap_err().is_recoverable());
}

#[test]
fn test_union_of_unsupported_arms() {
    let node = SchemaNode::union(vec![
        Some(SchemaNode::mapping(Origin::Dict, string(), int())),
        Some(SchemaNode::undefined(Annotation::Any)),
    ]);
    assert!(matches!(
        node.eval(&json!({})).unwrap_err(),
        Error::UnsupportedSchema { .. }
    ));
}

#[test]
fn test_undefined_and_mapping_never_evaluate() {
    assert!(SchemaNode::undefined(Annotation::Any).eval(&json!(1)).is_err());
    assert!(SchemaNode::mapping(Origin::Dict, string(), int())
        .eval(&json!({"a": 1}))
        .is_err());
}

#[test]
fn test_literal_eval() {
    let node = SchemaNode::literal(vec![LiteralValue::Int(1), "a".into()]);
    assert_eq!(node.eval(&json!(1)).unwrap(), Native::Int(1));
    assert_eq!(node.eval(&json!("a")).unwrap(), Native::Str("a".into()));
    assert!(node.eval(&json!(true)).is_err());
    assert!(node.eval(&json!("b")).is_err());
}

#[test]
fn test_object_eval_errors() {
    let node = object(
        "foo",
        vec![
            ObjectField::new("x", int(), true),
            ObjectField::new("y", string(), false),
        ],
        &[],
    );

    let err = node.eval(&json!({"z": 1})).unwrap_err();
    assert_eq!(err.as_validation().unwrap().message, "Unexpected field: z");

    let err = node.eval(&json!({})).unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().message,
        "Missing required fields: {x}"
    );

    let err = node.eval(&json!([1])).unwrap_err();
    assert_eq!(
        err.as_validation().unwrap().message,
        "Expected object, got array"
    );

    let err = node.eval(&json!({"x": 1, "y": 2})).unwrap_err();
    assert_eq!(err.as_validation().unwrap().path, "$.y");
}

#[test]
fn test_object_eval_builds_record() {
    let node = object(
        "foo",
        vec![
            ObjectField::new("x", int(), true),
            ObjectField::new("y", string(), false),
        ],
        &[],
    );
    let value = node.eval(&json!({"y": "b", "x": 1})).unwrap();
    let record = value.as_record().unwrap();
    assert_eq!(record.name, "foo");
    let keys: Vec<_> = record.fields.keys().cloned().collect();
    assert_eq!(keys, vec!["x", "y"]);
}

#[test]
fn test_object_eval_positional_split() {
    let seen = std::sync::Arc::new(std::sync::Mutex::new(CallArgs::default()));
    let captured = seen.clone();
    let node = ObjectNode {
        constructor: Constructor::new(move |args: CallArgs| {
            *captured.lock().unwrap() = args;
            Ok(Native::None)
        }),
        positional_only: vec!["a".into(), "b".into()],
        name: "f".into(),
        fields: vec![
            ObjectField::new("a", int(), true),
            ObjectField::new("b", int(), false),
            ObjectField::new("c", int(), false),
        ],
        hint: None,
    };

    node.eval(&json!({"c": 3, "b": 2, "a": 1})).unwrap();
    let args = seen.lock().unwrap().clone();
    assert_eq!(args.positional, vec![Native::Int(1), Native::Int(2)]);
    assert_eq!(args.get("c"), Some(&Native::Int(3)));
    assert!(args.get("a").is_none());
}

#[test]
fn test_positional_gap_rejected() {
    let node = object(
        "f",
        vec![
            ObjectField::new("a", int(), false),
            ObjectField::new("b", int(), false),
        ],
        &["a", "b"],
    );
    assert!(node.eval(&json!({"b": 2})).unwrap_err().is_recoverable());
    assert!(node.eval(&json!({"a": 1})).is_ok());
}

#[test]
fn test_constructor_errors_propagate() {
    let node = ObjectNode {
        constructor: Constructor::new(|_| Err(anyhow::anyhow!("boom"))),
        positional_only: vec![],
        name: "explode".into(),
        fields: vec![],
        hint: None,
    };
    let err = node.eval(&json!({})).unwrap_err();
    assert!(matches!(err, Error::Construction { ref name, .. } if name == "explode"));
    assert!(!err.is_recoverable());

    let union = SchemaNode::union(vec![Some(SchemaNode::Object(node)), Some(int())]);
    assert!(matches!(
        union.eval(&json!({})).unwrap_err(),
        Error::Construction { .. }
    ));
}

#[test]
fn test_eval_context_paths() {
    let ctx = EvalContext::root().child("a").child_index(2).child("b");
    assert_eq!(ctx.path(), "$.a[2].b");
}

#[test]
fn test_display() {
    let node = SchemaNode::union(vec![
        Some(SchemaNode::sequence(Origin::List, int())),
        Some(SchemaNode::literal(vec!["a".into()])),
        None,
    ]);
    assert_eq!(node.to_string(), "list[int] | Literal['a'] | None");
}
