//! Benchmarks for extraction, projection and evaluation
//!
//! Copyright (c) 2025 Callschema Team
//! Licensed under the Apache-2.0 license

use callschema_core::annotation::parse;
use callschema_core::{
    normalize, Annotation, Callable, CallableSchema, JsonSchemaFlavor, Parameter, SchemaExtractor,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use std::sync::Arc;

fn record(depth: usize) -> Arc<Callable> {
    let mut current = Callable::class("Leaf")
        .doc("Leaf.\n\nArgs:\n    value: The value.\n    tags: The tags.")
        .param(Parameter::new("value", Annotation::Float))
        .param(Parameter::new("tags", Annotation::list(Annotation::Str)).with_default())
        .build()
        .unwrap();
    for level in 0..depth {
        current = Callable::class(format!("Level{}", level))
            .doc(format!("Level {}.\n\nArgs:\n    child: The child.\n    mode: The mode.", level))
            .param(Parameter::new("child", Annotation::class(current)))
            .param(Parameter::new("mode", Annotation::literal(["fast", "slow"])))
            .param(
                Parameter::new("count", Annotation::optional(Annotation::Int)).with_default(),
            )
            .build()
            .unwrap();
    }
    current
}

fn payload(depth: usize) -> Value {
    let mut value = json!({"value": 1, "tags": ["a", "b", "c"]});
    for _ in 0..depth {
        value = json!({"child": value, "mode": "fast", "count": null});
    }
    value
}

fn schema(depth: usize) -> CallableSchema {
    SchemaExtractor::new().extract_schema(&record(depth)).unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let annotation = parse(
        "Optional[Union[Literal[1, 2], Literal[2, 3], List[Iterable[int]], Mapping[str, float]]]",
    )
    .unwrap();
    c.bench_function("normalize_concretize", |b| {
        b.iter(|| normalize(black_box(&annotation), true))
    });
}

fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction");
    for depth in [1, 4, 16] {
        let callable = record(depth);
        let extractor = SchemaExtractor::new();
        group.bench_with_input(BenchmarkId::from_parameter(depth), &callable, |b, callable| {
            b.iter(|| extractor.extract_schema(black_box(callable)).unwrap())
        });
    }
    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");
    for depth in [1, 4, 16] {
        let schema = schema(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &schema, |b, schema| {
            b.iter(|| {
                schema
                    .json_schema(black_box(JsonSchemaFlavor::OpenAi), true)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    for depth in [1, 4, 16] {
        let schema = schema(depth);
        let input = payload(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &input, |b, input| {
            b.iter(|| schema.eval(black_box(input)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_extraction,
    bench_projection,
    bench_evaluation
);
criterion_main!(benches);
