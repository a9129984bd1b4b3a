//! Shared test support utilities for integration tests

#![allow(dead_code)]

use callschema_core::extract::datetime;
use callschema_core::{
    Annotation, Callable, CallableSchema, Initializer, Parameter, ParameterKind, SchemaExtractor,
};
use std::sync::Arc;

/// `foo(x: int, y: str = "hello", z: tuple[int, ...] = ())`
pub fn foo() -> Arc<Callable> {
    Callable::function("foo")
        .param(Parameter::new("x", Annotation::Int))
        .param(Parameter::new("y", Annotation::Str).with_default())
        .param(Parameter::new("z", Annotation::tuple_of(Annotation::Int)).with_default())
        .build()
        .expect("foo declaration")
}

/// `bar(x: List[int], y: Literal["hehe"] | float) -> int` with Google docs
pub fn bar() -> Arc<Callable> {
    Callable::function("bar")
        .doc(
            r"Bar.

        Blah blah blah.

        Args:
            x: The x.
            y: Hard example.
        ",
        )
        .param(Parameter::new("x", Annotation::list(Annotation::Int)))
        .param(Parameter::new(
            "y",
            Annotation::union([Annotation::literal(["hehe"]), Annotation::Float]),
        ))
        .returns(Annotation::Int)
        .build()
        .expect("bar declaration")
}

/// `bar` with a primitive union in place of the literal arm, so it projects
pub fn plain_bar() -> Arc<Callable> {
    Callable::function("bar")
        .doc(
            r"Bar.

        Blah blah blah.

        Args:
            x: The x.
            y: Hard example.
        ",
        )
        .param(Parameter::new("x", Annotation::list(Annotation::Int)))
        .param(Parameter::new(
            "y",
            Annotation::union([Annotation::Float, Annotation::Str]),
        ))
        .returns(Annotation::Int)
        .build()
        .expect("plain bar declaration")
}

/// Class documented on the class, parameters documented on the initializer
pub fn baz() -> Arc<Callable> {
    Callable::class("Baz")
        .doc("I am Baz.")
        .initializer(
            Initializer::new()
                .doc(
                    r"Init Baz.

            Args:
                x: The x.
                y: The y.
            ",
                )
                .param(Parameter::untyped("self"))
                .param(Parameter::new("x", Annotation::Int))
                .param(Parameter::untyped("y")),
        )
        .build()
        .expect("Baz declaration")
}

/// Record class documented with an `Attributes:` section
pub fn qux() -> Arc<Callable> {
    Callable::class("Qux")
        .doc(
            r"I am Qux.

        I have attributes instead of arguments!

        Attributes:
            x: The x.
            baz: The baz.
        ",
        )
        .param(Parameter::new("x", Annotation::Int))
        .param(Parameter::new("baz", Annotation::class(baz())))
        .returns(Annotation::None)
        .build()
        .expect("Qux declaration")
}

/// Record class documented in reStructuredText, holding a datetime
pub fn goo() -> Arc<Callable> {
    Callable::class("Goo")
        .doc(
            r"I am Goo.

        I am a plain record, and I use the ReST field syntax!

        :param date: Ohoho, good luck.
        ",
        )
        .param(Parameter::new("date", Annotation::class(datetime::datetime())))
        .returns(Annotation::None)
        .build()
        .expect("Goo declaration")
}

/// Record class documented in numpydoc, holding a timedelta
pub fn hoo() -> Arc<Callable> {
    Callable::class("Hoo")
        .doc(
            r"I am Hoo.

        I am a validated model!
        And I use Numpy Doc format!

        Parameters
        ----------
        delta : timedelta
            Thou shall not pass!
        ",
        )
        .param(Parameter::new("delta", Annotation::class(datetime::timedelta())))
        .returns(Annotation::None)
        .build()
        .expect("Hoo declaration")
}

/// `Inner` record used by the projection fixture
pub fn inner() -> Arc<Callable> {
    Callable::class("Inner")
        .doc(
            r"Inner.

        Long description of Inner.

        Attributes:
            x: The x.
        ",
        )
        .param(Parameter::new("x", Annotation::Int))
        .returns(Annotation::None)
        .build()
        .expect("Inner declaration")
}

/// Function exercising every projectable shape
pub fn projection_foo() -> Arc<Callable> {
    Callable::function("foo")
        .doc(
            r"Foo!

        Long description of foo.

        Args:
            a: The a.
            b: The b.
            c: The c.
        ",
        )
        .param(Parameter::new("a", Annotation::Int))
        .param(Parameter::new("b", Annotation::Str))
        .param(Parameter::new("c", Annotation::class(inner())))
        .param(Parameter::new("d", Annotation::tuple_of(Annotation::Int)).with_default())
        .param(Parameter::new("e", Annotation::literal(["x", "y"])).with_default())
        .param(
            Parameter::new("f", Annotation::union([Annotation::Str, Annotation::Int])).with_default(),
        )
        .build()
        .expect("projection foo declaration")
}

/// `foo(x: float, /, y: int = 3, *, z: Literal["a", "b"], hehe: Hehe | None = None)`
/// returning `hehe.huhuhu.meee`
pub fn eval_foo() -> Arc<Callable> {
    let huhu = Callable::class("Huhu")
        .param(Parameter::new("meee", Annotation::Int))
        .build()
        .expect("Huhu declaration");
    let hehe = Callable::class("Hehe")
        .param(Parameter::new("hehehe", Annotation::Int))
        .param(Parameter::new("hohoho", Annotation::Str))
        .param(Parameter::new("huhuhu", Annotation::class(huhu)))
        .build()
        .expect("Hehe declaration");

    Callable::function("foo")
        .param(Parameter::positional_only("x", Annotation::Float))
        .param(Parameter::new("y", Annotation::Int).with_default())
        .param(Parameter::keyword_only("z", Annotation::literal(["a", "b"])))
        .param(
            Parameter::new("hehe", Annotation::optional(Annotation::class(hehe)))
                .kind(ParameterKind::KeywordOnly)
                .with_default(),
        )
        .construct_with(|mut args| {
            let hehe = args
                .take("hehe")
                .ok_or_else(|| anyhow::anyhow!("hehe is required here"))?;
            let meee = hehe
                .as_record()
                .and_then(|hehe| hehe.get("huhuhu"))
                .and_then(|huhu| huhu.as_record())
                .and_then(|huhu| huhu.get("meee"))
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("hehe.huhuhu.meee missing"))?;
            Ok(meee)
        })
        .build()
        .expect("eval foo declaration")
}

/// Extract with the default extractor, panicking on failure
pub fn extract(callable: &Callable) -> CallableSchema {
    SchemaExtractor::new()
        .extract_schema(callable)
        .unwrap_or_else(|err| panic!("extraction of {} failed: {}", callable.name(), err))
}
