//! Date and time declarations
//!
//! `chrono` types have no parameter list to introspect, so their schemas are
//! declared here by hand: date parts are required integers, time-of-day and
//! duration parts are optional integers.

use super::ExtractionStrategy;
use crate::annotation::Annotation;
use crate::callable::Callable;
use crate::native::{CallArgs, Constructor, Native, NativeObject};
use crate::schema::{CallableSchema, ObjectField, ObjectNode, PrimitiveKind, SchemaNode};
use crate::Result;
use anyhow::{anyhow, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde_json::Value;
use std::any::Any;
use std::sync::{Arc, OnceLock};

const DATE_FIELDS: [&str; 3] = ["year", "month", "day"];
const TIME_FIELDS: [&str; 3] = ["hour", "minute", "second"];
const DELTA_FIELDS: [&str; 2] = ["days", "seconds"];

impl NativeObject for NaiveDate {
    fn type_name(&self) -> &str {
        "date"
    }

    fn to_json(&self) -> Value {
        Value::String(self.format("%Y-%m-%d").to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NativeObject for NaiveDateTime {
    fn type_name(&self) -> &str {
        "datetime"
    }

    fn to_json(&self) -> Value {
        Value::String(self.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NativeObject for NaiveTime {
    fn type_name(&self) -> &str {
        "time"
    }

    fn to_json(&self) -> Value {
        Value::String(self.format("%H:%M:%S").to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl NativeObject for TimeDelta {
    fn type_name(&self) -> &str {
        "timedelta"
    }

    /// Total length in seconds
    fn to_json(&self) -> Value {
        Value::from(self.num_seconds())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn component(args: &CallArgs, name: &str) -> anyhow::Result<u32> {
    let value = args.int_or(name, 0)?;
    u32::try_from(value).with_context(|| format!("{} out of range: {}", name, value))
}

fn build_date(args: &CallArgs) -> anyhow::Result<NaiveDate> {
    let year = i32::try_from(args.int("year")?).context("year out of range")?;
    let month = u32::try_from(args.int("month")?).context("month out of range")?;
    let day = u32::try_from(args.int("day")?).context("day out of range")?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("invalid date {:04}-{:02}-{:02}", year, month, day))
}

fn build_time(args: &CallArgs) -> anyhow::Result<NaiveTime> {
    let hour = component(args, "hour")?;
    let minute = component(args, "minute")?;
    let second = component(args, "second")?;
    NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| anyhow!("invalid time {:02}:{:02}:{:02}", hour, minute, second))
}

fn build_delta(args: &CallArgs) -> anyhow::Result<TimeDelta> {
    let days = TimeDelta::try_days(args.int_or("days", 0)?).context("days out of range")?;
    let seconds =
        TimeDelta::try_seconds(args.int_or("seconds", 0)?).context("seconds out of range")?;
    days.checked_add(&seconds)
        .ok_or_else(|| anyhow!("timedelta out of range"))
}

/// Constructors for the four date/time types, created once per process
struct Constructors {
    date: Constructor,
    datetime: Constructor,
    time: Constructor,
    timedelta: Constructor,
}

fn constructors() -> &'static Constructors {
    static CONSTRUCTORS: OnceLock<Constructors> = OnceLock::new();
    CONSTRUCTORS.get_or_init(|| Constructors {
        date: Constructor::new(|args| Ok(Native::object(build_date(&args)?))),
        datetime: Constructor::new(|args| {
            Ok(Native::object(build_date(&args)?.and_time(build_time(&args)?)))
        }),
        time: Constructor::new(|args| Ok(Native::object(build_time(&args)?))),
        timedelta: Constructor::new(|args| Ok(Native::object(build_delta(&args)?))),
    })
}

/// Declaration of `chrono::NaiveDate`
pub fn date() -> Arc<Callable> {
    declare::<NaiveDate>("date", &constructors().date)
}

/// Declaration of `chrono::NaiveDateTime`
pub fn datetime() -> Arc<Callable> {
    declare::<NaiveDateTime>("datetime", &constructors().datetime)
}

/// Declaration of `chrono::NaiveTime`
pub fn time() -> Arc<Callable> {
    declare::<NaiveTime>("time", &constructors().time)
}

/// Declaration of `chrono::TimeDelta`
pub fn timedelta() -> Arc<Callable> {
    declare::<TimeDelta>("timedelta", &constructors().timedelta)
}

fn declare<T: 'static>(name: &str, constructor: &Constructor) -> Arc<Callable> {
    Callable::builtin::<T>(name, constructor.clone())
}

/// Supplies schemas for the `chrono` date/time types
#[derive(Debug, Default, Clone, Copy)]
pub struct DateTimeStrategy;

impl DateTimeStrategy {
    pub fn new() -> Self {
        Self
    }
}

fn int_fields(names: &'static [&'static str], required: bool) -> impl Iterator<Item = ObjectField> {
    names
        .iter()
        .map(move |name| ObjectField::new(*name, SchemaNode::primitive(PrimitiveKind::Int), required))
}

fn schema(name: &str, constructor: &Constructor, fields: Vec<ObjectField>) -> CallableSchema {
    CallableSchema {
        call_schema: ObjectNode {
            constructor: constructor.clone(),
            positional_only: Vec::new(),
            name: name.to_string(),
            fields,
            hint: None,
        },
        return_schema: SchemaNode::undefined(Annotation::None),
        long_description: None,
    }
}

impl ExtractionStrategy for DateTimeStrategy {
    fn name(&self) -> &str {
        "datetime"
    }

    fn extract(&self, callable: &Callable) -> Result<Option<CallableSchema>> {
        let ctors = constructors();
        let name = callable.name();
        let found = if callable.is_native::<NaiveDate>() {
            schema(name, &ctors.date, int_fields(&DATE_FIELDS, true).collect())
        } else if callable.is_native::<NaiveDateTime>() {
            let fields = int_fields(&DATE_FIELDS, true)
                .chain(int_fields(&TIME_FIELDS, false))
                .collect();
            schema(name, &ctors.datetime, fields)
        } else if callable.is_native::<NaiveTime>() {
            schema(name, &ctors.time, int_fields(&TIME_FIELDS, false).collect())
        } else if callable.is_native::<TimeDelta>() {
            schema(name, &ctors.timedelta, int_fields(&DELTA_FIELDS, false).collect())
        } else {
            return Ok(None);
        };
        Ok(Some(found))
    }
}
