//! core::value
//!
//! Loaded field values.
//!
//! Raw renderer output is JSON; after conversion every field holds a
//! [`Value`]. Nested nodes are held by [`NodeId`], never inline, so the
//! ownership tree lives in the arena and values stay cheap to clone.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde_json::json;

use super::types::NodeId;

/// Format of dates on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format of times of day in session times.
pub const TIME_FORMAT: &str = "%H:%M:%S";
/// Format of absolute session timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Format of interval bounds such as a course's default time.
pub const SHORT_TIME_FORMAT: &str = "%H:%M";

/// Start and end time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// A converted field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Interval(TimeInterval),
    /// Arbitrary JSON kept verbatim (e.g. rendering variables)
    Json(serde_json::Value),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Node(NodeId),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<TimeInterval> {
        match self {
            Value::Interval(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Nodes held directly by this value or by its list/map items, in order.
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Value::Node(id) => vec![*id],
            Value::List(items) => items.iter().filter_map(Value::as_node).collect(),
            Value::Map(map) => map.values().filter_map(Value::as_node).collect(),
            _ => Vec::new(),
        }
    }

    /// Rendering of a key value, as used in URL key chains.
    pub fn key_string(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }

    /// Short description of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Int(_) => "integer",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Interval(_) => "time interval",
            Value::Json(_) => "json",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Node(_) => "node",
        }
    }

    /// Plain JSON rendering of scalar values.
    ///
    /// Node references have no plain rendering; converters dump them.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Str(s) => json!(s),
            Value::Int(i) => json!(i),
            Value::Date(d) => json!(d.format(DATE_FORMAT).to_string()),
            Value::Time(t) => json!(t.format(TIME_FORMAT).to_string()),
            Value::DateTime(dt) => json!(dt.format(DATETIME_FORMAT).to_string()),
            Value::Interval(i) => json!({
                "start": i.start.format(SHORT_TIME_FORMAT).to_string(),
                "end": i.end.format(SHORT_TIME_FORMAT).to_string(),
            }),
            Value::Json(v) => v.clone(),
            Value::List(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Node(_) => serde_json::Value::Null,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Node(id)
    }
}
