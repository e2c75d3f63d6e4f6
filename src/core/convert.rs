//! core::convert
//!
//! Converters: the load/dump/schema strategy behind every field.
//!
//! # Variants
//!
//! Converters are a closed set. Recursive variants are parametrized by an
//! item converter or a node type:
//!
//! - primitives: [`Converter::Str`], [`Converter::Int`], [`Converter::Date`],
//!   [`Converter::SessionTime`], [`Converter::TimeInterval`], [`Converter::Any`]
//! - [`Converter::Choice`] - one of a fixed set of strings
//! - [`Converter::List`] and [`Converter::Dict`] - sequences and keyed mappings
//! - [`Converter::KeyAttrDict`] - a sequence loaded into a mapping keyed by an
//!   attribute of each item, with positions injected and siblings linked
//! - [`Converter::Model`] - an owned nested node
//! - [`Converter::Link`] - a node owned elsewhere, referenced by key
//! - [`Converter::Url`], [`Converter::Html`], [`Converter::Css`]
//! - [`Converter::License`] - a license referenced by slug
//!
//! `dump` is a right inverse of `load` up to normalization: `"9:00"` loads as
//! a time and dumps as `"09:00:00"`.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde_json::{json, Value as Json};

use super::content::{self, ContentLink};
use super::error::ModelError;
use super::graph::{DumpOptions, Root};
use super::node::Construct;
use super::schema::model_ref;
use super::types::{ModelKind, NodeId, SchemaView};
use super::value::{TimeInterval, Value, DATETIME_FORMAT, DATE_FORMAT};

/// Pattern of raw session times: an optional date and a time of day.
pub const SESSION_TIME_PATTERN: &str =
    "^([0-9]{4}-[0-9]{2}-[0-9]{2} )?[0-9]{2}:[0-9]{2}(:[0-9]{2})?$";

/// Pattern of interval bounds.
pub const SHORT_TIME_PATTERN: &str = "^[0-9]{2}:[0-9]{2}$";

/// Resolves a `naucse:` pseudo-URL found in HTML content into a real URL.
#[derive(Clone, Copy)]
pub struct LinkResolver(pub fn(&mut LoadCx<'_>, &ContentLink) -> Result<String, ModelError>);

impl fmt::Debug for LinkResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LinkResolver")
    }
}

/// Load/dump/schema strategy for one data shape.
#[derive(Debug, Clone)]
pub enum Converter {
    Str,
    Int,
    /// `YYYY-MM-DD`
    Date,
    /// `YYYY-MM-DD HH:MM:SS` (absolute) or `HH:MM[:SS]` (time of day)
    SessionTime,
    /// `{"start": "HH:MM", "end": "HH:MM"}`
    TimeInterval,
    /// Any JSON object, kept verbatim
    Any,
    Choice(&'static [&'static str]),
    List(Box<Converter>),
    /// JSON object with string keys
    Dict(Box<Converter>),
    KeyAttrDict {
        item: ModelKind,
        key_attr: &'static str,
        index_key: &'static str,
    },
    Model(ModelKind),
    Link(ModelKind),
    /// Absolute URL
    Url,
    /// HTML fragment; with a resolver, `naucse:` links are rewritten
    Html(Option<LinkResolver>),
    Css,
    License,
}

/// State of a load in progress: the node under construction and the path
/// of the raw value being converted, for error messages.
pub struct LoadCx<'r> {
    pub root: &'r mut Root,
    pub instance: NodeId,
    pub path: String,
}

impl<'r> LoadCx<'r> {
    pub fn new(root: &'r mut Root, instance: NodeId, field: &str) -> Self {
        Self {
            root,
            instance,
            path: field.to_string(),
        }
    }

    /// Conversion error at the current path.
    pub fn conversion(&self, message: impl Into<String>) -> ModelError {
        ModelError::Conversion {
            model: self.root.node(self.instance).kind(),
            path: self.path.clone(),
            message: message.into(),
        }
    }

    fn expected(&self, what: &str, raw: &Json) -> ModelError {
        self.conversion(format!("expected {what}, got {}", json_type(raw)))
    }
}

/// State of a dump in progress.
pub struct DumpCx<'r> {
    pub root: &'r Root,
    pub options: DumpOptions,
}

impl Converter {
    /// List of `item`.
    pub fn list(item: Converter) -> Self {
        Converter::List(Box::new(item))
    }

    /// Mapping from string keys to `item`.
    pub fn dict(item: Converter) -> Self {
        Converter::Dict(Box::new(item))
    }

    /// Convert a raw value.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Conversion`] if `raw` does not have the expected
    /// shape; nested node loads propagate their own errors.
    pub fn load(&self, cx: &mut LoadCx<'_>, raw: &Json) -> Result<Value, ModelError> {
        match self {
            Converter::Str | Converter::Css => raw
                .as_str()
                .map(Value::from)
                .ok_or_else(|| cx.expected("a string", raw)),
            Converter::Int => raw
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| cx.expected("an integer", raw)),
            Converter::Date => {
                let s = raw.as_str().ok_or_else(|| cx.expected("a date string", raw))?;
                NaiveDate::parse_from_str(s, DATE_FORMAT)
                    .map(Value::Date)
                    .map_err(|e| cx.conversion(format!("invalid date '{s}': {e}")))
            }
            Converter::SessionTime => {
                let s = raw.as_str().ok_or_else(|| cx.expected("a time string", raw))?;
                parse_session_time(s).ok_or_else(|| cx.conversion(format!("invalid time '{s}'")))
            }
            Converter::TimeInterval => {
                let obj = raw.as_object().ok_or_else(|| cx.expected("an object", raw))?;
                let mut bound = |name: &str| -> Result<NaiveTime, ModelError> {
                    let s = obj
                        .get(name)
                        .and_then(Json::as_str)
                        .ok_or_else(|| cx.conversion(format!("missing '{name}' time")))?;
                    parse_time_of_day(s)
                        .ok_or_else(|| cx.conversion(format!("invalid {name} time '{s}'")))
                };
                let start = bound("start")?;
                let end = bound("end")?;
                Ok(Value::Interval(TimeInterval { start, end }))
            }
            Converter::Any => {
                if raw.is_object() {
                    Ok(Value::Json(raw.clone()))
                } else {
                    Err(cx.expected("an object", raw))
                }
            }
            Converter::Choice(choices) => {
                let s = raw.as_str().ok_or_else(|| cx.expected("a string", raw))?;
                if choices.contains(&s) {
                    Ok(Value::from(s))
                } else {
                    Err(cx.conversion(format!(
                        "'{s}' is not one of: {}",
                        choices.join(", ")
                    )))
                }
            }
            Converter::List(item) => {
                let items = raw.as_array().ok_or_else(|| cx.expected("an array", raw))?;
                let mut out = Vec::with_capacity(items.len());
                for (i, raw_item) in items.iter().enumerate() {
                    let saved = cx.path.len();
                    cx.path.push_str(&format!("[{i}]"));
                    let value = match item.as_ref() {
                        Converter::Model(kind) => {
                            let construct = Construct::child(cx.instance).at(i);
                            Value::Node(cx.root.load(*kind, raw_item, construct)?)
                        }
                        other => other.load(cx, raw_item)?,
                    };
                    cx.path.truncate(saved);
                    out.push(value);
                }
                Ok(Value::List(out))
            }
            Converter::Dict(item) => {
                let obj = raw.as_object().ok_or_else(|| cx.expected("an object", raw))?;
                let mut out = IndexMap::with_capacity(obj.len());
                for (key, raw_item) in obj {
                    let saved = cx.path.len();
                    cx.path.push('.');
                    cx.path.push_str(key);
                    let value = match item.as_ref() {
                        Converter::Model(kind) => {
                            let construct = Construct::keyed(cx.instance, key.clone());
                            Value::Node(cx.root.load(*kind, raw_item, construct)?)
                        }
                        other => other.load(cx, raw_item)?,
                    };
                    cx.path.truncate(saved);
                    out.insert(key.clone(), value);
                }
                Ok(Value::Map(out))
            }
            Converter::KeyAttrDict {
                item,
                key_attr,
                index_key,
            } => load_key_attr_dict(cx, raw, *item, key_attr, index_key),
            Converter::Model(kind) => {
                let id = cx.root.load(*kind, raw, Construct::child(cx.instance))?;
                Ok(Value::Node(id))
            }
            Converter::Link(kind) => {
                let key = raw.as_str().ok_or_else(|| cx.expected("a key string", raw))?;
                cx.root
                    .lookup(*kind, key)
                    .map(Value::Node)
                    .ok_or_else(|| cx.conversion(format!("unknown {kind} '{key}'")))
            }
            Converter::Url => {
                let s = raw.as_str().ok_or_else(|| cx.expected("a URL string", raw))?;
                url::Url::parse(s)
                    .map(|_| Value::from(s))
                    .map_err(|e| cx.conversion(format!("invalid URL '{s}': {e}")))
            }
            Converter::Html(resolver) => {
                let s = raw.as_str().ok_or_else(|| cx.expected("an HTML string", raw))?;
                content::rewrite_links(cx, s, *resolver).map(Value::Str)
            }
            Converter::License => {
                let slug = raw.as_str().ok_or_else(|| cx.expected("a license slug", raw))?;
                match cx.root.lookup(ModelKind::License, slug) {
                    Some(id) => Ok(Value::Node(id)),
                    None => {
                        let known = cx.root.keys(ModelKind::License).join(", ");
                        Err(cx.conversion(format!(
                            "{slug} is not a valid license (choose from {known})"
                        )))
                    }
                }
            }
        }
    }

    /// Produce the raw form of a loaded value.
    pub fn dump(&self, cx: &DumpCx<'_>, value: &Value) -> Result<Json, ModelError> {
        match (self, value) {
            (Converter::List(item), Value::List(items)) => items
                .iter()
                .map(|v| item.dump(cx, v))
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            (Converter::Dict(item), Value::Map(map)) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, v) in map {
                    out.insert(key.clone(), item.dump(cx, v)?);
                }
                Ok(Json::Object(out))
            }
            (Converter::KeyAttrDict { .. }, Value::Map(map)) => map
                .values()
                .filter_map(Value::as_node)
                .map(|id| cx.root.dump_nested(id, cx.options))
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            (Converter::Link(_), Value::Node(id)) if cx.options.view.is_input() => {
                Ok(json!(cx.root.primary_key(*id).unwrap_or_default()))
            }
            (Converter::Model(_) | Converter::Link(_), Value::Node(id)) => {
                cx.root.dump_nested(*id, cx.options)
            }
            (Converter::License, Value::Node(id)) => {
                Ok(json!(cx.root.node(*id).key().unwrap_or_default()))
            }
            (_, other) => Ok(other.to_json()),
        }
    }

    /// Schema fragment for values of this converter in the given view.
    pub fn schema(&self, view: SchemaView) -> Json {
        match self {
            Converter::Str => json!({"type": "string"}),
            Converter::Int => json!({"type": "integer"}),
            Converter::Date => json!({"type": "string", "format": "date"}),
            Converter::SessionTime => json!({
                "type": "string",
                "pattern": SESSION_TIME_PATTERN,
            }),
            Converter::TimeInterval => json!({
                "type": "object",
                "additionalProperties": false,
                "required": ["start", "end"],
                "properties": {
                    "start": {"type": "string", "pattern": SHORT_TIME_PATTERN},
                    "end": {"type": "string", "pattern": SHORT_TIME_PATTERN},
                },
            }),
            Converter::Any => json!({"type": "object"}),
            Converter::Choice(choices) => json!({"type": "string", "enum": choices}),
            Converter::List(item) => json!({"type": "array", "items": item.schema(view)}),
            Converter::Dict(item) => json!({
                "type": "object",
                "additionalProperties": item.schema(view),
            }),
            Converter::KeyAttrDict { item, .. } => json!({
                "type": "array",
                "items": model_ref(*item, view),
            }),
            Converter::Model(kind) => model_ref(*kind, view),
            Converter::Link(kind) => match view {
                SchemaView::Input => json!({"type": "string"}),
                SchemaView::Output => model_ref(*kind, view),
            },
            Converter::Url => json!({"type": "string", "format": "uri"}),
            Converter::Html(_) => json!({"type": "string", "format": "html-fragment"}),
            Converter::Css => json!({"type": "string", "contentMediaType": "text/css"}),
            Converter::License => json!({"type": "string"}),
        }
    }
}

fn load_key_attr_dict(
    cx: &mut LoadCx<'_>,
    raw: &Json,
    kind: ModelKind,
    key_attr: &str,
    index_key: &str,
) -> Result<Value, ModelError> {
    let items = raw.as_array().ok_or_else(|| cx.expected("an array", raw))?;
    let mut out = IndexMap::with_capacity(items.len());
    let mut order = Vec::with_capacity(items.len());
    for (i, raw_item) in items.iter().enumerate() {
        let saved = cx.path.len();
        cx.path.push_str(&format!("[{i}]"));
        let mut item_data = raw_item.clone();
        match item_data.as_object_mut() {
            Some(obj) => {
                obj.insert(index_key.to_string(), json!(i));
            }
            None => return Err(cx.expected("an object", raw_item)),
        }
        let id = cx.root.load(kind, &item_data, Construct::child(cx.instance).at(i))?;
        let key = cx
            .root
            .node(id)
            .field(key_attr)
            .and_then(Value::key_string)
            .ok_or_else(|| cx.conversion(format!("item has no '{key_attr}' key")))?;
        if out.contains_key(&key) {
            return Err(ModelError::DuplicateKey { kind, key });
        }
        cx.path.truncate(saved);
        out.insert(key, Value::Node(id));
        order.push(id);
    }
    cx.root.link_siblings(&order);
    Ok(Value::Map(out))
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parse a raw session time into an absolute timestamp or a time of day.
pub fn parse_session_time(s: &str) -> Option<Value> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Some(Value::DateTime(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Some(Value::DateTime(dt));
    }
    parse_time_of_day(s).map(Value::Time)
}

fn json_type(raw: &Json) -> &'static str {
    match raw {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
