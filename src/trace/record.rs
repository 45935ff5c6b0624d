//! Build operation records as they appear in the trace log.
//!
//! Gradle writes one JSON object per line. Three shapes exist:
//! ```text
//! {"id":7,"displayName":"Run build","startTime":1700000000000,"parentId":1,"details":{...},"detailsClassName":"..."}
//! {"id":7,"endTime":1700000000420,"result":{...},"resultClassName":"...","failure":"..."}
//! {"id":7,"time":1700000000100,"details":{...},"detailsClassName":"..."}
//! ```
//!
//! `details` and `result` are free-form and may nest maps and lists to any
//! depth; they are kept as [`Value`] trees in their original key order.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

/// Identifier of a build operation.
///
/// Unique among the operations that are open at any instant; Gradle may reuse
/// an id once the operation it named has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct OperationId(pub i64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Free-form key/value payload attached to starts, finishes and progress events.
pub type Details = IndexMap<String, Value>;

/// A JSON value inside a [`Details`] map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(Details),
}

impl Value {
    /// The string form of a scalar, or `None` for null, lists and maps.
    pub fn scalar_string(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Null | Value::List(_) | Value::Map(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Details> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// The beginning of a unit of work.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOperationStart {
    pub id: OperationId,
    pub display_name: String,
    /// Wall-clock milliseconds since the Unix epoch
    pub start_time: i64,
    pub details: Option<Details>,
    pub details_class_name: Option<String>,
    /// The operation that caused this one, if any
    pub parent_id: Option<OperationId>,
}

/// The completion of a previously started operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOperationFinish {
    pub id: OperationId,
    /// Wall-clock milliseconds since the Unix epoch
    pub end_time: i64,
    pub result: Option<Details>,
    pub result_class_name: Option<String>,
    pub failure: Option<String>,
}

/// An interim event attributed to an open operation (console output, etc).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOperationProgress {
    pub id: OperationId,
    pub time: i64,
    pub details: Option<Details>,
    pub details_class_name: Option<String>,
}

/// One decoded line of the log.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOperationRecord {
    Start(BuildOperationStart),
    Finish(BuildOperationFinish),
    Progress(BuildOperationProgress),
}

impl BuildOperationRecord {
    pub fn id(&self) -> OperationId {
        match self {
            BuildOperationRecord::Start(start) => start.id,
            BuildOperationRecord::Finish(finish) => finish.id,
            BuildOperationRecord::Progress(progress) => progress.id,
        }
    }
}

impl fmt::Display for BuildOperationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildOperationRecord::Start(start) => {
                write!(f, "start {{{}->{}}}", start.id, start.display_name)
            }
            BuildOperationRecord::Finish(finish) => write!(f, "finish {{{}}}", finish.id),
            BuildOperationRecord::Progress(progress) => write!(
                f,
                "progress {{{} {}}}",
                progress.id,
                progress.details_class_name.as_deref().unwrap_or("-")
            ),
        }
    }
}
