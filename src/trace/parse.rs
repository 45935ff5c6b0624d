//! Parse build operation log lines into structured records.
//!
//! Lines carry no explicit type tag. The shape is sniffed from the fields
//! present (see [`RecordKind::classify`]) and the line is then decoded as that
//! shape; required fields that are missing or mistyped are a decode error.
//! Unknown fields are ignored for forward compatibility.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde_json::{Map, Value as Json};

use super::record::BuildOperationRecord;
use crate::error::ConvertError;

/// Which of the three record shapes a line holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Start,
    Finish,
    Progress,
}

impl RecordKind {
    /// A `startTime` field makes a start; otherwise an `endTime` field makes a
    /// finish; anything else is progress.
    pub fn classify(object: &Map<String, Json>) -> Self {
        if object.contains_key("startTime") {
            RecordKind::Start
        } else if object.contains_key("endTime") {
            RecordKind::Finish
        } else {
            RecordKind::Progress
        }
    }
}

/// Decode a single log line.
pub fn parse_line(line: &str) -> Result<BuildOperationRecord, serde_json::Error> {
    let json: Json = serde_json::from_str(line)?;
    let Json::Object(object) = json else {
        return Err(serde_json::Error::custom(format!(
            "expected a JSON object, found {}",
            json_type_name(&json)
        )));
    };

    let kind = RecordKind::classify(&object);
    let json = Json::Object(object);
    Ok(match kind {
        RecordKind::Start => BuildOperationRecord::Start(serde_json::from_value(json)?),
        RecordKind::Finish => BuildOperationRecord::Finish(serde_json::from_value(json)?),
        RecordKind::Progress => BuildOperationRecord::Progress(serde_json::from_value(json)?),
    })
}

fn json_type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Lazy, line-oriented reader over a build operation log.
///
/// Only the current line is held in memory. Blank lines are skipped; every
/// other line must decode or the iterator yields a [`ConvertError::Decode`]
/// carrying the 1-based line number.
pub struct RecordReader<R> {
    rdr: R,
    path: PathBuf,
    buf: String,
    line_no: usize,
}

impl RecordReader<BufReader<File>> {
    /// Open a log file for reading.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).map_err(|error| match error.kind() {
            io::ErrorKind::NotFound => ConvertError::InputNotFound {
                path: path.to_path_buf(),
            },
            _ => ConvertError::Read {
                path: path.to_path_buf(),
                error,
            },
        })?;
        if !file.metadata().is_ok_and(|meta| meta.is_file()) {
            return Err(ConvertError::InputNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(Self::new(BufReader::new(file), path))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Read records from any buffered source; `path` is only used in errors.
    pub fn new(rdr: R, path: impl Into<PathBuf>) -> Self {
        Self {
            rdr,
            path: path.into(),
            buf: String::with_capacity(8 << 10),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = anyhow::Result<BuildOperationRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(parse_line(line).map_err(|e| {
                        ConvertError::Decode {
                            path: self.path.clone(),
                            line: self.line_no,
                            message: e.to_string(),
                        }
                        .into()
                    }));
                }
                Err(error) => {
                    return Some(Err(ConvertError::Read {
                        path: self.path.clone(),
                        error,
                    }
                    .into()));
                }
            }
        }
    }
}
