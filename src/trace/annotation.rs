//! Convert free-form `details`/`result` maps into debug annotation trees.

use super::proto::DebugAnnotation;
use super::record::{Details, Value};

/// Build the top-level annotation `name` from an optional map.
///
/// A missing map yields an annotation with no entries, so every slice carries
/// the same annotation names regardless of what the log recorded.
pub fn named_dict(name: &str, map: Option<&Details>) -> DebugAnnotation {
    DebugAnnotation {
        name: Some(name.to_string()),
        dict_entries: map.map(dict_entries).unwrap_or_default(),
        ..Default::default()
    }
}

/// Build an annotation from `(key, value)` pairs that are not already a map.
pub fn named_entries<'a>(
    name: &str,
    entries: impl IntoIterator<Item = (&'a str, Value)>,
) -> DebugAnnotation {
    DebugAnnotation {
        name: Some(name.to_string()),
        dict_entries: entries
            .into_iter()
            .filter_map(|(key, value)| convert(Some(key), &value))
            .collect(),
        ..Default::default()
    }
}

fn dict_entries(map: &Details) -> Vec<DebugAnnotation> {
    map.iter()
        .filter_map(|(key, value)| convert(Some(key.as_str()), value))
        .collect()
}

/// Nulls produce nothing; everything else produces exactly one annotation.
fn convert(name: Option<&str>, value: &Value) -> Option<DebugAnnotation> {
    let mut annotation = DebugAnnotation {
        name: name.map(str::to_string),
        ..Default::default()
    };
    match value {
        Value::Null => return None,
        Value::Map(map) => annotation.dict_entries = dict_entries(map),
        Value::List(items) => {
            annotation.array_values = items.iter().filter_map(|v| convert(None, v)).collect();
        }
        scalar => annotation.string_value = scalar.scalar_string(),
    }
    Some(annotation)
}
