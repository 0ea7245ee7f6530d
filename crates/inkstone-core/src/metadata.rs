//! Metadata map and key-path access
//!
//! Document metadata is an insertion-ordered mapping from string keys to
//! YAML values (string, number, boolean, null, nested mapping, sequence).
//! The closed value type guarantees that fields the structured editor has no
//! dedicated form for still round-trip verbatim.
//!
//! Key paths are dot-separated (`testimonial.quote`, `results.0.metric`).
//! Numeric segments index into sequences. Setters create intermediate
//! mappings on demand.

use crate::error::{ContentError, ContentResult};

pub use serde_yaml::Mapping as Metadata;
pub use serde_yaml::Value;

/// Look up a value by key path.
pub fn get_path<'a>(metadata: &'a Metadata, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = metadata.get(first)?;
    for segment in segments {
        current = match current {
            Value::Mapping(map) => map.get(segment)?,
            Value::Sequence(seq) => seq.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set a value by key path, creating intermediate mappings on demand.
///
/// A scalar in an intermediate position is replaced by a fresh mapping.
/// Numeric segments address existing sequences: an in-range index replaces
/// the element, an index equal to the length appends.
pub fn set_path(metadata: &mut Metadata, path: &str, value: Value) -> ContentResult<()> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return Err(ContentError::validation(format!("invalid key path: {path:?}")));
    }
    let root = entry_mut(metadata, segments[0]);
    set_in_value(root, &segments[1..], value, path)
}

fn entry_mut<'a>(metadata: &'a mut Metadata, key: &str) -> &'a mut Value {
    if !metadata.contains_key(key) {
        metadata.insert(Value::String(key.to_string()), Value::Null);
    }
    metadata
        .get_mut(key)
        .unwrap_or_else(|| unreachable!("key inserted above"))
}

fn set_in_value(
    current: &mut Value,
    segments: &[&str],
    value: Value,
    full_path: &str,
) -> ContentResult<()> {
    let Some((segment, rest)) = segments.split_first() else {
        *current = value;
        return Ok(());
    };

    if let Value::Sequence(seq) = current {
        if let Ok(index) = segment.parse::<usize>() {
            return if index < seq.len() {
                set_in_value(&mut seq[index], rest, value, full_path)
            } else if index == seq.len() {
                let mut slot = Value::Null;
                set_in_value(&mut slot, rest, value, full_path)?;
                seq.push(slot);
                Ok(())
            } else {
                Err(ContentError::validation(format!(
                    "index {index} out of bounds in key path {full_path:?}"
                )))
            };
        }
    }

    if !matches!(current, Value::Mapping(_)) {
        *current = Value::Mapping(Metadata::new());
    }
    let map = match current {
        Value::Mapping(map) => map,
        _ => unreachable!("replaced with a mapping above"),
    };
    set_in_value(entry_mut(map, segment), rest, value, full_path)
}

/// Remove and return the value at a key path, if present.
pub fn remove_path(metadata: &mut Metadata, path: &str) -> Option<Value> {
    match path.rsplit_once('.') {
        None => metadata.remove(path),
        Some((parent, last)) => {
            let segments: Vec<&str> = parent.split('.').collect();
            let container = value_mut(metadata.get_mut(segments[0])?, &segments[1..])?;
            match container {
                Value::Mapping(map) => map.remove(last),
                Value::Sequence(seq) => {
                    let index = last.parse::<usize>().ok()?;
                    (index < seq.len()).then(|| seq.remove(index))
                }
                _ => None,
            }
        }
    }
}

fn value_mut<'a>(current: &'a mut Value, segments: &[&str]) -> Option<&'a mut Value> {
    let Some((segment, rest)) = segments.split_first() else {
        return Some(current);
    };
    let next = match current {
        Value::Mapping(map) => map.get_mut(*segment)?,
        Value::Sequence(seq) => seq.get_mut(segment.parse::<usize>().ok()?)?,
        _ => return None,
    };
    value_mut(next, rest)
}

/// Append an item to the sequence at `path`, creating it on demand.
pub fn append_item(metadata: &mut Metadata, path: &str, item: Value) -> ContentResult<()> {
    match get_path(metadata, path) {
        None | Some(Value::Null) => set_path(metadata, path, Value::Sequence(vec![item])),
        Some(Value::Sequence(_)) => {
            let segments: Vec<&str> = path.split('.').collect();
            let target = metadata
                .get_mut(segments[0])
                .and_then(|v| value_mut(v, &segments[1..]))
                .and_then(Value::as_sequence_mut)
                .ok_or_else(|| {
                    ContentError::validation(format!("key path {path:?} is not a sequence"))
                })?;
            target.push(item);
            Ok(())
        }
        Some(_) => Err(ContentError::validation(format!(
            "key path {path:?} holds a non-sequence value"
        ))),
    }
}

/// Remove and return the item at `index` from the sequence at `path`.
pub fn remove_item(metadata: &mut Metadata, path: &str, index: usize) -> ContentResult<Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let seq = metadata
        .get_mut(segments[0])
        .and_then(|v| value_mut(v, &segments[1..]))
        .and_then(Value::as_sequence_mut)
        .ok_or_else(|| ContentError::validation(format!("key path {path:?} is not a sequence")))?;
    if index >= seq.len() {
        return Err(ContentError::validation(format!(
            "index {index} out of bounds for {path:?} (len {})",
            seq.len()
        )));
    }
    Ok(seq.remove(index))
}

/// Read a string field, treating missing and non-string values as absent.
pub fn get_str<'a>(metadata: &'a Metadata, path: &str) -> Option<&'a str> {
    get_path(metadata, path).and_then(Value::as_str)
}

/// Read a boolean field with a default.
pub fn get_bool(metadata: &Metadata, path: &str, default: bool) -> bool {
    get_path(metadata, path)
        .and_then(Value::as_bool)
        .unwrap_or(default)
}
