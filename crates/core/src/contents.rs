//! Dotted-hash transform.
//!
//! Record contents exist in two equivalent shapes: a nested mapping (the
//! per-step storage form) and a flat mapping keyed by dot-joined paths
//! (the canonical working form). [`flatten`] and [`nest`] convert between
//! them. The transform is defined only over mapping-of-mapping-of-scalar
//! structures; conflicting paths (`a` alongside `a.b`) fail fast rather
//! than silently overwrite.

use crate::error::{RecordError, RecordResult};
use fhir::FlatContents;
use serde_json::{Map, Value};

/// Nested contents form: a JSON object tree with scalar leaves.
pub type Nested = Map<String, Value>;

/// Flatten a nested mapping into dot-joined keys.
///
/// Every leaf value reachable by a path of keys becomes one entry whose
/// key is the path joined with `.`. Mapping-valued nodes are traversed,
/// never emitted themselves. An empty input yields an empty output.
///
/// # Errors
///
/// Returns [`RecordError::PathConflict`] when two leaves would flatten to
/// the same dotted key (possible when a literal key contains a dot).
pub fn flatten(nested: &Nested) -> RecordResult<FlatContents> {
    let mut flat = FlatContents::new();
    flatten_into(nested, "", &mut flat)?;
    Ok(flat)
}

fn flatten_into(nested: &Nested, prefix: &str, flat: &mut FlatContents) -> RecordResult<()> {
    for (key, value) in nested {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(child) => flatten_into(child, &path, flat)?,
            scalar => {
                if flat.insert(path.clone(), scalar.clone()).is_some() {
                    return Err(RecordError::PathConflict(path));
                }
            }
        }
    }
    Ok(())
}

/// Nest a flat dotted mapping back into a mapping tree.
///
/// Each key is split on `.`; intermediate mapping levels are created or
/// reused and the value is assigned at the final segment.
///
/// # Errors
///
/// Returns [`RecordError::PathConflict`] when a path would pass through
/// an existing scalar or land on an existing mapping (`a` and `a.b` in
/// the same input).
pub fn nest(flat: &FlatContents) -> RecordResult<Nested> {
    let mut nested = Nested::new();
    for (key, value) in flat {
        let mut segments = key.split('.').peekable();
        let mut cursor = &mut nested;
        loop {
            let segment = segments.next().unwrap_or_default();
            if segments.peek().is_none() {
                if cursor.contains_key(segment) {
                    return Err(RecordError::PathConflict(key.clone()));
                }
                cursor.insert(segment.to_string(), value.clone());
                break;
            }

            let entry = cursor
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Nested::new()));
            cursor = match entry {
                Value::Object(child) => child,
                _ => return Err(RecordError::PathConflict(key.clone())),
            };
        }
    }
    Ok(nested)
}

/// Rebuild a flat record from per-step nested contents as read back from
/// the storage collaborator.
///
/// Each step's mapping is flattened and the results are combined. Step
/// schemas keep the key spaces disjoint in practice; if two steps do
/// carry the same key, later entries win, matching the storage layer's
/// merge order.
pub fn merge_step_contents<'a>(
    step_contents: impl IntoIterator<Item = &'a Nested>,
) -> RecordResult<FlatContents> {
    let mut flat = FlatContents::new();
    for nested in step_contents {
        flat.extend(flatten(nested)?);
    }
    Ok(flat)
}
