//! Recursive key search over a result tree.

use serde_json::Value;

/// Collect every non-container value stored under `key`, anywhere in `tree`.
///
/// The traversal is depth-first in document order. Mapping values that are themselves mappings or
/// sequences are descended into rather than collected, even when their key matches. Scalars found
/// directly inside sequences have no key and are never collected.
#[must_use]
pub fn extract<'a>(tree: &'a Value, key: &str) -> Vec<&'a Value> {
    let mut matches = Vec::new();
    collect(tree, key, &mut matches);
    matches
}

fn collect<'a>(node: &'a Value, key: &str, matches: &mut Vec<&'a Value>) {
    match node {
        Value::Object(map) => {
            for (k, v) in map {
                if is_container(v) {
                    collect(v, key, matches);
                } else if k == key {
                    matches.push(v);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, key, matches);
            }
        }
        _ => {}
    }
}

const fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}
