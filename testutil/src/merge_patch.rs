//! JSON merge patches (RFC 7386) computed as the difference between a snapshot of an object and
//! its modified form.

use serde_json::{Map, Value};

/// A snapshot of an object from which a merge patch is computed.
#[derive(Debug, Clone)]
pub struct MergePatch {
    base: Value,
    optimistic_lock: bool,
}

impl MergePatch {
    pub fn from_base(base: &Value) -> Self {
        Self {
            base: base.clone(),
            optimistic_lock: false,
        }
    }

    /// Adds the snapshot's `metadata.resourceVersion` to every diff so that the API server
    /// rejects the patch with a conflict if the object changed after the snapshot was taken.
    pub fn with_optimistic_lock(mut self) -> Self {
        self.optimistic_lock = true;
        self
    }

    /// Returns the merge patch that transforms the snapshot into `modified`. Nested maps are
    /// diffed recursively, removed keys become `null` and any other changed value, including a
    /// list, is replaced whole.
    pub fn diff(&self, modified: &Value) -> Value {
        let mut patch =
            diff_values(&self.base, modified).unwrap_or_else(|| Value::Object(Map::new()));
        if self.optimistic_lock {
            if let Some(resource_version) = self.base.pointer("/metadata/resourceVersion") {
                if let Value::Object(patch_map) = &mut patch {
                    let metadata = patch_map
                        .entry("metadata")
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(metadata) = metadata {
                        metadata.insert("resourceVersion".to_string(), resource_version.clone());
                    }
                }
            }
        }
        patch
    }
}

/// `None` means the two values are equal.
fn diff_values(original: &Value, modified: &Value) -> Option<Value> {
    match (original, modified) {
        (Value::Object(original), Value::Object(modified)) => {
            let mut patch = Map::new();
            for (key, original_value) in original {
                match modified.get(key) {
                    None => {
                        patch.insert(key.clone(), Value::Null);
                    }
                    Some(modified_value) => {
                        if let Some(value) = diff_values(original_value, modified_value) {
                            patch.insert(key.clone(), value);
                        }
                    }
                }
            }
            for (key, modified_value) in modified {
                if !original.contains_key(key) {
                    patch.insert(key.clone(), modified_value.clone());
                }
            }
            if patch.is_empty() {
                None
            } else {
                Some(Value::Object(patch))
            }
        }
        (original, modified) if original == modified => None,
        (_, modified) => Some(modified.clone()),
    }
}
