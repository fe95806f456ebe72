//! Deep merge over `serde_json::Value` trees.
//!
//! Used when several controllers contribute fragments to the same OpenAPI
//! path: object keys merge recursively, arrays concatenate (so repeated
//! `parameters` or `tags` accumulate), and scalars take the later value.

use serde_json::Value;

/// Merge `overlay` into `base` in place.
///
/// Merge law: objects merge key-by-key (recursing), arrays concatenate,
/// everything else — including a type mismatch between the two sides — is
/// overwritten by the overlay value. Commutative on disjoint keys,
/// right-biased on overlapping scalars.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            base_items.extend(overlay_items.iter().cloned());
        }
        (base_slot, value) => {
            *base_slot = value.clone();
        }
    }
}
