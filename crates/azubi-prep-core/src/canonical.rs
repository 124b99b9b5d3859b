// SPDX-License-Identifier: Apache-2.0

//! Canonical JSON encoding.
//!
//! Migration idempotence and snapshot round-trips are checked by
//! byte-equality, so every hash in the engine goes through the same
//! key-sorted encoding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub fn stable_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let raw = serde_json::to_value(value)?;
    let normalized = normalize_json_value(raw);
    serde_json::to_vec(&normalized)
}

#[must_use]
pub fn stable_hash_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn stable_json_hash_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = stable_json_bytes(value)?;
    Ok(stable_hash_hex(&bytes))
}

/// Short url-safe token derived from a canonical hash; used for
/// migration ids and snapshot key suffixes.
pub fn short_token<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let bytes = stable_json_bytes(value)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    Ok(URL_SAFE_NO_PAD.encode(&digest[..12]))
}

fn normalize_json_value(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = Map::new();
            let mut entries: Vec<(String, Value)> = map
                .into_iter()
                .map(|(k, v)| (k, normalize_json_value(v)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (k, v) in entries {
                sorted.insert(k, v);
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_json_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_change_bytes() {
        let a = json!({"b": 1, "a": {"y": 2, "x": 3}});
        let b = json!({"a": {"x": 3, "y": 2}, "b": 1});
        assert_eq!(
            stable_json_bytes(&a).expect("bytes"),
            stable_json_bytes(&b).expect("bytes")
        );
    }

    #[test]
    fn array_order_is_preserved() {
        let a = json!([1, 2, 3]);
        let b = json!([3, 2, 1]);
        assert_ne!(
            stable_json_bytes(&a).expect("bytes"),
            stable_json_bytes(&b).expect("bytes")
        );
    }

    #[test]
    fn short_token_is_deterministic_and_url_safe() {
        let v = json!({"modulesCompleted": ["fue-01-planning"]});
        let t1 = short_token(&v).expect("token");
        let t2 = short_token(&v).expect("token");
        assert_eq!(t1, t2);
        assert!(t1.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
