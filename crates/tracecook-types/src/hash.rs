use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serialize a JSON value for stable hashing.
///
/// `serde_json::Map` is backed by a `BTreeMap` unless the `preserve_order`
/// feature is enabled (it isn't, anywhere in this workspace), so object
/// keys are already emitted in sorted order here — this is the "keys
/// sorted, stable float/int encoding" canonical form, not something that
/// needs a bespoke sorting pass.
pub fn canonical_json(value: &Value) -> String {
    serde_json::to_string(value).expect("Value serialization is infallible")
}

/// SHA-256 of the canonical JSON form, truncated to the first 16 hex
/// characters (64 bits). Ample for the batch sizes this runs over —
/// single trace files, not a shared content-addressed store.
pub fn content_hash(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(value).as_bytes());
    let digest = hasher.finalize();
    let full = format!("{:x}", digest);
    full[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hash_is_stable_regardless_of_insertion_order() {
        let a = content_hash(&json!({"role": "user", "content": "hi"}));
        let b = content_hash(&json!({"content": "hi", "role": "user"}));
        assert_eq!(a, b);
    }

    #[test]
    fn hash_differs_on_content_change() {
        let a = content_hash(&json!({"role": "user", "content": "hi"}));
        let b = content_hash(&json!({"role": "user", "content": "bye"}));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_is_16_hex_chars() {
        let h = content_hash(&json!({"x": 1}));
        assert_eq!(h.len(), 16);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
