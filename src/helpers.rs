use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::from_value;

/// Serializes `value` to JSON and encodes the result as unpadded base64url.
///
/// Serialization is deterministic: struct fields are emitted in declaration order and the
/// base64url alphabet is fixed, so encoding the same value twice yields the same segment.
pub(crate) fn encode_json<T>(value: &T) -> Result<String, serde_json::Error>
where
    T: Serialize,
{
    Ok(BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_string(value)?))
}

// Returns None for anything that isn't unpadded base64url-encoded JSON, never a partial
// value. Whether a missing payload is fatal is the calling layer's decision, not ours.
pub(crate) fn decode_json<T>(segment: &str) -> Option<T>
where
    T: DeserializeOwned,
{
    let raw = BASE64_URL_SAFE_NO_PAD.decode(segment).ok()?;
    serde_json::from_slice(&raw).ok()
}

// Attempt to deserialize the value; if the value is null or an error occurs, return None.
// This is useful when deserializing fields that may mean different things in different
// contexts, and where we would rather ignore the result than fail to deserialize. For
// example, a JOSE header produced by another implementation could carry an `alg` value of
// an unexpected JSON type, which should read as "no usable algorithm" rather than as a
// malformed header.
pub(crate) fn deserialize_option_or_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match from_value::<Option<T>>(value) {
        Ok(val) => Ok(val),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_json, encode_json};

    use serde_json::{json, Value};

    #[test]
    fn test_encode_decode_round_trip() {
        let value = json!({"userId": 2, "name": "ferris"});
        let encoded = encode_json(&value).expect("serialization failed");
        assert_eq!(decode_json::<Value>(&encoded), Some(value));
    }

    #[test]
    fn test_encode_is_unpadded_base64url() {
        // 11 bytes of JSON would end in '=' under padded base64.
        let encoded = encode_json(&json!({"a": "~~~"})).expect("serialization failed");
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
    }

    #[test]
    fn test_decode_rejects_invalid_base64url() {
        assert_eq!(decode_json::<Value>("not!base64url"), None);
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        // "bm90IGpzb24" is base64url for "not json".
        assert_eq!(decode_json::<Value>("bm90IGpzb24"), None);
    }

    #[test]
    fn test_decode_rejects_padded_input() {
        // Same JSON as a round-trip test but with explicit '=' padding appended.
        let encoded = encode_json(&json!({"userId": 2})).expect("serialization failed");
        assert_eq!(decode_json::<Value>(&format!("{}==", encoded)), None);
    }
}
