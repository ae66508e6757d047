//! Canonicalización JSON + digest para el fingerprint del snapshot.
//!
//! La forma canónica ordena las claves de objetos (BTreeMap) y serializa sin
//! espacios, de modo que el mismo contenido produce siempre el mismo string y
//! por lo tanto el mismo digest, independientemente del orden de inserción.
use blake3::Hasher;
use serde_json::Value;
use std::collections::BTreeMap;

/// Serializa un `Value` a su forma canónica (claves ordenadas, sin espacios).
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => serde_json::to_string(s).unwrap_or_default(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(to_canonical_json).collect();
            format!("[{}]", inner.join(","))
        }
        Value::Object(map) => {
            let ordered: BTreeMap<&String, String> =
                map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let inner: Vec<String> = ordered.into_iter()
                                            .map(|(k, v)| format!("{}:{}", serde_json::to_string(k).unwrap_or_default(), v))
                                            .collect();
            format!("{{{}}}", inner.join(","))
        }
    }
}

/// Digest blake3 (hex) de un string.
pub fn hash_str(input: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(input.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Digest blake3 (hex) de un `Value` en forma canónica.
pub fn hash_value(value: &Value) -> String {
    hash_str(&to_canonical_json(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonical_json_orders_object_keys() {
        let a = json!({"b": 1, "a": [true, null]});
        assert_eq!(to_canonical_json(&a), r#"{"a":[true,null],"b":1}"#);
    }

    #[test]
    fn hash_is_insensitive_to_key_order() {
        let a = json!({"x": 1, "y": "z"});
        let b = json!({"y": "z", "x": 1});
        assert_eq!(hash_value(&a), hash_value(&b));
    }

    #[test]
    fn hash_changes_with_content() {
        assert_ne!(hash_value(&json!({"v": 1})), hash_value(&json!({"v": 2})));
    }
}
