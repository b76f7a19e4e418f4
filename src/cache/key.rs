//! Cache key derivation and correlation ids.

use rand::Rng;
use serde_json::Value;

use crate::cache::clock::current_timestamp_ms;
use crate::cache::CacheRequest;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Derives the response cache key `METHOD:URL:BODY`.
///
/// The body is rendered as canonical JSON, so two requests whose bodies differ
/// only in object key order share a key. A request without a body renders the
/// body part as an empty string.
pub fn generate_response_cache_key(request: &CacheRequest) -> String {
    let body = request.body.as_ref().map(canonical_json).unwrap_or_default();
    format!("{}:{}:{}", request.method, request.url, body)
}

/// Returns a per-operation correlation token, `cache_<unix-ms>_<9 base36 chars>`.
///
/// Only used to tie metrics and error reports together; never a storage key.
pub fn generate_cache_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("cache_{}_{}", current_timestamp_ms(), suffix)
}

/// Serializes `value` as JSON with object keys sorted at every depth and no
/// insignificant whitespace.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
