//! QR payload decoding.
//!
//! Task QR codes carry either `{"task_id": "..."}` or the bare task id.

use serde_json::Value;
use tracing::debug;

/// Extracts the task id from scanned QR text.
///
/// Returns the `task_id` field when `raw` is a JSON object carrying one
/// (strings verbatim, numbers in their JSON spelling). Anything else yields
/// `raw` with surrounding whitespace removed. Never fails: an unusable code
/// simply resolves to an id no quest contains.
pub fn decode_task_id(raw: &str) -> String {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(fields)) => match fields.get("task_id") {
            Some(Value::String(task_id)) => {
                debug!(task_id = %task_id, "QR decoded as JSON envelope");
                task_id.clone()
            }
            Some(Value::Number(task_id)) => {
                debug!(task_id = %task_id, "QR decoded as JSON envelope with numeric id");
                task_id.to_string()
            }
            Some(other) => {
                debug!(value = %other, "QR task_id is not a scalar, using raw content");
                raw.trim().to_string()
            }
            None => {
                debug!("QR JSON object has no task_id, using raw content");
                raw.trim().to_string()
            }
        },
        Ok(_) => {
            debug!("QR content is JSON but not an object, using raw content");
            raw.trim().to_string()
        }
        Err(e) => {
            debug!(error = %e, "QR content is not JSON, using raw content");
            raw.trim().to_string()
        }
    }
}
