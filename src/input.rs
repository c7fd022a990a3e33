use crate::contract::errors;
use crate::contract::{MAX_INPUT_BYTES, MAX_TEMPLATE_BYTES};
use crate::template::{DataMap, Template};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct InputPayload {
    pub bytes: Vec<u8>,
    pub source: String,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct InputError {
    pub kind: &'static str,
    pub message: String,
}

impl InputError {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(errors::INVALID_INPUT, message)
    }

    fn too_large(message: impl Into<String>) -> Self {
        Self::new(errors::TOO_LARGE, message)
    }

    fn invalid_template(message: impl Into<String>) -> Self {
        Self::new(errors::INVALID_TEMPLATE, message)
    }
}

fn arguments(args: &Value) -> Result<&Map<String, Value>, InputError> {
    args.as_object()
        .ok_or_else(|| InputError::invalid_input("arguments must be an object"))
}

fn read_limited(path: &str, limit: u64, key: &str) -> Result<Vec<u8>, InputError> {
    let path_ref = Path::new(path);
    let metadata = fs::metadata(path_ref)
        .map_err(|_| InputError::invalid_input(format!("{key} must exist and be a file")))?;
    if !metadata.is_file() {
        return Err(InputError::invalid_input(format!("{key} must be a file")));
    }
    let len = metadata.len();
    if len > limit {
        return Err(InputError::too_large(format!(
            "input exceeds limit: {len} bytes (max {limit})"
        )));
    }
    fs::read(path_ref)
        .map_err(|_| InputError::invalid_input(format!("failed to read {key} contents")))
}

/// Source document bytes from exactly one of `path` or `base64`.
pub fn load_input(args: &Value) -> Result<InputPayload, InputError> {
    let obj = arguments(args)?;

    let path_value = obj.get("path");
    let base64_value = obj.get("base64");

    match (path_value, base64_value) {
        (None, None) => Err(InputError::invalid_input(
            "either path or base64 is required",
        )),
        (Some(_), Some(_)) => Err(InputError::invalid_input(
            "path and base64 cannot both be set",
        )),
        (Some(value), None) => {
            let path = value
                .as_str()
                .ok_or_else(|| InputError::invalid_input("path must be a string"))?;
            let bytes = read_limited(path, MAX_INPUT_BYTES, "path")?;
            Ok(InputPayload {
                bytes,
                source: format!("path:{path}"),
            })
        }
        (None, Some(value)) => {
            let base64_str = value
                .as_str()
                .ok_or_else(|| InputError::invalid_input("base64 must be a string"))?;
            let bytes = STANDARD
                .decode(base64_str.as_bytes())
                .map_err(|_| InputError::invalid_input("base64 must be valid"))?;
            if bytes.len() as u64 > MAX_INPUT_BYTES {
                return Err(InputError::too_large(format!(
                    "input exceeds limit: {} bytes (max {MAX_INPUT_BYTES})",
                    bytes.len()
                )));
            }
            Ok(InputPayload {
                bytes,
                source: "base64".to_string(),
            })
        }
    }
}

/// A validated template from exactly one of `template` (inline JSON) or
/// `template_path`.
pub fn load_template(args: &Value) -> Result<Template, InputError> {
    let obj = arguments(args)?;

    let value = match (obj.get("template"), obj.get("template_path")) {
        (None, None) => {
            return Err(InputError::invalid_input(
                "either template or template_path is required",
            ));
        }
        (Some(_), Some(_)) => {
            return Err(InputError::invalid_input(
                "template and template_path cannot both be set",
            ));
        }
        (Some(inline), None) => inline.clone(),
        (None, Some(path)) => {
            let path = path
                .as_str()
                .ok_or_else(|| InputError::invalid_input("template_path must be a string"))?;
            let bytes = read_limited(path, MAX_TEMPLATE_BYTES, "template_path")?;
            serde_json::from_slice(&bytes).map_err(|err| {
                InputError::invalid_input(format!("template_path must contain JSON: {err}"))
            })?
        }
    };

    Template::from_json(&value).map_err(|err| InputError::invalid_template(err.to_string()))
}

/// The optional `data` object. Strings pass through, numbers and booleans are
/// written in their JSON form, nulls are skipped.
pub fn load_data(args: &Value) -> Result<DataMap, InputError> {
    let obj = arguments(args)?;
    let Some(value) = obj.get("data") else {
        return Ok(DataMap::new());
    };
    let Some(entries) = value.as_object() else {
        return Err(InputError::invalid_input("data must be an object"));
    };

    let mut data = DataMap::new();
    for (key, entry) in entries {
        let text = match entry {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                return Err(InputError::invalid_input(format!(
                    "data.{key} must be a string, number, or boolean"
                )));
            }
        };
        data.insert(key.clone(), text);
    }
    Ok(data)
}
