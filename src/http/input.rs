//! Request body decoding. JSON bodies must be an object; form bodies are
//! flattened to strings, except values that are themselves JSON objects or
//! arrays (the CRM posts nested DTOs that way).

use crate::comparatif::RawComparatifInput;
use crate::http::ApiError;
use serde_json::Value;

const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

fn media_type(content_type: Option<&str>) -> Option<String> {
    content_type.map(|ct| {
        ct.split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    })
}

pub fn parse_request_data(content_type: Option<&str>, body: &[u8]) -> Result<RawComparatifInput, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::Parse("Empty request body".to_string()));
    }

    match media_type(content_type).as_deref() {
        Some(FORM) => parse_form(body),
        Some(JSON) | None => parse_json(body),
        Some(other) if other.ends_with("+json") => parse_json(body),
        Some(other) => Err(ApiError::Parse(format!("Unsupported content type '{}'", other))),
    }
}

fn parse_json(body: &[u8]) -> Result<RawComparatifInput, ApiError> {
    match serde_json::from_slice::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::Parse("Request body must be a JSON object".to_string())),
    }
}

fn parse_form(body: &[u8]) -> Result<RawComparatifInput, ApiError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)?;
    let mut data = RawComparatifInput::new();
    // Repeated keys: last one wins.
    for (key, raw) in pairs {
        data.insert(key, form_value(raw));
    }
    Ok(data)
}

fn form_value(raw: String) -> Value {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value @ (Value::Object(_) | Value::Array(_))) = serde_json::from_str::<Value>(&raw) {
            return value;
        }
    }
    Value::String(raw)
}
