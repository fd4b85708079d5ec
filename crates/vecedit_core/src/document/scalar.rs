//! The one coercion policy shared by every typed read.
//!
//! A tree edit stores every scalar as text, so numeric and boolean reads also
//! accept the textual form. Failures are reported where the value is used, not
//! where it was edited.

use serde_json::Value;

use super::NodePath;
use crate::core_api::CoreError;

pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Text form of a scalar, or `None` for mappings and sequences.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn to_string(value: &Value, path: &NodePath) -> Result<String, CoreError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(CoreError::validation(path, "a string", kind_name(other))),
    }
}

pub fn to_i64(value: &Value, path: &NodePath) -> Result<i64, CoreError> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Ok(v);
            }
            n.as_f64()
                .and_then(integral_f64)
                .ok_or_else(|| CoreError::validation(path, "an integer", &n.to_string()))
        }
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral_f64))
                .ok_or_else(|| CoreError::validation(path, "an integer", &format!("'{s}'")))
        }
        other => Err(CoreError::validation(path, "an integer", kind_name(other))),
    }
}

pub fn to_f64(value: &Value, path: &NodePath) -> Result<f64, CoreError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| CoreError::validation(path, "a number", &n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CoreError::validation(path, "a number", &format!("'{s}'"))),
        other => Err(CoreError::validation(path, "a number", kind_name(other))),
    }
}

pub fn to_bool(value: &Value, path: &NodePath) -> Result<bool, CoreError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(CoreError::validation(path, "a boolean", &n.to_string())),
        },
        Value::String(s) => match s.trim() {
            "true" | "True" | "1" => Ok(true),
            "false" | "False" | "0" => Ok(false),
            _ => Err(CoreError::validation(path, "a boolean", &format!("'{s}'"))),
        },
        other => Err(CoreError::validation(path, "a boolean", kind_name(other))),
    }
}

fn integral_f64(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
