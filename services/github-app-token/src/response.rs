//! Untyped GitHub API response handling
//!
//! Bodies are decoded into a generic JSON object and the one field each call
//! needs is checked for presence first, then for shape.

use serde_json::{Map, Value};

use crate::error::TokenError;

/// A decoded response body plus the HTTP status it arrived with
#[derive(Debug)]
pub struct ResponseObject {
    pub status: u16,
    pub body: Map<String, Value>,
}

impl ResponseObject {
    /// Decode `text` as a JSON object. Arrays, scalars and `null` are rejected.
    pub fn parse(url: &str, status: u16, text: &str) -> Result<Self, TokenError> {
        let body = serde_json::from_str::<Map<String, Value>>(text).map_err(|source| {
            TokenError::Decode {
                url: url.to_string(),
                source,
            }
        })?;
        Ok(Self { status, body })
    }

    /// Integer-valued number field, rendered in canonical base-10 form
    pub fn require_integer(&self, field: &'static str) -> Result<String, TokenError> {
        let value = self.require(field)?;
        let number = match value {
            Value::Number(number) => number,
            other => return Err(type_mismatch(field, "number", other)),
        };

        if let Some(n) = number.as_u64() {
            return Ok(n.to_string());
        }
        if let Some(n) = number.as_i64() {
            return Ok(n.to_string());
        }
        match number.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok((f as i64).to_string()),
            _ => Err(type_mismatch(field, "integer", value)),
        }
    }

    /// String field
    pub fn require_string(&self, field: &'static str) -> Result<String, TokenError> {
        match self.require(field)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(type_mismatch(field, "string", other)),
        }
    }

    fn require(&self, field: &'static str) -> Result<&Value, TokenError> {
        self.body
            .get(field)
            .ok_or_else(|| TokenError::MissingField {
                field,
                status: self.status,
                message: self.message(),
            })
    }

    /// GitHub's error explanation, e.g. `Not Found` or `Bad credentials`
    fn message(&self) -> Option<String> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

fn type_mismatch(field: &'static str, expected: &'static str, value: &Value) -> TokenError {
    TokenError::TypeMismatch {
        field,
        expected,
        value: value.clone(),
    }
}
