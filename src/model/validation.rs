use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ApiError, FieldErrors};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Payload field deserializer that keeps an explicit `null` as
/// `Some(Value::Null)`. Pair it with `#[serde(default)]` so a missing field
/// stays `None`.
pub fn given<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Collects per-field errors for one payload.
///
/// With `partial` set, absent fields are skipped instead of reported.
pub struct Validator {
    partial: bool,
    errors: FieldErrors,
}

impl Validator {
    pub fn new(partial: bool) -> Self {
        Self {
            partial,
            errors: FieldErrors::new(),
        }
    }

    fn reject(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    fn present(&mut self, field: &'static str, value: Option<Value>) -> Option<Value> {
        match value {
            None => {
                if !self.partial {
                    self.reject(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) => {
                self.reject(field, NULL);
                None
            }
            other => other,
        }
    }

    /// Trimmed, non-blank text of at most `max_len` characters. Numbers are
    /// taken as their decimal text.
    pub fn text(&mut self, field: &'static str, value: Option<Value>, max_len: usize) -> Option<String> {
        let value = match self.present(field, value)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => {
                self.reject(field, NOT_A_STRING);
                return None;
            }
        };
        let value = value.trim();

        if value.is_empty() {
            self.reject(field, BLANK);
            return None;
        }
        if value.chars().count() > max_len {
            self.reject(
                field,
                format!("Ensure this field has no more than {} characters.", max_len),
            );
            return None;
        }
        Some(value.to_string())
    }

    pub fn email(&mut self, field: &'static str, value: Option<Value>, max_len: usize) -> Option<String> {
        let value = self.text(field, value, max_len)?;
        if !EMAIL_RE.is_match(&value) {
            self.reject(field, INVALID_EMAIL);
            return None;
        }
        Some(value)
    }

    pub fn date(&mut self, field: &'static str, value: Option<Value>) -> Option<NaiveDate> {
        let value = self.present(field, value)?;
        match value.as_str().and_then(parse_date) {
            Some(date) => Some(date),
            None => {
                self.reject(field, INVALID_DATE);
                None
            }
        }
    }

    /// Primary key given as a JSON number or a numeric string.
    pub fn pk(&mut self, field: &'static str, value: Option<Value>) -> Option<i64> {
        let value = self.present(field, value)?;
        let parsed = match &value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };

        if parsed.is_none() {
            let received = match &value {
                Value::Null => "null",
                Value::Bool(_) => "bool",
                Value::Number(_) => "float",
                Value::String(_) => "str",
                Value::Array(_) => "list",
                Value::Object(_) => "dict",
            };
            self.reject(
                field,
                format!("Incorrect type. Expected pk value, received {}.", received),
            );
        }
        parsed
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
