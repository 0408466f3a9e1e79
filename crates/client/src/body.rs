use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Error payload returned by the backend.
///
/// The backend answers failures with a flat `message`, a `detail` string, a
/// `non_field_errors` list, a map of field name to messages, or several of
/// these at once. Every key is kept; values that fit none of the shapes end up
/// in `unparsed`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    message: Option<String>,
    detail: Option<String>,
    non_field_errors: Vec<String>,
    fields: BTreeMap<String, Vec<String>>,
    unparsed: Vec<String>,
}

impl ErrorBody {
    pub fn from_slice(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }

        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::from_value(value),
            Err(_) => Self {
                unparsed: vec![String::from_utf8_lossy(bytes).trim().to_string()],
                ..Self::default()
            },
        }
    }

    pub fn from_value(value: Value) -> Self {
        let mut body = Self::default();
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return body,
            Value::String(text) => {
                body.unparsed.push(text);
                return body;
            }
            other => {
                body.unparsed.push(other.to_string());
                return body;
            }
        };

        for (key, value) in map {
            match value {
                Value::String(message) if key == "message" => body.message = Some(message),
                Value::String(detail) if key == "detail" => body.detail = Some(detail),
                value => match string_list(&value) {
                    Some(list) if key == "non_field_errors" => body.non_field_errors = list,
                    Some(list) => {
                        body.fields.insert(key, list);
                    }
                    None => body.unparsed.push(format!("{key}: {value}")),
                },
            }
        }
        body
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// The single message a login-style form shows: `message`, then `detail`,
    /// then the first non-field error.
    pub fn primary_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.detail.as_deref())
            .or_else(|| self.non_field_errors.first().map(String::as_str))
    }

    /// Every message in the body. Field maps are flattened in key order.
    pub fn messages(&self) -> Vec<String> {
        self.message
            .iter()
            .chain(&self.detail)
            .chain(&self.non_field_errors)
            .chain(self.fields.values().flatten())
            .chain(&self.unparsed)
            .cloned()
            .collect()
    }

    /// All messages joined with a space, as the registration form displays them.
    pub fn joined(&self) -> String {
        self.messages().join(" ")
    }

    /// Messages attached to one form field.
    pub fn field(&self, name: &str) -> Option<&[String]> {
        if name == "non_field_errors" && !self.non_field_errors.is_empty() {
            return Some(self.non_field_errors.as_slice());
        }
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.detail.is_none()
            && self.non_field_errors.is_empty()
            && self.fields.is_empty()
            && self.unparsed.is_empty()
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primary_message() {
            Some(message) => f.write_str(message),
            None if self.is_empty() => f.write_str("no details"),
            None => f.write_str(&self.joined()),
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(message) => Some(vec![message.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}
