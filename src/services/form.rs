//! Loosely typed form input.
//!
//! Profile, onboarding and shipment updates accept either multipart forms
//! or JSON objects. Both are normalised into string fields plus uploaded
//! files so one code path interprets them.

use bytes::Bytes;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::errors::ServiceError;

/// A file part of a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct FormData {
    pub fields: BTreeMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn insert_file(&mut self, file: UploadedFile) -> &mut Self {
        self.files.insert(file.field.clone(), file);
        self
    }

    /// Flattens a JSON object. Scalars become their text form, `null`
    /// becomes `"null"`, a nested `container` object becomes
    /// `container[field]` keys and other objects are kept as JSON text.
    pub fn from_json(value: Value) -> Result<Self, ServiceError> {
        let Value::Object(map) = value else {
            return Err(ServiceError::bad_request("Expected a JSON object"));
        };

        let mut form = Self::new();
        for (key, value) in map {
            match value {
                Value::Object(inner) if key == "container" => {
                    for (field, v) in inner {
                        form.insert(format!("container[{}]", field), json_text(v));
                    }
                }
                other => {
                    form.insert(key, json_text(other));
                }
            }
        }
        Ok(form)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of `key`, with the literal `"null"` read as absent
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| *v != "null")
    }

    /// Non-empty value of `key`
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.value(key).filter(|v| !v.trim().is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn file(&self, key: &str) -> Option<&UploadedFile> {
        self.files.get(key)
    }

    /// Parses `key` as JSON, failing with `message` on malformed input
    pub fn json(&self, key: &str, message: &str) -> Result<Option<Value>, ServiceError> {
        match self.non_empty(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|_| ServiceError::bad_request(message)),
        }
    }
}

fn json_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Boolean spellings accepted from forms
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "t" | "yes" | "on" => Some(true),
        "false" | "0" | "f" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_flatten_to_form_fields() {
        let form = FormData::from_json(json!({
            "status": "Picked Up",
            "piece_count": 12,
            "customs_hold": true,
            "driver": null,
            "payload": {"fleet": "north"},
            "container": {"size": "40", "hazmat": false}
        }))
        .unwrap();

        assert_eq!(form.get("status"), Some("Picked Up"));
        assert_eq!(form.get("piece_count"), Some("12"));
        assert_eq!(form.get("customs_hold"), Some("true"));
        assert_eq!(form.get("driver"), Some("null"));
        assert_eq!(form.value("driver"), None);
        assert_eq!(form.get("payload"), Some(r#"{"fleet":"north"}"#));
        assert_eq!(form.get("container[size]"), Some("40"));
        assert_eq!(form.get("container[hazmat]"), Some("false"));
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(FormData::from_json(json!(["a"])).is_err());
    }

    #[test]
    fn json_field_reports_custom_message() {
        let mut form = FormData::new();
        form.insert("payload", "{not json");
        let err = form.json("payload", "Invalid JSON format in payload.").unwrap_err();
        assert_eq!(err.response_message(), "Invalid JSON format in payload.");
    }

    #[test]
    fn bool_spellings() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
