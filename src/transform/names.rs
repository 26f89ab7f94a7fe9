use crate::error::StageError;
use crate::transform::RecordStage;
use crate::types::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

static FORBIDDEN_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Make a key usable as a column name: every character outside
/// `[A-Za-z0-9_]` becomes `_`, and a key not starting with a letter or
/// underscore gets a leading `_`.
pub fn sanitize_key(key: &str) -> Cow<'_, str> {
    let replaced = FORBIDDEN_CHARS.replace_all(key, "_");

    match replaced.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => replaced,
        _ => Cow::Owned(format!("_{}", replaced)),
    }
}

/// Sanitize every object key in the tree, including objects inside arrays.
///
/// Keys keep their position. When two keys sanitize to the same name the
/// later value wins.
pub fn sanitize_names(obj: Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(obj.len());
    for (key, value) in obj {
        let renamed = match sanitize_key(&key) {
            Cow::Owned(renamed) => Some(renamed),
            Cow::Borrowed(_) => None,
        };
        out.insert(renamed.unwrap_or(key), sanitize_value(value));
    }
    out
}

fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Object(obj) => Value::Object(sanitize_names(obj)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        scalar => scalar,
    }
}

#[derive(Default)]
pub struct SanitizeNamesStage;

impl RecordStage for SanitizeNamesStage {
    fn name(&self) -> &str {
        "sanitize_names"
    }

    fn apply(&mut self, record: Record) -> Result<Record, StageError> {
        Ok(sanitize_names(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static VALID_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

    fn sanitize(value: Value) -> Value {
        let Value::Object(obj) = value else {
            panic!("expected object");
        };
        Value::Object(sanitize_names(obj))
    }

    fn all_keys(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(obj) => {
                for (key, child) in obj {
                    out.push(key.clone());
                    all_keys(child, out);
                }
            }
            Value::Array(items) => items.iter().for_each(|item| all_keys(item, out)),
            _ => {}
        }
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("plain"), "plain");
        assert_eq!(sanitize_key("first name"), "first_name");
        assert_eq!(sanitize_key("a-b.c d"), "a_b_c_d");
        assert_eq!(sanitize_key("1st"), "_1st");
        assert_eq!(sanitize_key("$oid"), "_oid");
        assert_eq!(sanitize_key("_private"), "_private");
        assert_eq!(sanitize_key("ünïcode"), "_n_code");
        assert_eq!(sanitize_key(""), "_");
    }

    #[test]
    fn test_unchanged_key_is_borrowed() {
        assert!(matches!(sanitize_key("already_ok"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_nested_objects_and_arrays() {
        let out = sanitize(json!({
            "user info": {"e-mail": "a@b.c"},
            "line items": [{"unit price": 3}, "not an object", [{"x y": 1}]]
        }));

        assert_eq!(
            out,
            json!({
                "user_info": {"e_mail": "a@b.c"},
                "line_items": [{"unit_price": 3}, "not an object", [{"x_y": 1}]]
            })
        );
    }

    #[test]
    fn test_key_position_is_kept() {
        let out = sanitize(json!({"a": 1, "b c": 2, "d": 3}));
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b_c", "d"]);
    }

    #[test]
    fn test_colliding_keys_keep_later_value() {
        let out = sanitize(json!({"a-b": 1, "a.b": 2}));
        assert_eq!(out, json!({"a_b": 2}));
    }

    #[test]
    fn test_idempotent_and_valid() {
        let input = json!({
            "9lives": {"$set": [{"@type": null}], "ok_key": 1},
            "with space": "v",
            "_x": {"-": true}
        });

        let once = sanitize(input);
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);

        let mut keys = Vec::new();
        all_keys(&once, &mut keys);
        for key in keys {
            assert!(VALID_KEY.is_match(&key), "invalid key {}", key);
        }
    }
}
