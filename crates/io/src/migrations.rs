//! Built-in migrations, in the order they must run.
//!
//! They evolve the legacy document shape (camelCase keys, untyped kinds,
//! intervention lists, padded identifiers) into the current [`Record`] shape.
//!
//! [`Record`]: carelink_core::Record

use serde_json::{Map, Value};

use crate::migrate::Migration;

pub fn builtin() -> Vec<Migration> {
    vec![
        Migration {
            id: "0001-rename-legacy-fields",
            predicate: has_legacy_fields,
            transform: rename_legacy_fields,
        },
        Migration {
            id: "0002-default-kind",
            predicate: lacks_kind,
            transform: default_kind,
        },
        Migration {
            id: "0003-interventions-map",
            predicate: has_intervention_list,
            transform: interventions_to_map,
        },
        Migration {
            id: "0004-normalize-identifiers",
            predicate: has_unnormalized_identifiers,
            transform: normalize_identifiers,
        },
    ]
}

fn object(doc: &Value) -> Result<Map<String, Value>, String> {
    doc.as_object()
        .cloned()
        .ok_or_else(|| "document is not a JSON object".to_string())
}

// ---------------------------------------------------------------------------
// 0001: legacy field names
// ---------------------------------------------------------------------------

const LEGACY_FIELDS: &[(&str, &str)] = &[
    ("_id", "record_id"),
    ("swedishMrn", "swedish_id"),
    ("providenceMrn", "providence_id"),
    ("patientName", "subject_name"),
    ("dob", "date_of_birth"),
    ("date", "event_date"),
    ("createdAt", "created_at"),
];

fn has_legacy_fields(doc: &Value) -> bool {
    doc.as_object()
        .is_some_and(|o| LEGACY_FIELDS.iter().any(|(old, _)| o.contains_key(*old)))
}

fn rename_legacy_fields(doc: &Value) -> Result<Value, String> {
    let mut obj = object(doc)?;
    for (old, new) in LEGACY_FIELDS {
        if let Some(v) = obj.remove(*old) {
            let v = match *new {
                "record_id" => id_to_string(v),
                "created_at" => legacy_timestamp(v),
                "date_of_birth" | "event_date" => legacy_date(v),
                _ => v,
            };
            // A current key wins over its legacy spelling.
            obj.entry(new.to_string()).or_insert(v);
        }
    }
    Ok(Value::Object(obj))
}

fn id_to_string(v: Value) -> Value {
    match v {
        Value::Number(n) => Value::String(n.to_string()),
        other => other,
    }
}

/// Legacy stores wrote timestamps as `{"$$date": <millis>}`.
fn legacy_timestamp(v: Value) -> Value {
    let millis = match &v {
        Value::Object(o) => o.get("$$date").and_then(Value::as_i64),
        Value::Number(n) => n.as_i64(),
        _ => return v,
    };
    millis
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| Value::String(dt.to_rfc3339()))
        .unwrap_or(Value::Null)
}

/// Calendar fields stored the same way become `YYYY-MM-DD` (UTC).
fn legacy_date(v: Value) -> Value {
    let millis = match &v {
        Value::Object(o) => o.get("$$date").and_then(Value::as_i64),
        Value::Number(n) => n.as_i64(),
        _ => return v,
    };
    millis
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|dt| Value::String(dt.date_naive().format("%Y-%m-%d").to_string()))
        .unwrap_or(Value::Null)
}

// ---------------------------------------------------------------------------
// 0002: every record has a kind
// ---------------------------------------------------------------------------

fn lacks_kind(doc: &Value) -> bool {
    doc.as_object().is_some_and(|o| !o.contains_key("kind"))
}

fn default_kind(doc: &Value) -> Result<Value, String> {
    let mut obj = object(doc)?;
    obj.entry("kind").or_insert(Value::String("encounter".into()));
    Ok(Value::Object(obj))
}

// ---------------------------------------------------------------------------
// 0003: interventions as a flag map
// ---------------------------------------------------------------------------

fn has_intervention_list(doc: &Value) -> bool {
    doc.get("kind").and_then(Value::as_str) == Some("encounter")
        && doc.get("interventions").is_some_and(Value::is_array)
}

fn interventions_to_map(doc: &Value) -> Result<Value, String> {
    let mut obj = object(doc)?;
    if let Some(Value::Array(items)) = obj.remove("interventions") {
        let flags: Map<String, Value> = items
            .iter()
            .filter_map(Value::as_str)
            .map(|name| (name.to_string(), Value::Bool(true)))
            .collect();
        obj.insert("interventions".into(), Value::Object(flags));
    }
    Ok(Value::Object(obj))
}

// ---------------------------------------------------------------------------
// 0004: identifiers are trimmed strings or absent
// ---------------------------------------------------------------------------

const IDENTIFIER_FIELDS: &[&str] = &["swedish_id", "providence_id"];

fn needs_normalizing(v: &Value) -> bool {
    match v {
        Value::String(s) => s.trim() != s || s.is_empty(),
        _ => true,
    }
}

fn has_unnormalized_identifiers(doc: &Value) -> bool {
    IDENTIFIER_FIELDS
        .iter()
        .any(|f| doc.get(*f).is_some_and(needs_normalizing))
}

fn normalize_identifiers(doc: &Value) -> Result<Value, String> {
    let mut obj = object(doc)?;
    for field in IDENTIFIER_FIELDS {
        let Some(v) = obj.remove(*field) else { continue };
        let normalized = match v {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        if !normalized.is_empty() {
            obj.insert(field.to_string(), Value::String(normalized));
        }
    }
    Ok(Value::Object(obj))
}
