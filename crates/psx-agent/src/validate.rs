//! Type checks for produced outputs.
//!
//! This is the only validation layer: the uploader trusts any value accepted here.
use std::io::ErrorKind;

use psx_model::{FieldSpec, FieldType};
use serde_json::Value;
use tokio::fs::File;
use url::Url;

use crate::ValidationError;

/// Check `value` against the declared type of `field`.
///
/// FILE values must be strings naming either an openable regular file or, when no
/// such file exists, a syntactically valid URL. The local path is always tried first;
/// any open error other than "not found" rejects the value without trying the URL.
pub async fn validate(field: &FieldSpec, value: &Value) -> Result<(), ValidationError> {
    let ok = match field.field_type {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::File => match value {
            Value::String(reference) => return validate_file(field, reference).await,
            _ => false,
        },
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::mismatch(
            &field.name,
            field.field_type,
            json_kind(value),
        ))
    }
}

async fn validate_file(field: &FieldSpec, reference: &str) -> Result<(), ValidationError> {
    let unreadable = |reason: String| ValidationError::FileUnreadable {
        field: field.name.clone(),
        value: reference.to_string(),
        reason,
    };
    match File::open(reference).await {
        Ok(file) => {
            let meta = file.metadata().await.map_err(|e| unreadable(e.to_string()))?;
            if meta.is_file() {
                Ok(())
            } else {
                Err(unreadable("not a regular file".to_string()))
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => match Url::parse(reference) {
            Ok(_) => Ok(()),
            Err(_) => Err(ValidationError::FileNotFound {
                field: field.name.clone(),
                value: reference.to_string(),
            }),
        },
        Err(e) => Err(unreadable(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
