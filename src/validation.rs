//! Request schemas for every write operation.
//!
//! Bodies arrive as loose JSON and are checked field by field here, before
//! any store call, so a `ValidationError` never leaves partial writes behind.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

pub const NAME_MAX_CHARS: usize = 100;

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_NULL: &str = "This field may not be null.";
pub const MSG_NOT_STRING: &str = "Not a valid string.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_USERS_FORMAT: &str = "Invalid format. Expected a list of user IDs.";

/// Field name -> messages, serialized as a bare JSON object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise the 400 to return
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// PUT replaces the whole writable field set, PATCH only what is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Full,
    Partial,
}

/// Body of `POST /clients/` and `PUT|PATCH /clients/{id}/`.
///
/// Only `client_name` is writable; `id`, timestamps, `created_by` and
/// `projects` are read-only and ignored when sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInput {
    pub client_name: Option<String>,
}

impl ClientInput {
    pub fn for_create(body: &Value) -> Result<Self, ApiError> {
        Self::parse(body, UpdateMode::Full)
    }

    pub fn for_update(body: &Value, mode: UpdateMode) -> Result<Self, ApiError> {
        Self::parse(body, mode)
    }

    fn parse(body: &Value, mode: UpdateMode) -> Result<Self, ApiError> {
        let object = as_object(body)?;
        let mut errors = FieldErrors::new();
        let client_name = name_field(object, "client_name", mode, &mut errors);
        errors.into_result()?;
        Ok(Self { client_name })
    }
}

/// Body of `POST /clients/{client_id}/projects/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectInput {
    pub project_name: String,
    /// Requested assignment, as sent; resolution happens in the handler
    pub users: Vec<i64>,
}

impl CreateProjectInput {
    pub fn parse(body: &Value) -> Result<Self, ApiError> {
        let object = as_object(body)?;
        let mut errors = FieldErrors::new();

        let users = match object.get("users") {
            None => Some(Vec::new()),
            Some(value) => user_ids(value, &mut errors),
        };
        let project_name = name_field(object, "project_name", UpdateMode::Full, &mut errors);

        errors.into_result()?;
        match (project_name, users) {
            (Some(project_name), Some(users)) => Ok(Self { project_name, users }),
            // name_field in Full mode records an error whenever it yields None
            _ => Err(ApiError::field_error("project_name", MSG_REQUIRED)),
        }
    }
}

/// Body of `PUT|PATCH /projects/{id}/`.
///
/// `client` and `created_by` are fixed at creation and ignored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateProjectInput {
    pub project_name: Option<String>,
    pub users: Option<Vec<i64>>,
}

impl UpdateProjectInput {
    pub fn parse(body: &Value, mode: UpdateMode) -> Result<Self, ApiError> {
        let object = as_object(body)?;
        let mut errors = FieldErrors::new();

        let project_name = name_field(object, "project_name", mode, &mut errors);
        let users = match object.get("users") {
            None => None,
            Some(value) => user_ids(value, &mut errors),
        };

        errors.into_result()?;
        Ok(Self { project_name, users })
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object().ok_or_else(|| {
        ApiError::field_error(
            "non_field_errors",
            format!("Invalid data. Expected a dictionary, but got {}.", json_type(body)),
        )
    })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// A trimmed, non-blank display name of at most `NAME_MAX_CHARS` characters
fn name_field(
    object: &Map<String, Value>,
    field: &str,
    mode: UpdateMode,
    errors: &mut FieldErrors,
) -> Option<String> {
    let value = match object.get(field) {
        Some(value) => value,
        None => {
            if mode == UpdateMode::Full {
                errors.add(field, MSG_REQUIRED);
            }
            return None;
        }
    };

    let raw = match value {
        Value::String(s) => s,
        Value::Null => {
            errors.add(field, MSG_NULL);
            return None;
        }
        _ => {
            errors.add(field, MSG_NOT_STRING);
            return None;
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, MSG_BLANK);
        return None;
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", NAME_MAX_CHARS),
        );
        return None;
    }
    Some(trimmed.to_string())
}

/// `users` must be a JSON array whose every element is an integer
fn user_ids(value: &Value, errors: &mut FieldErrors) -> Option<Vec<i64>> {
    let parsed = value
        .as_array()
        .and_then(|items| items.iter().map(Value::as_i64).collect::<Option<Vec<i64>>>());
    if parsed.is_none() {
        errors.add("users", MSG_USERS_FORMAT);
    }
    parsed
}
