//! Schema checks at the repository boundary.
//!
//! Inputs are parsed into the operation's schema before any SQL is built,
//! outputs are parsed back into the entity's model schema before they leave
//! the repository. Both directions fail with [`RepositoryValidationError`].

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as Json;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use super::base::Fields;
use super::typed::Payload;
use crate::config::{MASKED_VALUE, SENSITIVE_KEY_MARKERS};

/// Anything that can cross the repository boundary
pub trait Schema: Serialize + DeserializeOwned + Validate + Send + Sync + 'static {}

impl<T> Schema for T where T: Serialize + DeserializeOwned + Validate + Send + Sync + 'static {}

/// Which side of the repository call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn from_serde(error: &serde_json::Error) -> Self {
        let message = error.to_string();
        let field = ["missing field `", "unknown field `"]
            .iter()
            .find_map(|prefix| message.strip_prefix(prefix))
            .and_then(|rest| rest.split('`').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("data")
            .to_string();
        Self { field, message }
    }

    fn collect(errors: &ValidationErrors) -> Vec<Self> {
        let mut collected: Vec<Self> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| {
                    let message = failure
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| format!("failed `{}` check", failure.code));
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        collected.sort_by(|a, b| a.field.cmp(&b.field));
        collected
    }
}

/// Schema mismatch on the way into or out of a repository.
///
/// `data` is a redacted copy of the offending payload; it is safe to log.
#[derive(Debug, Clone, Error)]
pub struct RepositoryValidationError {
    pub method: &'static str,
    pub direction: Direction,
    pub data: Json,
    pub errors: Vec<FieldError>,
}

impl RepositoryValidationError {
    pub fn new(
        method: &'static str,
        direction: Direction,
        data: &Json,
        errors: Vec<FieldError>,
    ) -> Self {
        let mut secrets = Vec::new();
        collect_secrets(data, &mut secrets);

        let errors = errors
            .into_iter()
            .map(|error| FieldError {
                message: scrub(&error.message, &secrets),
                field: error.field,
            })
            .collect();

        Self {
            method,
            direction,
            data: redact(data),
            errors,
        }
    }
}

impl std::fmt::Display for RepositoryValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Validation failed in {} ({}):",
            self.method, self.direction
        )?;
        writeln!(f, "Data: {}", self.data)?;
        write!(f, "Errors:")?;
        for error in &self.errors {
            write!(f, "\n{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEY_MARKERS
        .iter()
        .any(|marker| key.contains(marker))
}

/// Copy of `value` with every sensitive key masked, at any depth
pub fn redact(value: &Json) -> Json {
    match value {
        Json::Object(map) => Json::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if is_sensitive(key) {
                        Json::String(MASKED_VALUE.to_string())
                    } else {
                        redact(value)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Json::Array(items) => Json::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

fn collect_secrets(value: &Json, secrets: &mut Vec<String>) {
    match value {
        Json::Object(map) => {
            for (key, value) in map {
                if !is_sensitive(key) {
                    collect_secrets(value, secrets);
                    continue;
                }
                match value {
                    Json::Null => {}
                    Json::String(secret) if secret.is_empty() => {}
                    Json::String(secret) => secrets.push(secret.clone()),
                    other => secrets.push(other.to_string()),
                }
            }
        }
        Json::Array(items) => items.iter().for_each(|item| collect_secrets(item, secrets)),
        _ => {}
    }
}

fn scrub(message: &str, secrets: &[String]) -> String {
    secrets
        .iter()
        .fold(message.to_string(), |message, secret| {
            message.replace(secret.as_str(), MASKED_VALUE)
        })
}

/// Parse and check an operation input, returning the field map to bind.
///
/// Fields left unset (`null`) are dropped so they never reach the statement.
pub fn validate_input<S: Schema>(
    method: &'static str,
    payload: Payload<S>,
) -> Result<Fields, RepositoryValidationError> {
    let schema = match payload {
        Payload::Schema(schema) => schema,
        Payload::Raw(value) => serde_json::from_value::<S>(value.clone()).map_err(|error| {
            RepositoryValidationError::new(
                method,
                Direction::Input,
                &value,
                vec![FieldError::from_serde(&error)],
            )
        })?,
    };

    let data = serde_json::to_value(&schema).map_err(|error| {
        RepositoryValidationError::new(
            method,
            Direction::Input,
            &Json::Null,
            vec![FieldError::from_serde(&error)],
        )
    })?;

    if let Err(errors) = schema.validate() {
        return Err(RepositoryValidationError::new(
            method,
            Direction::Input,
            &data,
            FieldError::collect(&errors),
        ));
    }

    match data {
        Json::Object(map) => Ok(map.into_iter().filter(|(_, value)| !value.is_null()).collect()),
        other => Err(RepositoryValidationError::new(
            method,
            Direction::Input,
            &other,
            vec![FieldError::new("data", "expected a mapping of fields")],
        )),
    }
}

/// Parse a stored row into the model schema and check it.
pub fn validate_output<M: Schema>(
    method: &'static str,
    row: &impl Serialize,
) -> Result<M, RepositoryValidationError> {
    let data = serde_json::to_value(row).map_err(|error| {
        RepositoryValidationError::new(
            method,
            Direction::Output,
            &Json::Null,
            vec![FieldError::from_serde(&error)],
        )
    })?;

    let model = serde_json::from_value::<M>(data.clone()).map_err(|error| {
        RepositoryValidationError::new(
            method,
            Direction::Output,
            &data,
            vec![FieldError::from_serde(&error)],
        )
    })?;

    model.validate().map_err(|errors| {
        RepositoryValidationError::new(
            method,
            Direction::Output,
            &data,
            FieldError::collect(&errors),
        )
    })?;

    Ok(model)
}
