use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single offending input, addressed by its dotted path in the request body
/// (for example `skills.add[0].name`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub property: String,
    pub message: String,
}

impl FieldError {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("storage failure: {0}")]
    Storage(sqlx::Error),
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

const UNIQUE_VIOLATION: &str = "23505";

/// Translation of persistence errors shared by every store adapter.
impl From<sqlx::Error> for ProfileError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("Data not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Self::Duplicate("Duplicate resource found".to_string())
            }
            _ => Self::Storage(err),
        }
    }
}
