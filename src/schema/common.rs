use poem_openapi::Object;
use serde::Deserialize;

use crate::core::error::FieldError;

#[derive(Object, Deserialize)]
pub struct BadRequestResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct FieldErrorResponse {
    pub property: String,
    pub message: String,
}

impl From<FieldError> for FieldErrorResponse {
    fn from(value: FieldError) -> Self {
        Self {
            property: value.property,
            message: value.message,
        }
    }
}

#[derive(Object, Deserialize)]
pub struct ValidationErrorResponse {
    pub message: String,
    pub errors: Vec<FieldErrorResponse>,
}

impl ValidationErrorResponse {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self {
            message: "Validation failed".to_string(),
            errors: errors.into_iter().map(FieldErrorResponse::from).collect(),
        }
    }
}

#[derive(Object, Deserialize)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Unauthorized".to_string(),
        }
    }
}

#[derive(Object, Deserialize)]
pub struct NotFoundResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct ConflictResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct InternalServerErrorResponse {
    pub message: String,
}

impl InternalServerErrorResponse {
    /// Logs where the failure happened; the caller only gets an opaque message.
    pub fn new(location: &str, function: &str, step: &str, err: &str) -> Self {
        tracing::error!(location, function, step, "{}", err);
        Self {
            message: "Internal server error".to_string(),
        }
    }
}
