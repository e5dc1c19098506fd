use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::Deserialize;

use crate::core::error::FieldError;
use crate::schema::common::{
    BadRequestResponse, ConflictResponse, InternalServerErrorResponse, UnauthorizedResponse,
    ValidationErrorResponse,
};

#[derive(Object, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = vec![];
        let name_len = self.name.trim().chars().count();
        if !(2..=50).contains(&name_len) {
            errors.push(FieldError::new("name", "must be between 2 and 50 characters"));
        }
        let email = self.email.trim();
        let is_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !is_email {
            errors.push(FieldError::new("email", "must be a valid email address"));
        }
        if self.password.chars().count() < 6 {
            errors.push(FieldError::new(
                "password",
                "must be at least 6 characters long",
            ));
        }
        errors
    }
}

#[derive(Object, Deserialize)]
pub struct DetailUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_date: Option<String>,
}

#[derive(ApiResponse)]
pub enum RegisterResponses {
    #[oai(status = 201)]
    Created(Json<DetailUser>),

    #[oai(status = 400)]
    BadRequest(Json<ValidationErrorResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Object, Deserialize)]
pub struct LoginResponse {
    pub exp: String,
    pub exp_in: i64,
    pub exp_refresh_token: String,
    pub refresh_token: String,
    pub token: String,
    pub token_type: String,
    pub user: DetailUser,
}

#[derive(ApiResponse)]
pub enum LoginResponses {
    #[oai(status = 200)]
    Ok(Json<LoginResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(ApiResponse)]
pub enum RefreshTokenResponses {
    #[oai(status = 200)]
    Ok(Json<LoginResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum LogoutResponses {
    #[oai(status = 204)]
    NoContent,

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
