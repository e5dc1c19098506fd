use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::Deserialize;

use crate::{
    core::error::ProfileError,
    schema::common::{
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
        ValidationErrorResponse,
    },
};

#[derive(Object, Deserialize, Clone, Debug, PartialEq)]
pub struct DetailContact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
}

#[derive(Object, Deserialize, Clone, Debug, PartialEq)]
pub struct DetailSkill {
    pub id: String,
    pub name: String,
}

#[derive(Object, Deserialize, Clone, Debug, PartialEq)]
pub struct DetailExperience {
    pub id: String,
    pub company: String,
    pub role: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub achievements: Vec<String>,
}

#[derive(Object, Deserialize, Clone, Debug, PartialEq)]
pub struct DetailEducation {
    pub id: String,
    pub degree: String,
    pub institution: String,
    pub year: Option<i32>,
}

#[derive(Object, Deserialize, Clone, Debug, PartialEq)]
pub struct ProfileResponse {
    pub id: String,
    pub user_id: String,
    pub resume_text: Option<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
    pub contact: DetailContact,
    pub skills: Vec<DetailSkill>,
    pub experience: Vec<DetailExperience>,
    pub education: Vec<DetailEducation>,
}

fn internal_error(function: &str, err: &ProfileError) -> Json<InternalServerErrorResponse> {
    Json(InternalServerErrorResponse::new(
        "route.profile",
        function,
        "profile service",
        &err.to_string(),
    ))
}

#[allow(clippy::large_enum_variant)]
#[derive(ApiResponse)]
pub enum GetProfileResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

impl GetProfileResponses {
    pub fn from_error(function: &str, err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(message) => Self::NotFound(Json(NotFoundResponse { message })),
            err => Self::InternalServerError(internal_error(function, &err)),
        }
    }
}

#[allow(clippy::large_enum_variant)]
#[derive(ApiResponse)]
pub enum CreateProfileResponses {
    #[oai(status = 201)]
    Created(Json<ProfileResponse>),

    #[oai(status = 400)]
    BadRequest(Json<ValidationErrorResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

impl CreateProfileResponses {
    pub fn from_error(function: &str, err: ProfileError) -> Self {
        match err {
            ProfileError::Validation(errors) => {
                Self::BadRequest(Json(ValidationErrorResponse::new(errors)))
            }
            ProfileError::Duplicate(message) => Self::Conflict(Json(ConflictResponse { message })),
            err => Self::InternalServerError(internal_error(function, &err)),
        }
    }
}

#[allow(clippy::large_enum_variant)]
#[derive(ApiResponse)]
pub enum UpdateProfileResponses {
    #[oai(status = 200)]
    Ok(Json<ProfileResponse>),

    #[oai(status = 400)]
    BadRequest(Json<ValidationErrorResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 409)]
    Conflict(Json<ConflictResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

impl UpdateProfileResponses {
    pub fn from_error(function: &str, err: ProfileError) -> Self {
        match err {
            ProfileError::Validation(errors) => {
                Self::BadRequest(Json(ValidationErrorResponse::new(errors)))
            }
            ProfileError::NotFound(message) => Self::NotFound(Json(NotFoundResponse { message })),
            ProfileError::Duplicate(message) => Self::Conflict(Json(ConflictResponse { message })),
            err => Self::InternalServerError(internal_error(function, &err)),
        }
    }
}
