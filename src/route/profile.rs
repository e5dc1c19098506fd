use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use serde_json::Value;

use crate::{
    core::security::BearerAuthorization,
    route::get_request_user,
    schema::{
        common::{InternalServerErrorResponse, UnauthorizedResponse},
        profile::{CreateProfileResponses, GetProfileResponses, UpdateProfileResponses},
        profile_request::{parse_new_profile, ProfileUpdateRequest},
    },
    service::profile::{create_profile, get_profile, update_profile},
    AppState,
};

#[derive(Tags)]
enum ApiProfileTags {
    Profile,
}

pub struct ApiProfile;

#[OpenApi]
impl ApiProfile {
    #[oai(path = "/profile", method = "get", tag = "ApiProfileTags::Profile")]
    async fn profile_get(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> GetProfileResponses {
        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return GetProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_get",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_request_user(&state, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return GetProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_get",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return GetProfileResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        match get_profile(state.profile_store.as_ref(), &user.id).await {
            Ok(val) => GetProfileResponses::Ok(Json(val)),
            Err(err) => GetProfileResponses::from_error("profile_get", err),
        }
    }

    #[oai(path = "/profile", method = "post", tag = "ApiProfileTags::Profile")]
    async fn profile_create(
        &self,
        json: Json<Value>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> CreateProfileResponses {
        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return CreateProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_create",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_request_user(&state, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return CreateProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_create",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return CreateProfileResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        let profile = match parse_new_profile(&json) {
            Ok(val) => val,
            Err(err) => return CreateProfileResponses::from_error("profile_create", err),
        };
        match create_profile(state.profile_store.as_ref(), &user.id, profile).await {
            Ok(val) => CreateProfileResponses::Created(Json(val)),
            Err(err) => CreateProfileResponses::from_error("profile_create", err),
        }
    }

    #[oai(path = "/profile", method = "patch", tag = "ApiProfileTags::Profile")]
    async fn profile_update(
        &self,
        json: Json<Value>,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UpdateProfileResponses {
        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return UpdateProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_update",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let user = match get_request_user(&state, &mut redis_conn, auth.0.token).await {
            Ok(val) => val,
            Err(err) => {
                return UpdateProfileResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.profile",
                        "profile_update",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(user) = user else {
            return UpdateProfileResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        // validation happens before any persistence work
        let request = match ProfileUpdateRequest::parse(&json) {
            Ok(val) => val,
            Err(err) => return UpdateProfileResponses::from_error("profile_update", err),
        };
        match update_profile(state.profile_store.as_ref(), &user.id, request).await {
            Ok(val) => UpdateProfileResponses::Ok(Json(val)),
            Err(err) => UpdateProfileResponses::from_error("profile_update", err),
        }
    }
}
