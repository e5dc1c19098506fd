use std::sync::Arc;

use chrono::{Duration, Local};
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};
use redis::ConnectionLike;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    core::{
        security::{
            generate_refresh_token_from_user, generate_token_from_user,
            get_user_from_refresh_token, get_user_from_token, hash_password, verify_hash_password,
            BearerAuthorization,
        },
        session::{add_session, remove_refresh_session, remove_session},
        utils::{datetime_to_string, datetime_to_string_opt},
    },
    model::user::User,
    repository::user::{create_user, get_user_by_email},
    schema::{
        auth::{
            DetailUser, LoginRequest, LoginResponse, LoginResponses, LogoutResponses,
            RefreshTokenRequest, RefreshTokenResponses, RegisterRequest, RegisterResponses,
        },
        common::{
            BadRequestResponse, ConflictResponse, InternalServerErrorResponse,
            UnauthorizedResponse, ValidationErrorResponse,
        },
    },
    settings::Config,
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

fn to_detail_user(user: &User) -> DetailUser {
    DetailUser {
        id: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        created_date: datetime_to_string_opt(user.created_date),
    }
}

/// Signs a token pair for `user` and opens its session.
fn issue_tokens<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
) -> anyhow::Result<LoginResponse> {
    let token = generate_token_from_user(user, config)?;
    let refresh_token = generate_refresh_token_from_user(user, config)?;
    add_session(redis_conn, user, config, &token, &refresh_token)?;

    let now = Local::now();
    let exp = now + Duration::minutes(config.jwt_exp as i64);
    let exp_refresh_token = now + Duration::minutes(config.jwt_refresh_exp as i64);
    Ok(LoginResponse {
        exp: datetime_to_string(exp.fixed_offset()),
        exp_in: config.jwt_exp as i64 * 60,
        exp_refresh_token: datetime_to_string(exp_refresh_token.fixed_offset()),
        refresh_token,
        token,
        token_type: "Bearer".to_string(),
        user: to_detail_user(user),
    })
}

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/auth/register", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_register(
        &self,
        json: Json<RegisterRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RegisterResponses {
        let errors = json.validate();
        if !errors.is_empty() {
            return RegisterResponses::BadRequest(Json(ValidationErrorResponse::new(errors)));
        }
        let email = json.email.trim().to_lowercase();

        let mut conn = match state.db.acquire().await {
            Ok(val) => val,
            Err(err) => {
                return RegisterResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_register",
                        "acquire connection",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // check email on db
        match get_user_by_email(&mut conn, &email).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                return RegisterResponses::Conflict(Json(ConflictResponse {
                    message: "Email is already registered".to_string(),
                }));
            }
            Err(err) => {
                return RegisterResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_register",
                        "check email on database",
                        &err.to_string(),
                    ),
                ));
            }
        }

        let password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return RegisterResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_register",
                        "hash password",
                        &err.to_string(),
                    ),
                ));
            }
        };
        let now = Local::now().fixed_offset();
        let user = User {
            id: Uuid::now_v7(),
            email,
            name: json.name.trim().to_string(),
            password,
            created_date: Some(now),
            updated_date: Some(now),
        };
        if let Err(err) = create_user(&mut conn, &user).await {
            return RegisterResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_register",
                    "create user",
                    &err.to_string(),
                ),
            ));
        }
        info!("user {} registered", user.id);
        RegisterResponses::Created(Json(to_detail_user(&user)))
    }

    #[oai(path = "/auth/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_login(
        &self,
        json: Json<LoginRequest>,
        state: Data<&Arc<AppState>>,
    ) -> LoginResponses {
        let mut conn = match state.db.acquire().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "acquire connection",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "get redis pool connection",
                    &err.to_string(),
                )))
            }
        };

        // get user on db
        let user = match get_user_by_email(&mut conn, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_login",
                        "check user on database",
                        &err.to_string(),
                    ),
                ));
            }
        };
        let Some(user) = user else {
            warn!("login attempt for unknown email");
            return LoginResponses::BadRequest(Json(BadRequestResponse {
                message: "Invalid credentials".to_string(),
            }));
        };

        // validate user password
        let is_valid = match verify_hash_password(&json.password, &user.password) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_login",
                    "validate user password",
                    &err.to_string(),
                )))
            }
        };
        if !is_valid {
            warn!("invalid password for user {}", user.id);
            return LoginResponses::BadRequest(Json(BadRequestResponse {
                message: "Invalid credentials".to_string(),
            }));
        }

        match issue_tokens(&mut redis_conn, &user, &state.config) {
            Ok(val) => LoginResponses::Ok(Json(val)),
            Err(err) => LoginResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_login",
                "issue tokens",
                &err.to_string(),
            ))),
        }
    }

    #[oai(
        path = "/auth/refresh-token",
        method = "post",
        tag = "ApiAuthTags::Auth"
    )]
    async fn auth_refresh_token(
        &self,
        json: Json<RefreshTokenRequest>,
        state: Data<&Arc<AppState>>,
    ) -> RefreshTokenResponses {
        let mut conn = match state.db.acquire().await {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "acquire connection",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        let refresh_token_user = match get_user_from_refresh_token(
            &mut conn,
            &mut redis_conn,
            &state.config,
            Some(json.refresh_token.clone()),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return RefreshTokenResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_refresh_token",
                        "get user from refresh token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let Some(refresh_token_user) = refresh_token_user else {
            return RefreshTokenResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };

        // a refresh token is single use
        if let Err(err) = remove_refresh_session(&mut redis_conn, &json.refresh_token) {
            return RefreshTokenResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_refresh_token",
                    "revoke refresh token",
                    &err.to_string(),
                ),
            ));
        }

        match issue_tokens(&mut redis_conn, &refresh_token_user, &state.config) {
            Ok(val) => RefreshTokenResponses::Ok(Json(val)),
            Err(err) => RefreshTokenResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.auth",
                    "auth_refresh_token",
                    "issue tokens",
                    &err.to_string(),
                ),
            )),
        }
    }

    #[oai(path = "/auth/logout", method = "post", tag = "ApiAuthTags::Auth")]
    async fn auth_logout(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> LogoutResponses {
        let mut conn = match state.db.acquire().await {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "acquire connection",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get redis conn from pool
        let mut redis_conn = match state.redis_conn.get() {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get redis pool connection",
                        &err.to_string(),
                    ),
                ))
            }
        };

        // Validate user token
        let jwt_token = auth.0.token;
        let user = match get_user_from_token(
            &mut conn,
            &mut redis_conn,
            &state.config,
            jwt_token.clone(),
        )
        .await
        {
            Ok(val) => val,
            Err(err) => {
                return LogoutResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "auth_logout",
                        "get user from token",
                        &err.to_string(),
                    ),
                ))
            }
        };
        let (Some(_), Some(jwt_token)) = (user, jwt_token) else {
            return LogoutResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        };
        if let Err(err) = remove_session(&mut redis_conn, &jwt_token) {
            return LogoutResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "auth_logout",
                "remove session",
                &err.to_string(),
            )));
        }
        LogoutResponses::NoContent
    }
}
