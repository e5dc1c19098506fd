use redis::ConnectionLike;

use crate::{core::security::get_user_from_token, model::user::User, AppState};

pub mod auth;
pub mod profile;

/// User behind the bearer token of a request, `None` when the token is
/// missing, invalid or its session has ended.
pub(crate) async fn get_request_user<C: ConnectionLike>(
    state: &AppState,
    redis_conn: &mut C,
    token: Option<String>,
) -> anyhow::Result<Option<User>> {
    let mut conn = state.db.acquire().await?;
    get_user_from_token(&mut conn, redis_conn, &state.config, token).await
}
