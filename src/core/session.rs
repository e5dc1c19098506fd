use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user::User, settings::Config};

fn refresh_key(refresh_token: &str) -> String {
    format!("refresh:{}", refresh_token)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub refresh_token: String,
}

/// Stores the access token session and its refresh token, each expiring with
/// its JWT.
pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
    token: &str,
    refresh_token: &str,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        user_id: user.id.to_string(),
        refresh_token: refresh_token.to_string(),
    };
    let session_json = serde_json::to_string(&session_data)?;
    redis::Cmd::set_ex(token, session_json, config.jwt_exp as u64 * 60).exec(redis_conn)?;
    redis::Cmd::set_ex(
        refresh_key(refresh_token),
        user.id.to_string(),
        config.jwt_refresh_exp as u64 * 60,
    )
    .exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: &str,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::cmd("get").arg(token).query(redis_conn)?;
    match res {
        Some(res) => Ok(Some(serde_json::from_str(res.as_str())?)),
        None => Ok(None),
    }
}

/// User id bound to a live refresh token.
pub fn get_refresh_session<C: ConnectionLike>(
    redis_conn: &mut C,
    refresh_token: &str,
) -> anyhow::Result<Option<String>> {
    let res: Option<String> = redis::cmd("get").arg(refresh_key(refresh_token)).query(redis_conn)?;
    Ok(res)
}

pub fn remove_refresh_session<C: ConnectionLike>(
    redis_conn: &mut C,
    refresh_token: &str,
) -> anyhow::Result<()> {
    redis::cmd("del").arg(refresh_key(refresh_token)).exec(redis_conn)?;
    Ok(())
}

/// Returns false when there was no session for `token`.
pub fn remove_session<C: ConnectionLike>(redis_conn: &mut C, token: &str) -> anyhow::Result<bool> {
    let Some(session_data) = get_session(redis_conn, token)? else {
        return Ok(false);
    };
    remove_refresh_session(redis_conn, &session_data.refresh_token)?;
    redis::cmd("del").arg(token).exec(redis_conn)?;
    Ok(true)
}
