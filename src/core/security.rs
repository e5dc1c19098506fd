use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Local};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use redis::ConnectionLike;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::{model::user::User, repository::user::get_user_by_id, settings::Config};

use super::session::{get_refresh_session, get_session};

const REFRESH_TYPE_KEY: &str = "refresh";

/// password hashing
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2id v19, default params
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub exp: i64,
    /// Keeps tokens issued within the same second distinct.
    pub jti: String,
}

impl Claims {
    pub fn new(user: &User, config: &Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_exp as i64)).timestamp();
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            exp,
            jti: Uuid::now_v7().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClaimsRefresh {
    pub id: String,
    pub email: String,
    pub exp: i64,
    pub type_key: String,
    pub jti: String,
}

impl ClaimsRefresh {
    pub fn new(user: &User, config: &Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_refresh_exp as i64)).timestamp();
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            exp,
            type_key: REFRESH_TYPE_KEY.to_string(),
            jti: Uuid::now_v7().to_string(),
        }
    }
}

/// Generate token
pub fn encode_token<T: Serialize>(claims: &T, jwt_secret: &str) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and validate token
pub fn decode_token(token: &str, jwt_secret: &str) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

/// Extract payload and validate refresh token
pub fn decode_refresh_token(token: &str, jwt_secret: &str) -> anyhow::Result<ClaimsRefresh> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<ClaimsRefresh>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub fn generate_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    encode_token(&Claims::new(user, config), &config.jwt_secret)
}

pub fn generate_refresh_token_from_user(user: &User, config: &Config) -> anyhow::Result<String> {
    encode_token(&ClaimsRefresh::new(user, config), &config.jwt_secret)
}

/// Resolves the user behind an access token. A token that fails JWT
/// validation, or has no live session, resolves to `None`.
pub async fn get_user_from_token<C: ConnectionLike>(
    conn: &mut PgConnection,
    redis_conn: &mut C,
    config: &Config,
    jwt_token: Option<String>,
) -> anyhow::Result<Option<User>> {
    let Some(jwt_token) = jwt_token else {
        return Ok(None);
    };
    let Ok(claims) = decode_token(&jwt_token, &config.jwt_secret) else {
        return Ok(None);
    };
    let Some(session) = get_session(redis_conn, &jwt_token)? else {
        return Ok(None);
    };
    if session.user_id != claims.id {
        return Ok(None);
    }
    let user_id = Uuid::parse_str(&session.user_id)?;
    get_user_by_id(conn, &user_id).await
}

/// Resolves the user behind a refresh token that is valid and not yet
/// revoked.
pub async fn get_user_from_refresh_token<C: ConnectionLike>(
    conn: &mut PgConnection,
    redis_conn: &mut C,
    config: &Config,
    refresh_token: Option<String>,
) -> anyhow::Result<Option<User>> {
    let Some(refresh_token) = refresh_token else {
        return Ok(None);
    };
    let Ok(claims) = decode_refresh_token(&refresh_token, &config.jwt_secret) else {
        return Ok(None);
    };
    if claims.type_key != REFRESH_TYPE_KEY {
        return Ok(None);
    }
    let Some(session_user_id) = get_refresh_session(redis_conn, &refresh_token)? else {
        return Ok(None);
    };
    if session_user_id != claims.id {
        return Ok(None);
    }
    let user_id = Uuid::parse_str(&claims.id)?;
    get_user_by_id(conn, &user_id).await
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// Bearer token authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}


#[cfg(test)]
mod test_generate_token {
    use chrono::Local;
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::*;
    use crate::{
        core::session::{add_session, remove_session},
        repository::user::create_user,
        settings::get_config,
    };

    fn new_user() -> User {
        let now = Local::now().fixed_offset();
        User {
            id: Uuid::now_v7(),
            email: format!("{}@example.com", Uuid::now_v7()),
            name: "hello".to_string(),
            password: hash_password("password").unwrap(),
            created_date: Some(now),
            updated_date: Some(now),
        }
    }

    #[test]
    fn test_access_token_is_not_a_refresh_token() {
        let config = get_config().unwrap();
        let user = new_user();
        let token = generate_token_from_user(&user, &config).unwrap();
        let claims = decode_token(&token, &config.jwt_secret).unwrap();
        assert_eq!(claims.id, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert!(decode_refresh_token(&token, &config.jwt_secret).is_err());
        assert!(decode_token(&token, "another-secret").is_err());
    }

    #[sqlx::test]
    async fn test_user_from_token(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = get_config()?;
        let client = redis::Client::open(config.redis_url.clone())?;
        let redis_pool = r2d2::Pool::builder().build(client)?;
        let mut redis_conn = redis_pool.get()?;
        let mut conn = pool.acquire().await?;
        let user = new_user();
        create_user(&mut conn, &user).await?;

        // When
        let token = generate_token_from_user(&user, &config)?;
        let refresh_token = generate_refresh_token_from_user(&user, &config)?;
        add_session(&mut redis_conn, &user, &config, &token, &refresh_token)?;

        // Expect
        let token_user =
            get_user_from_token(&mut conn, &mut redis_conn, &config, Some(token.clone())).await?;
        assert_eq!(token_user.map(|x| x.id), Some(user.id));
        let refresh_user = get_user_from_refresh_token(
            &mut conn,
            &mut redis_conn,
            &config,
            Some(refresh_token.clone()),
        )
        .await?;
        assert_eq!(refresh_user.map(|x| x.id), Some(user.id));

        // a refresh token is not accepted as an access token
        let as_access = get_user_from_token(
            &mut conn,
            &mut redis_conn,
            &config,
            Some(refresh_token.clone()),
        )
        .await?;
        assert!(as_access.is_none());

        // revoked
        assert!(remove_session(&mut redis_conn, &token)?);
        let token_user =
            get_user_from_token(&mut conn, &mut redis_conn, &config, Some(token)).await?;
        assert!(token_user.is_none());
        let refresh_user =
            get_user_from_refresh_token(&mut conn, &mut redis_conn, &config, Some(refresh_token))
                .await?;
        assert!(refresh_user.is_none());
        Ok(())
    }
}
