use chrono::Local;
use fake::{Fake, Faker};
use redis::ConnectionLike;
use sqlx::PgConnection;
use uuid::Uuid;

use super::security::{generate_refresh_token_from_user, generate_token_from_user, hash_password};
use crate::{
    core::session::add_session, model::user::User, repository::user::create_user,
    settings::Config,
};

pub fn generate_random<T: fake::Dummy<fake::Faker>>() -> T {
    Faker.fake()
}

pub struct TestUser {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

/// Inserts a user and opens a session for it, as a login would.
pub async fn generate_test_user<C: ConnectionLike>(
    conn: &mut PgConnection,
    redis_conn: &mut C,
    config: &Config,
    email: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        email: email.to_lowercase(),
        name: generate_random::<String>(),
        password: hash_password(password).map_err(|err| anyhow::anyhow!(err.to_string()))?,
        created_date: Some(now),
        updated_date: Some(now),
    };
    create_user(conn, &user).await?;

    let token = generate_token_from_user(&user, config)?;
    let refresh_token = generate_refresh_token_from_user(&user, config)?;
    add_session(redis_conn, &user, config, &token, &refresh_token)?;

    Ok(TestUser {
        user,
        token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::{
        core::{
            security::get_user_from_token, session::get_session, test_utils::generate_test_user,
        },
        settings::get_config,
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = get_config()?;
        let client = redis::Client::open(config.redis_url.clone())?;
        let mut redis_conn = client.get_connection()?;

        // When
        let mut conn = pool.acquire().await?;
        let res = generate_test_user(
            &mut conn,
            &mut redis_conn,
            &config,
            "TestUser@example.com",
            "testpassword",
        )
        .await?;

        // Expect
        // is user exists on db
        let user: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, email FROM public.user WHERE id = $1")
                .bind(res.user.id)
                .fetch_optional(&mut *conn)
                .await?;
        assert_eq!(user.map(|x| x.1), Some("testuser@example.com".to_string()));

        // is jwt token valid
        let user_token =
            get_user_from_token(&mut conn, &mut redis_conn, &config, Some(res.token.clone()))
                .await?;
        assert_eq!(user_token.map(|x| x.id), Some(res.user.id));

        // is user exists on redis
        let session = get_session(&mut redis_conn, &res.token)?;
        assert!(session.is_some());
        Ok(())
    }
}
