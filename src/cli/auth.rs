use chrono::Local;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::security::hash_password,
    model::user::User,
    repository::{self, user::get_user_by_email},
};

pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<User> {
    let email = email.trim().to_lowercase();
    let mut conn = pool.acquire().await?;
    if get_user_by_email(&mut conn, &email).await?.is_some() {
        anyhow::bail!("user with email {} already exists", email);
    }

    let hashed_password =
        hash_password(password).map_err(|err| anyhow::anyhow!(err.to_string()))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        email,
        name: name.to_string(),
        password: hashed_password,
        created_date: Some(now),
        updated_date: Some(now),
    };
    repository::user::create_user(&mut conn, &user).await?;
    Ok(user)
}
