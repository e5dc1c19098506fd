use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    core::sqlx_utils::{binds_query_as, query_builder, SqlxBinds},
    model::user::{User, TABLE_NAME},
};

pub async fn get_user_by_id(conn: &mut PgConnection, id: &Uuid) -> anyhow::Result<Option<User>> {
    let stmt = query_builder(None, TABLE_NAME, &["id = $1".to_string()], vec![]);
    let user = binds_query_as::<User>(&stmt, vec![SqlxBinds::Uuid(*id)])
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

pub async fn get_user_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> anyhow::Result<Option<User>> {
    let res_user: Option<User> = sqlx::query_as(
        r#"SELECT *
        FROM public.user
        WHERE lower(email) = lower($1)
        "#,
    )
    .bind(email.trim())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(res_user)
}

pub async fn create_user(conn: &mut PgConnection, user: &User) -> anyhow::Result<()> {
    sqlx::query(
        format!(
            r#"
        INSERT INTO {} (id, email, name, password, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.password)
    .bind(user.created_date)
    .bind(user.updated_date)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
