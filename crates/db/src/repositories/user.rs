use crate::models::{DbSession, DbUser};
use argon2::{Argon2, PasswordVerifier};
use chrono::{Duration, Utc};
use eyre::{eyre, Result};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

pub async fn create_user(
    pool: &Pool<Postgres>,
    email: &str,
    first_name: &str,
    last_name: &str,
    password_hash: &str,
) -> Result<DbUser> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    tracing::debug!("Creating user: id={}, email={}", id, email);

    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, email, first_name, last_name, password_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, email, first_name, last_name, password_hash, created_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .bind(password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &Pool<Postgres>, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, first_name, last_name, password_hash, created_at
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Returns the user when the password matches the stored hash.
pub async fn verify_credentials(
    pool: &Pool<Postgres>,
    email: &str,
    password: &str,
) -> Result<Option<DbUser>> {
    let Some(user) = get_user_by_email(pool, email).await? else {
        tracing::debug!("Login for unknown email: {}", email);
        return Ok(None);
    };

    let parsed_hash = argon2::PasswordHash::new(&user.password_hash)
        .map_err(|e| eyre!("Invalid password hash: {}", e))?;
    let is_valid = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();

    Ok(is_valid.then_some(user))
}

pub async fn create_session(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    ttl: Duration,
) -> Result<DbSession> {
    let token = Uuid::new_v4();
    let now = Utc::now();

    let session = sqlx::query_as::<_, DbSession>(
        r#"
        INSERT INTO sessions (token, user_id, expires_at, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING token, user_id, expires_at, created_at
        "#,
    )
    .bind(token)
    .bind(user_id)
    .bind(now + ttl)
    .bind(now)
    .fetch_one(pool)
    .await?;

    tracing::debug!("Session created for user {}", user_id);
    Ok(session)
}

/// Looks up the owner of an unexpired session.
pub async fn get_session_user(pool: &Pool<Postgres>, token: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT u.id, u.email, u.first_name, u.last_name, u.password_hash, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete_session(pool: &Pool<Postgres>, token: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}
