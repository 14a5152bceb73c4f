//! # Authentication Module
//!
//! Password hashing for new accounts and the extractors that resolve an
//! `Authorization: Bearer <token>` header into the signed-in user.
//!
//! A request without the header is anonymous. A header that is malformed or
//! names an unknown or expired session is rejected with 401.
//!
//! Guest responses are guarded by an edit token handed out once at creation
//! and stored only as an Argon2 hash.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
};
use eyre::Result;
use meetgrid_core::{access::Viewer, errors::MeetError, models::user::User};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Hashes a password using the Argon2 algorithm
///
/// Returns the PHC string (algorithm, parameters, salt and hash) that
/// `verify_credentials` in the db crate checks against.
///
/// ```rust
/// use meetgrid_api::middleware::auth::hash_password;
///
/// let hashed = hash_password("correct horse").unwrap();
/// assert!(hashed.starts_with("$argon2"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre::eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks a plain secret against a stored Argon2 hash; unparsable hashes never match.
pub fn verify_secret(hash: &str, secret: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(secret.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// A fresh guest edit token and its hash, in that order.
pub fn issue_edit_token() -> Result<(String, String)> {
    let token = Uuid::new_v4().simple().to_string();
    let hash = hash_password(&token)?;
    Ok((token, hash))
}

/// Parses `Bearer <uuid>` into a session token.
pub fn parse_bearer(value: &HeaderValue) -> Result<Uuid, MeetError> {
    let invalid = || MeetError::Authentication("Invalid authorization header".to_string());

    let value = value.to_str().map_err(|_| invalid())?;
    let token = value.strip_prefix("Bearer ").ok_or_else(invalid)?;
    Uuid::parse_str(token.trim()).map_err(|_| invalid())
}

/// A signed-in user and the session token they presented.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: Uuid,
}

impl AuthUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::from(&self.user)
    }
}

/// The signed-in user, or `None` for an anonymous request.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn viewer(&self) -> Option<Viewer> {
        self.0.as_ref().map(AuthUser::viewer)
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(MaybeUser(None));
        };
        let token = parse_bearer(header)?;

        let user = state
            .store
            .get_session_user(token)
            .await?
            .ok_or_else(|| MeetError::Authentication("Session is invalid or has expired".to_string()))?;

        Ok(MaybeUser(Some(AuthUser {
            user: user.into(),
            token,
        })))
    }
}

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.ok_or_else(|| AppError(MeetError::Authentication("Authentication required".to_string())))
    }
}
