use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use meetgrid_core::{
    errors::MeetError,
    models::user::{LoginRequest, LoginResponse, RegisterRequest, User, UserResponse},
    validation::{normalize_email, validate_registration},
};

use crate::{
    middleware::{
        auth::{hash_password, AuthUser},
        error_handling::AppError,
    },
    ApiState,
};

pub async fn register(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let (email, first_name, last_name) = validate_registration(&payload)?;

    if state.store.get_user_by_email(&email).await?.is_some() {
        return Err(MeetError::Conflict("An account with this email already exists".to_string()).into());
    }

    let password_hash = hash_password(&payload.password)?;
    let user: User = state
        .store
        .create_user(&email, &first_name, &last_name, &password_hash)
        .await?
        .into();

    tracing::info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

pub async fn login(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let invalid = || MeetError::Authentication("Invalid email or password".to_string());

    let email = normalize_email(&payload.email).map_err(|_| invalid())?;
    let user: User = state
        .store
        .verify_credentials(&email, &payload.password)
        .await?
        .ok_or_else(invalid)?
        .into();

    let session = state.store.create_session(user.id, state.session_ttl).await?;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user: UserResponse::from(&user),
    }))
}

pub async fn logout(
    State(state): State<Arc<ApiState>>,
    auth: AuthUser,
) -> Result<StatusCode, AppError> {
    state.store.delete_session(auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
