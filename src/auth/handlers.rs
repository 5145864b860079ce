//! Auth HTTP handlers: register, login, me.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthUser;
use crate::models::user::UserRecord;
use crate::services::RegisterUser;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 2))]
    pub full_name: String,
    #[validate(length(min = 10))]
    pub phone_number: String,
    #[validate(length(min = 1))]
    pub birthday: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// User as shown to clients. Carries no password field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub birthday: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(u: UserRecord) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            phone_number: u.phone_number,
            birthday: u.birthday,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub message: &'static str,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserResponse,
    pub expires_at: DateTime<Utc>,
}

fn parse_body<T: Validate>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    let Json(body) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok(body)
}

/// POST /register
#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SuccessResponse<UserResponse>>)> {
    let body = parse_body(body)?;
    let user = state
        .credentials()
        .register(RegisterUser {
            email: body.email,
            password: body.password,
            full_name: body.full_name,
            phone_number: body.phone_number,
            birthday: body.birthday,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse {
            message: "User registered successfully",
            data: user.into(),
        }),
    ))
}

/// POST /login
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let body = parse_body(body)?;
    let user = state
        .credentials()
        .authenticate(&body.email, &body.password)
        .await?;
    let (token, expires_at) = state.tokens().issue_token(user.id, &user.email)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
        user: user.into(),
        expires_at,
    }))
}

/// GET /me
#[instrument(skip_all, fields(user_id = claims.user_id))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> AppResult<Json<SuccessResponse<UserResponse>>> {
    let user = state.credentials().get_by_id(claims.user_id).await?;
    Ok(Json(SuccessResponse {
        message: "User information retrieved successfully",
        data: user.into(),
    }))
}
