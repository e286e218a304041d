//! 认证相关的 HTTP 处理器
//!
//! 提供注册、登录和获取当前用户的 API

use axum::{extract::State, Extension, Json};
use tracing::info;
use validator::Validate;

use crate::auth::{hash_password, verify_password, Claims};
use crate::dto::{ApiResponse, AuthUserDto, LoginRequest, LoginResponse, RegisterRequest};
use crate::error::{ApiError, Result};
use crate::models::User;
use crate::state::AppState;

/// 注册新顾客
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.pool)
        .await?;

    if existing.is_some() {
        return Err(ApiError::EmailAlreadyRegistered);
    }

    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role, points)
        VALUES ($1, $2, $3, 'customer', 0)
        RETURNING id, name, email, password_hash, role, points, created_at, updated_at
        "#,
    )
    .bind(&req.name)
    .bind(&req.email)
    .bind(&password_hash)
    .fetch_one(&state.pool)
    .await?;

    info!(user_id = user.id, email = %user.email, "新顾客注册成功");

    let (token, expires_at) = state
        .jwt_manager
        .generate_token(user.id, &user.email, user.role)?;

    Ok(Json(ApiResponse::success_with_message(
        LoginResponse {
            token,
            expires_at,
            user: AuthUserDto::from(user),
        },
        "注册成功",
    )))
}

/// 登录
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>> {
    req.validate()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, points, created_at, updated_at FROM users WHERE email = $1",
    )
    .bind(&req.email)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let (token, expires_at) = state
        .jwt_manager
        .generate_token(user.id, &user.email, user.role)?;

    info!(user_id = user.id, role = ?user.role, "用户登录成功");

    Ok(Json(ApiResponse::success_with_message(
        LoginResponse {
            token,
            expires_at,
            user: AuthUserDto::from(user),
        },
        "登录成功",
    )))
}

/// 获取当前登录用户信息
///
/// GET /api/auth/me
pub async fn current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<AuthUserDto>>> {
    let user_id = claims.user_id()?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, points, created_at, updated_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::CustomerNotFound(user_id))?;

    Ok(Json(ApiResponse::success(AuthUserDto::from(user))))
}
