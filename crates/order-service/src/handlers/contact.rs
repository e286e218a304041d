//! 联系我们 HTTP 处理器

use axum::{extract::State, Json};
use tracing::info;
use validator::Validate;

use crate::dto::{ApiResponse, ContactRequest};
use crate::error::Result;
use crate::state::AppState;

/// 提交留言
///
/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ApiResponse<()>>> {
    req.validate()?;

    sqlx::query("INSERT INTO contact_messages (name, email, message) VALUES ($1, $2, $3)")
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.message)
        .execute(&state.pool)
        .await?;

    info!(email = %req.email, "收到新留言");

    Ok(Json(ApiResponse::success_empty("留言已收到")))
}
