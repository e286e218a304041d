//! 订单 HTTP 处理器（顾客侧）
//!
//! 下单与订单查询，状态流转见 service::workflow

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, ClaimFreeDrinkRequest, CreateOrderRequest, OrderDto, OrderSummaryDto,
    PointsBalanceDto,
};
use crate::error::Result;
use crate::middleware::ensure_self_or_admin;
use crate::service::loyalty;
use crate::state::AppState;

/// 创建订单（普通结算或免费饮品兑换单）
///
/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<ApiResponse<OrderSummaryDto>>> {
    req.validate()?;
    ensure_self_or_admin(&claims, req.user_id)?;

    let summary = state.workflow.create_order(&req).await?;

    info!(
        order_id = summary.id,
        user_id = req.user_id,
        free_drink = req.is_free_drink,
        "订单创建成功"
    );

    Ok(Json(ApiResponse::success_with_message(
        summary,
        "订单创建成功",
    )))
}

/// 查询用户的全部订单，按下单时间倒序
///
/// GET /api/orders/user/{userId}
pub async fn list_user_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>> {
    ensure_self_or_admin(&claims, user_id)?;

    let orders = state.workflow.fetch_orders_for_user(user_id).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// 用积分兑换免费饮品（仅扣积分，不建订单）
///
/// POST /api/orders/claim-free-drink
pub async fn claim_free_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ClaimFreeDrinkRequest>,
) -> Result<Json<ApiResponse<PointsBalanceDto>>> {
    ensure_self_or_admin(&claims, req.user_id)?;

    let points = loyalty::claim_free_drink(&state.pool, req.user_id).await?;

    info!(user_id = req.user_id, balance = points, "免费饮品兑换成功");

    Ok(Json(ApiResponse::success_with_message(
        PointsBalanceDto {
            user_id: req.user_id,
            points,
        },
        "兑换成功",
    )))
}
