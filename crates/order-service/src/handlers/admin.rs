//! 管理后台 HTTP 处理器
//!
//! 仪表盘统计、顾客管理、订单审核与积分操作，全部需要管理员角色

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use tracing::info;
use validator::Validate;

use sqlx::PgPool;

use crate::auth::{hash_password, Claims};
use crate::dto::{
    AdminAccountDto, ApiResponse, BestSellerDto, CreateAdminRequest, CustomerDto, DashboardStats,
    OrderDto, PointsBalanceDto, UpdateOrderStatusRequest, UpdatePaymentStatusRequest,
};
use crate::error::{ApiError, Result};
use crate::service::loyalty;
use crate::state::AppState;

/// 仪表盘统计
///
/// GET /api/admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<DashboardStats>>> {
    claims.require_admin()?;

    let total_customers: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'customer'")
            .fetch_one(&state.pool)
            .await?;

    let total_orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&state.pool)
        .await?;

    let pending_orders: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = 'pending'")
            .fetch_one(&state.pool)
            .await?;

    // 本月收入只统计已通过审核的订单，取消和待审核的不算
    let monthly_income: f64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(total), 0)
        FROM orders
        WHERE status IN ('approved', 'preparing', 'ready', 'delivered')
          AND created_at >= date_trunc('month', NOW())
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    let best_selling_products = best_selling_products(&state.pool, 5).await?;

    Ok(Json(ApiResponse::success(DashboardStats {
        total_customers,
        total_orders,
        pending_orders,
        monthly_income,
        best_selling_products,
    })))
}

/// 按历史累计销量取前 N 个商品
pub async fn best_selling_products(
    pool: &PgPool,
    limit: i64,
) -> crate::error::Result<Vec<BestSellerDto>> {
    let products = sqlx::query_as::<_, BestSellerDto>(
        r#"
        SELECT p.id, p.name, p.price, p.img, SUM(oi.qty) AS total_qty
        FROM order_items oi
        JOIN products p ON p.id = oi.product_id
        GROUP BY p.id, p.name, p.price, p.img
        ORDER BY total_qty DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(products)
}

/// 管理员账号列表
///
/// GET /api/admin/admins
pub async fn list_admins(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<AdminAccountDto>>>> {
    claims.require_admin()?;

    let admins = admin_accounts(&state.pool).await?;
    Ok(Json(ApiResponse::success(admins)))
}

/// 查询全部管理员账号，按创建时间排序
pub async fn admin_accounts(pool: &PgPool) -> crate::error::Result<Vec<AdminAccountDto>> {
    let admins = sqlx::query_as::<_, AdminAccountDto>(
        "SELECT id, name, email, created_at FROM users WHERE role = 'admin' ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(admins)
}

/// 顾客列表
///
/// GET /api/admin/customers
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<CustomerDto>>>> {
    claims.require_admin()?;

    let customers = sqlx::query_as::<_, CustomerDto>(
        "SELECT id, name, email, points, created_at FROM users WHERE role = 'customer' ORDER BY created_at DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(customers)))
}

/// 全部订单列表（带顾客信息）
///
/// GET /api/admin/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<OrderDto>>>> {
    claims.require_admin()?;

    let orders = state.workflow.fetch_all_orders().await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// 更新订单状态
///
/// PUT /api/admin/orders/{id}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<i64>,
    Json(req): Json<UpdateOrderStatusRequest>,
) -> Result<Json<ApiResponse<OrderDto>>> {
    claims.require_admin()?;

    let order = state.workflow.update_status(order_id, req.status).await?;

    info!(order_id, status = ?req.status, "订单状态更新成功");

    Ok(Json(ApiResponse::success_with_message(
        order,
        "订单状态更新成功",
    )))
}

/// 更新支付核验结果
///
/// PUT /api/admin/orders/{id}/payment-status
pub async fn update_payment_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(order_id): Path<i64>,
    Json(req): Json<UpdatePaymentStatusRequest>,
) -> Result<Json<ApiResponse<OrderDto>>> {
    claims.require_admin()?;

    let order = state
        .workflow
        .update_payment_status(order_id, req.payment_status)
        .await?;

    info!(order_id, payment_status = ?req.payment_status, "支付状态更新成功");

    Ok(Json(ApiResponse::success_with_message(
        order,
        "支付状态更新成功",
    )))
}

/// 清零顾客积分
///
/// PUT /api/admin/customers/{id}/reset-points
pub async fn reset_points(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<PointsBalanceDto>>> {
    claims.require_admin()?;

    let previous = loyalty::reset_points(&state.pool, user_id).await?;

    info!(user_id, previous, "顾客积分已清零");

    Ok(Json(ApiResponse::success_with_message(
        PointsBalanceDto { user_id, points: 0 },
        "积分已清零",
    )))
}

/// 代顾客兑换免费饮品（门店柜台操作）
///
/// PUT /api/admin/customers/{id}/claim-free-drink
pub async fn claim_free_drink(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<PointsBalanceDto>>> {
    claims.require_admin()?;

    let points = loyalty::claim_free_drink(&state.pool, user_id).await?;

    info!(user_id, balance = points, "管理员代顾客兑换免费饮品");

    Ok(Json(ApiResponse::success_with_message(
        PointsBalanceDto { user_id, points },
        "兑换成功",
    )))
}

/// 创建或提升管理员
///
/// POST /api/admin/create-admin
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<Json<ApiResponse<CustomerDto>>> {
    claims.require_admin()?;
    req.validate()?;

    let existing: Option<(i64, String)> =
        sqlx::query_as("SELECT id, role FROM users WHERE email = $1")
            .bind(&req.email)
            .fetch_optional(&state.pool)
            .await?;

    let admin = match existing {
        Some((_, ref role)) if role == "admin" => {
            return Err(ApiError::Validation("该用户已是管理员".to_string()));
        }
        Some((id, _)) => {
            // 已注册的顾客直接提升角色，保留原密码和积分
            sqlx::query_as::<_, CustomerDto>(
                r#"
                UPDATE users SET role = 'admin', updated_at = NOW()
                WHERE id = $1
                RETURNING id, name, email, points, created_at
                "#,
            )
            .bind(id)
            .fetch_one(&state.pool)
            .await?
        }
        None => {
            let password_hash = hash_password(&req.password)?;
            sqlx::query_as::<_, CustomerDto>(
                r#"
                INSERT INTO users (name, email, password_hash, role, points)
                VALUES ($1, $2, $3, 'admin', 0)
                RETURNING id, name, email, points, created_at
                "#,
            )
            .bind(&req.name)
            .bind(&req.email)
            .bind(&password_hash)
            .fetch_one(&state.pool)
            .await?
        }
    };

    info!(admin_id = admin.id, email = %admin.email, "管理员账号已就绪");

    Ok(Json(ApiResponse::success_with_message(
        admin,
        "管理员创建成功",
    )))
}
