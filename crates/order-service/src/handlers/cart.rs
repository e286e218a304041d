//! 购物车 HTTP 处理器
//!
//! 购物车按用户惰性创建，条目按 (cart_id, product_id) 去重累加数量

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{AddToCartRequest, ApiResponse, CartItemDto, UpdateCartItemRequest};
use crate::error::{ApiError, Result};
use crate::middleware::ensure_self_or_admin;
use crate::state::AppState;

const CART_ITEM_COLUMNS: &str = r#"
    ci.id, ci.cart_id, ci.product_id, ci.qty,
    p.name AS product_name, p.price, p.category, p.img
"#;

/// 获取用户购物车内容
///
/// GET /api/cart/{userId}
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<CartItemDto>>>> {
    ensure_self_or_admin(&claims, user_id)?;

    let items = sqlx::query_as::<_, CartItemDto>(&format!(
        r#"
        SELECT {CART_ITEM_COLUMNS}
        FROM cart_items ci
        JOIN carts c ON c.id = ci.cart_id
        JOIN products p ON p.id = ci.product_id
        WHERE c.user_id = $1
        ORDER BY ci.id
        "#
    ))
    .bind(user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(items)))
}

/// 加购商品，已存在则累加数量
///
/// POST /api/cart/add
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<CartItemDto>>> {
    req.validate()?;
    ensure_self_or_admin(&claims, req.user_id)?;

    let product_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = $1")
        .bind(req.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product_exists.is_none() {
        return Err(ApiError::ProductNotFound(req.product_id));
    }

    let mut tx = state.pool.begin().await?;

    // DO UPDATE 空操作是为了让 RETURNING 在冲突时也返回行
    let cart_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO carts (user_id) VALUES ($1)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING id
        "#,
    )
    .bind(req.user_id)
    .fetch_one(&mut *tx)
    .await?;

    let item_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO cart_items (cart_id, product_id, qty)
        VALUES ($1, $2, $3)
        ON CONFLICT (cart_id, product_id) DO UPDATE SET qty = cart_items.qty + EXCLUDED.qty
        RETURNING id
        "#,
    )
    .bind(cart_id)
    .bind(req.product_id)
    .bind(req.qty)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let item = fetch_cart_item(&state, item_id).await?;
    Ok(Json(ApiResponse::success_with_message(item, "已加入购物车")))
}

/// 修改购物车条目数量
///
/// PUT /api/cart/item/{id}
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCartItemRequest>,
) -> Result<Json<ApiResponse<CartItemDto>>> {
    req.validate()?;

    let owner_id = cart_item_owner(&state, id).await?;
    ensure_self_or_admin(&claims, owner_id)?;

    sqlx::query("UPDATE cart_items SET qty = $1 WHERE id = $2")
        .bind(req.qty)
        .bind(id)
        .execute(&state.pool)
        .await?;

    let item = fetch_cart_item(&state, id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// 移除购物车条目
///
/// DELETE /api/cart/item/{id}
pub async fn remove_cart_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let owner_id = cart_item_owner(&state, id).await?;
    ensure_self_or_admin(&claims, owner_id)?;

    sqlx::query("DELETE FROM cart_items WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(ApiResponse::success_empty("已移除")))
}

/// 清空用户购物车（结算成功后调用）
///
/// DELETE /api/cart/clear/{userId}
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    ensure_self_or_admin(&claims, user_id)?;

    sqlx::query(
        "DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE user_id = $1)",
    )
    .bind(user_id)
    .execute(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success_empty("购物车已清空")))
}

/// 查询条目归属的用户，不存在则报 404
async fn cart_item_owner(state: &AppState, item_id: i64) -> Result<i64> {
    sqlx::query_scalar(
        "SELECT c.user_id FROM cart_items ci JOIN carts c ON c.id = ci.cart_id WHERE ci.id = $1",
    )
    .bind(item_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::CartItemNotFound(item_id))
}

async fn fetch_cart_item(state: &AppState, item_id: i64) -> Result<CartItemDto> {
    sqlx::query_as::<_, CartItemDto>(&format!(
        r#"
        SELECT {CART_ITEM_COLUMNS}
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.id = $1
        "#
    ))
    .bind(item_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::CartItemNotFound(item_id))
}
