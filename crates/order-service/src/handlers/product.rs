//! 商品目录 HTTP 处理器
//!
//! 菜单浏览接口，无需登录

use axum::{
    extract::{Path, State},
    Json,
};

use crate::dto::ApiResponse;
use crate::error::{ApiError, Result};
use crate::models::Product;
use crate::state::AppState;

const PRODUCT_COLUMNS: &str = "id, name, price, category, img, created_at, updated_at";

/// 获取全部商品
///
/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(products)))
}

/// 获取首页推荐商品（最新上架的 6 个）
///
/// GET /api/products/featured
pub async fn featured_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC LIMIT 6"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(ApiResponse::success(products)))
}

/// 获取单个商品详情
///
/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Product>>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::ProductNotFound(id))?;

    Ok(Json(ApiResponse::success(product)))
}
