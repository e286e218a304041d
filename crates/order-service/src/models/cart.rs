//! 购物车实体模型
//!
//! 每个用户一个购物车，结算或显式移除时清空条目

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 购物车
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// 购物车条目
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub qty: i32,
    pub created_at: DateTime<Utc>,
}
