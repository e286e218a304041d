//! 商品实体模型

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::enums::ProductCategory;

/// 商品
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub category: ProductCategory,
    pub img: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
