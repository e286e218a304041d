//! 订单实体模型

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::enums::{OrderStatus, PaymentStatus};

/// 订单
///
/// 只追加不删除，历史订单构成完整审计记录
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// 顾客提交的转账参考号，用于人工对账
    pub payment_reference: Option<String>,
    pub delivery_location: Option<String>,
    /// 本订单送达时结算的积分，最多写入一次
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 订单行项目
///
/// price 为下单时的快照，商品后续调价不影响历史订单
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub qty: i32,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}
