//! 订单工作流引擎
//!
//! 订单生命周期的核心业务逻辑，包括：
//! - 下单（含免费饮品兑换下单）
//! - 订单状态机流转校验
//! - 支付核验状态流转及其联动取消
//! - 送达时的积分结算（每单最多一次）
//!
//! ## 状态机
//!
//! pending -> approved -> preparing -> ready -> delivered
//! cancelled 可从任意非终态进入；delivered / cancelled 为终态。
//!
//! 所有"读取-校验-写入"序列都在单个事务内完成，
//! 并用 `SELECT ... FOR UPDATE` 锁定订单行或顾客行，
//! 避免并发管理操作互相覆盖或重复结算积分。

use sqlx::PgPool;
use tracing::{info, instrument};

use crate::dto::request::CreateOrderRequest;
use crate::dto::response::{OrderDto, OrderItemDto, OrderSummaryDto};
use crate::error::{ApiError, Result};
use crate::models::{Order, OrderStatus, PaymentStatus, ProductCategory};
use crate::service::loyalty;

/// 订单查询的固定列清单，保证 FromRow 映射稳定
const ORDER_COLUMNS: &str = "id, user_id, total, status, payment_status, payment_reference, \
     delivery_location, points, created_at, updated_at";

/// 校验订单状态流转是否合法
///
/// 规则（与存储无关的纯函数，便于穷举测试）：
/// 1. 同状态重放视为幂等保存，直接放行；
/// 2. 终态订单不再流转；
/// 3. 支付核验未通过时只允许 pending / cancelled；
/// 4. 只有核验通过的订单才能标记为已送达。
pub fn validate_transition(
    current: OrderStatus,
    payment: PaymentStatus,
    target: OrderStatus,
) -> Result<()> {
    if current == target {
        return Ok(());
    }

    if current.is_terminal() {
        return Err(ApiError::TerminalStatus(current));
    }

    if payment == PaymentStatus::NotVerified
        && !matches!(target, OrderStatus::Pending | OrderStatus::Cancelled)
    {
        return Err(ApiError::PaymentRejectedTransition(target));
    }

    if target == OrderStatus::Delivered && payment != PaymentStatus::Verified {
        return Err(ApiError::DeliveryRequiresVerifiedPayment);
    }

    Ok(())
}

/// 本次流转是否触发积分结算
///
/// 仅在首次进入 delivered、支付核验通过且非免费饮品订单（total > 0）时结算。
/// prior 判断保证幂等重放不会重复加分。
pub fn awards_points(
    prior: OrderStatus,
    target: OrderStatus,
    payment: PaymentStatus,
    total: f64,
) -> bool {
    prior != OrderStatus::Delivered
        && target == OrderStatus::Delivered
        && payment == PaymentStatus::Verified
        && total > 0.0
}

/// 统计计入积分的饮品数量（烘焙类不计分）
pub fn drink_quantity(items: &[(ProductCategory, i32)]) -> i32 {
    items
        .iter()
        .filter(|(category, _)| category.is_drink())
        .map(|(_, qty)| qty)
        .sum()
}

/// 订单工作流服务
#[derive(Clone)]
pub struct OrderWorkflow {
    pool: PgPool,
}

impl OrderWorkflow {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建订单
    ///
    /// 免费饮品订单在同一事务内先扣 10 积分，再以
    /// approved / verified / total = 0 落库；普通订单以
    /// pending / pending_verification（或调用方显式指定的支付状态）落库。
    /// 每个行项目保存下单时的价格快照。
    #[instrument(skip(self, req), fields(user_id = req.user_id, is_free_drink = req.is_free_drink))]
    pub async fn create_order(&self, req: &CreateOrderRequest) -> Result<OrderSummaryDto> {
        for item in &req.items {
            if item.qty < 1 {
                return Err(ApiError::Validation("商品数量必须大于 0".to_string()));
            }
        }

        let mut tx = self.pool.begin().await?;

        let (status, payment_status, total, points_balance) = if req.is_free_drink {
            // 扣分与下单同事务：任一失败都整体回滚
            let balance = loyalty::redeem_free_drink(&mut tx, req.user_id).await?;
            (OrderStatus::Approved, PaymentStatus::Verified, 0.0, Some(balance))
        } else {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
                .bind(req.user_id)
                .fetch_optional(&mut *tx)
                .await?;
            exists.ok_or(ApiError::CustomerNotFound(req.user_id))?;

            let payment_status = req.payment_status.unwrap_or_default();
            (OrderStatus::Pending, payment_status, req.total, None)
        };

        let delivery_location = req.delivery_location.as_ref().map(|v| v.to_string());

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO orders (user_id, total, status, payment_status, payment_reference, delivery_location, points)
             VALUES ($1, $2, $3, $4, $5, $6, 0)
             RETURNING id",
        )
        .bind(req.user_id)
        .bind(total)
        .bind(status)
        .bind(payment_status)
        .bind(&req.payment_reference)
        .bind(&delivery_location)
        .fetch_one(&mut *tx)
        .await?;

        for item in &req.items {
            // 调用方未给价格时按当前商品价格补齐快照
            let price = match item.price {
                Some(p) => p,
                None => {
                    let price: Option<f64> =
                        sqlx::query_scalar("SELECT price FROM products WHERE id = $1")
                            .bind(item.product_id)
                            .fetch_optional(&mut *tx)
                            .await?;
                    price.ok_or(ApiError::ProductNotFound(item.product_id))?
                }
            };

            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, qty, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(item.qty)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(order_id, total, item_count = req.items.len(), "订单创建成功");

        Ok(OrderSummaryDto {
            id: order_id,
            payment_reference: Some(req.payment_reference.clone()),
            total,
            status,
            payment_status,
            item_count: req.items.len() as i64,
            points_balance,
        })
    }

    /// 更新订单状态（管理员操作）
    ///
    /// 在单个事务内锁定订单行，校验流转合法性后写入；
    /// 首次进入 delivered 且支付核验通过、total > 0 时结算积分：
    /// 顾客积分累加饮品数量，同时把本单结算的积分写入订单（只此一次）。
    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: i64, target: OrderStatus) -> Result<OrderDto> {
        let mut tx = self.pool.begin().await?;

        let order = self.lock_order(&mut tx, order_id).await?;

        validate_transition(order.status, order.payment_status, target)?;

        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(target)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if awards_points(order.status, target, order.payment_status, order.total) {
            let items: Vec<(ProductCategory, i32)> = sqlx::query_as(
                "SELECT p.category, oi.qty
                 FROM order_items oi
                 JOIN products p ON p.id = oi.product_id
                 WHERE oi.order_id = $1",
            )
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;
            let drink_qty = drink_quantity(&items);

            sqlx::query("UPDATE users SET points = points + $1, updated_at = NOW() WHERE id = $2")
                .bind(drink_qty)
                .bind(order.user_id)
                .execute(&mut *tx)
                .await?;

            sqlx::query("UPDATE orders SET points = $1 WHERE id = $2")
                .bind(drink_qty)
                .bind(order_id)
                .execute(&mut *tx)
                .await?;

            info!(order_id, user_id = order.user_id, drink_qty, "订单送达，积分已结算");
        }

        tx.commit().await?;

        info!(order_id, from = ?order.status, to = ?target, "订单状态已更新");

        self.fetch_order(order_id).await
    }

    /// 更新支付核验状态（管理员操作）
    ///
    /// 核验未通过时自动把订单置为 cancelled（已取消的不重复写）。
    #[instrument(skip(self))]
    pub async fn update_payment_status(
        &self,
        order_id: i64,
        payment_status: PaymentStatus,
    ) -> Result<OrderDto> {
        let mut tx = self.pool.begin().await?;

        let order = self.lock_order(&mut tx, order_id).await?;

        sqlx::query("UPDATE orders SET payment_status = $1, updated_at = NOW() WHERE id = $2")
            .bind(payment_status)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        if payment_status == PaymentStatus::NotVerified && order.status != OrderStatus::Cancelled {
            sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
                .bind(OrderStatus::Cancelled)
                .bind(order_id)
                .execute(&mut *tx)
                .await?;

            info!(order_id, prior_status = ?order.status, "支付核验未通过，订单自动取消");
        }

        tx.commit().await?;

        info!(order_id, payment_status = ?payment_status, "支付核验状态已更新");

        self.fetch_order(order_id).await
    }

    /// 查询单个订单详情（含行项目）
    pub async fn fetch_order(&self, order_id: i64) -> Result<OrderDto> {
        let order: Option<Order> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        let order = order.ok_or(ApiError::OrderNotFound(order_id))?;

        let mut dtos = attach_items(&self.pool, vec![order]).await?;
        Ok(dtos.remove(0))
    }

    /// 查询某顾客的全部订单，按时间倒序
    pub async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderDto>> {
        let orders: Vec<Order> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        attach_items(&self.pool, orders).await
    }

    /// 查询全部订单（管理端），附带顾客信息，按时间倒序
    pub async fn fetch_all_orders(&self) -> Result<Vec<OrderDto>> {
        #[derive(sqlx::FromRow)]
        struct OrderWithCustomer {
            #[sqlx(flatten)]
            order: Order,
            customer_name: String,
            customer_email: String,
        }

        let rows: Vec<OrderWithCustomer> = sqlx::query_as(
            "SELECT o.id, o.user_id, o.total, o.status, o.payment_status, o.payment_reference,
                    o.delivery_location, o.points, o.created_at, o.updated_at,
                    u.name AS customer_name, u.email AS customer_email
             FROM orders o
             JOIN users u ON u.id = o.user_id
             ORDER BY o.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let customers: Vec<(String, String)> = rows
            .iter()
            .map(|r| (r.customer_name.clone(), r.customer_email.clone()))
            .collect();
        let orders: Vec<Order> = rows.into_iter().map(|r| r.order).collect();

        let mut dtos = attach_items(&self.pool, orders).await?;
        for (dto, (name, email)) in dtos.iter_mut().zip(customers) {
            dto.customer_name = Some(name);
            dto.customer_email = Some(email);
        }

        Ok(dtos)
    }

    /// 锁定订单行，订单不存在返回 404
    async fn lock_order(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: i64,
    ) -> Result<Order> {
        let order: Option<Order> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?;

        order.ok_or(ApiError::OrderNotFound(order_id))
    }
}

/// 批量装配订单行项目，保持传入顺序
async fn attach_items(pool: &PgPool, orders: Vec<Order>) -> Result<Vec<OrderDto>> {
    #[derive(sqlx::FromRow)]
    struct ItemRow {
        order_id: i64,
        id: i64,
        product_id: i64,
        qty: i32,
        price: f64,
        product_name: String,
        category: ProductCategory,
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();

    let rows: Vec<ItemRow> = if order_ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as(
            "SELECT oi.order_id, oi.id, oi.product_id, oi.qty, oi.price,
                    p.name AS product_name, p.category
             FROM order_items oi
             JOIN products p ON p.id = oi.product_id
             WHERE oi.order_id = ANY($1)
             ORDER BY oi.id",
        )
        .bind(&order_ids)
        .fetch_all(pool)
        .await?
    };

    let mut dtos: Vec<OrderDto> = orders
        .into_iter()
        .map(|order| OrderDto {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            status: order.status,
            payment_status: order.payment_status,
            payment_reference: order.payment_reference,
            delivery_location: order.delivery_location,
            points: order.points,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: Vec::new(),
            customer_name: None,
            customer_email: None,
        })
        .collect();

    for row in rows {
        if let Some(dto) = dtos.iter_mut().find(|d| d.id == row.order_id) {
            dto.items.push(OrderItemDto {
                id: row.id,
                product_id: row.product_id,
                qty: row.qty,
                price: row.price,
                product_name: row.product_name,
                category: row.category,
            });
        }
    }

    Ok(dtos)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- 状态机流转校验 ----

    #[test]
    fn test_normal_forward_transitions_allowed() {
        let forward = [
            (OrderStatus::Pending, OrderStatus::Approved),
            (OrderStatus::Approved, OrderStatus::Preparing),
            (OrderStatus::Preparing, OrderStatus::Ready),
        ];
        for (from, to) in forward {
            assert!(
                validate_transition(from, PaymentStatus::PendingVerification, to).is_ok(),
                "{from:?} -> {to:?} 应当放行"
            );
        }
    }

    #[test]
    fn test_delivery_requires_verified_payment() {
        // 未核验 / 核验未通过都不允许送达
        for payment in [PaymentStatus::PendingVerification, PaymentStatus::NotVerified] {
            let err = validate_transition(OrderStatus::Ready, payment, OrderStatus::Delivered)
                .unwrap_err();
            assert_eq!(
                err.status_code(),
                axum::http::StatusCode::BAD_REQUEST,
                "payment={payment:?}"
            );
        }

        assert!(validate_transition(
            OrderStatus::Ready,
            PaymentStatus::Verified,
            OrderStatus::Delivered
        )
        .is_ok());
    }

    #[test]
    fn test_rejected_payment_only_allows_pending_or_cancelled() {
        let blocked = [
            OrderStatus::Approved,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
        ];
        for target in blocked {
            let err =
                validate_transition(OrderStatus::Pending, PaymentStatus::NotVerified, target)
                    .unwrap_err();
            assert_eq!(err.error_code(), "PAYMENT_REJECTED", "target={target:?}");
        }

        assert!(validate_transition(
            OrderStatus::Pending,
            PaymentStatus::NotVerified,
            OrderStatus::Cancelled
        )
        .is_ok());
        assert!(validate_transition(
            OrderStatus::Pending,
            PaymentStatus::NotVerified,
            OrderStatus::Pending
        )
        .is_ok());
    }

    #[test]
    fn test_cancel_reachable_from_any_non_terminal() {
        for from in [
            OrderStatus::Pending,
            OrderStatus::Approved,
            OrderStatus::Preparing,
            OrderStatus::Ready,
        ] {
            assert!(
                validate_transition(from, PaymentStatus::PendingVerification, OrderStatus::Cancelled)
                    .is_ok(),
                "{from:?} -> cancelled 应当放行"
            );
        }
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        let err = validate_transition(
            OrderStatus::Cancelled,
            PaymentStatus::Verified,
            OrderStatus::Pending,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "TERMINAL_STATUS");

        let err = validate_transition(
            OrderStatus::Delivered,
            PaymentStatus::Verified,
            OrderStatus::Ready,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "TERMINAL_STATUS");
    }

    #[test]
    fn test_same_status_resave_is_idempotent() {
        // 重复保存 delivered 不报错（积分结算由 awards_points 单独拦截）
        assert!(validate_transition(
            OrderStatus::Delivered,
            PaymentStatus::Verified,
            OrderStatus::Delivered
        )
        .is_ok());
        assert!(validate_transition(
            OrderStatus::Cancelled,
            PaymentStatus::NotVerified,
            OrderStatus::Cancelled
        )
        .is_ok());
    }

    // ---- 积分结算触发条件 ----

    #[test]
    fn test_awards_points_on_first_delivery() {
        assert!(awards_points(
            OrderStatus::Ready,
            OrderStatus::Delivered,
            PaymentStatus::Verified,
            10.0
        ));
    }

    #[test]
    fn test_no_points_on_redelivery() {
        // 幂等重放：prior 已是 delivered 时不再结算
        assert!(!awards_points(
            OrderStatus::Delivered,
            OrderStatus::Delivered,
            PaymentStatus::Verified,
            10.0
        ));
    }

    #[test]
    fn test_no_points_without_verified_payment() {
        assert!(!awards_points(
            OrderStatus::Ready,
            OrderStatus::Delivered,
            PaymentStatus::PendingVerification,
            10.0
        ));
    }

    #[test]
    fn test_no_points_for_free_drink_order() {
        // 免费饮品订单 total = 0，送达不产生新积分
        assert!(!awards_points(
            OrderStatus::Approved,
            OrderStatus::Delivered,
            PaymentStatus::Verified,
            0.0
        ));
    }

    #[test]
    fn test_no_points_on_non_delivery_transitions() {
        assert!(!awards_points(
            OrderStatus::Pending,
            OrderStatus::Approved,
            PaymentStatus::Verified,
            10.0
        ));
    }

    // ---- 饮品计数 ----

    #[test]
    fn test_drink_quantity_excludes_bakery() {
        // 2 杯热饮 + 1 个烘焙 -> 2 分
        let items = [
            (ProductCategory::Hot, 2),
            (ProductCategory::Bakery, 1),
        ];
        assert_eq!(drink_quantity(&items), 2);
    }

    #[test]
    fn test_drink_quantity_sums_all_drink_categories() {
        let items = [
            (ProductCategory::Hot, 1),
            (ProductCategory::Ice, 2),
            (ProductCategory::Frappe, 3),
            (ProductCategory::Bakery, 10),
        ];
        assert_eq!(drink_quantity(&items), 6);
    }

    #[test]
    fn test_drink_quantity_empty() {
        assert_eq!(drink_quantity(&[]), 0);
        assert_eq!(drink_quantity(&[(ProductCategory::Bakery, 5)]), 0);
    }
}
