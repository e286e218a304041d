//! 积分兑换服务
//!
//! 免费饮品兑换的唯一扣分入口。历史上"直接兑换"和"免费饮品下单"
//! 两条路径各自实现过一遍扣分逻辑，这里合并为一个函数，
//! 由调用方决定是否同时生成订单。

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use crate::error::{ApiError, Result};

/// 兑换一杯免费饮品需要的积分
pub const FREE_DRINK_COST: i32 = 10;

/// 在已开启的事务内兑换一杯免费饮品，返回扣减后的余额
///
/// `SELECT ... FOR UPDATE` 锁定顾客行：并发兑换时两个请求都可能通过
/// 余额检查，不加锁会把余额扣成负数
pub async fn redeem_free_drink(tx: &mut Transaction<'_, Postgres>, user_id: i64) -> Result<i32> {
    let balance: Option<i32> = sqlx::query_scalar(
        "SELECT points FROM users WHERE id = $1 AND role = 'customer' FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;

    let balance = balance.ok_or(ApiError::CustomerNotFound(user_id))?;

    if balance < FREE_DRINK_COST {
        return Err(ApiError::InsufficientPoints {
            required: FREE_DRINK_COST,
            balance,
        });
    }

    let new_balance: i32 = sqlx::query_scalar(
        "UPDATE users SET points = points - $1, updated_at = NOW() WHERE id = $2 RETURNING points",
    )
    .bind(FREE_DRINK_COST)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    info!(user_id, balance, new_balance, "免费饮品兑换成功");

    Ok(new_balance)
}

/// 独立事务兑换：给不产生订单的直接兑换端点使用
#[instrument(skip(pool))]
pub async fn claim_free_drink(pool: &PgPool, user_id: i64) -> Result<i32> {
    let mut tx = pool.begin().await?;
    let new_balance = redeem_free_drink(&mut tx, user_id).await?;
    tx.commit().await?;
    Ok(new_balance)
}

/// 将顾客积分清零（管理员操作），返回清零前的余额
#[instrument(skip(pool))]
pub async fn reset_points(pool: &PgPool, user_id: i64) -> Result<i32> {
    let mut tx = pool.begin().await?;

    let previous: Option<i32> = sqlx::query_scalar(
        "SELECT points FROM users WHERE id = $1 AND role = 'customer' FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let previous = previous.ok_or(ApiError::CustomerNotFound(user_id))?;

    sqlx::query("UPDATE users SET points = 0, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(user_id, previous, "顾客积分已清零");
    Ok(previous)
}
