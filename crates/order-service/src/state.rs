//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use sqlx::PgPool;

use crate::auth::JwtManager;
use crate::service::OrderWorkflow;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池
    pub pool: PgPool,
    /// JWT Token 管理器
    pub jwt_manager: JwtManager,
    /// 订单工作流服务
    pub workflow: OrderWorkflow,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pool: PgPool, jwt_manager: JwtManager) -> Self {
        let workflow = OrderWorkflow::new(pool.clone());
        Self {
            pool,
            jwt_manager,
            workflow,
        }
    }
}
