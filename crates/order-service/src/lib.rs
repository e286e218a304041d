//! 咖啡店在线点单服务
//!
//! 提供菜单浏览、购物车、订单结算与人工支付核验、积分与免费饮品兑换、
//! 管理后台等 REST API。
//!
//! ## 核心功能
//!
//! - **商品目录**：菜单浏览与首页推荐，公开接口
//! - **购物车**：按用户惰性创建，条目去重累加
//! - **订单流转**：pending → approved → preparing → ready → delivered，
//!   任一非终态可取消，交付前必须完成支付核验
//! - **积分体系**：订单首次交付时按饮品数量累积积分，10 分兑换一杯免费饮品
//! - **管理后台**：仪表盘统计、顾客管理、订单审核、积分操作
//!
//! ## 模块结构
//!
//! - `models`: 实体模型与状态枚举
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `auth`: JWT 与密码哈希
//! - `middleware`: 认证中间件
//! - `service`: 订单状态机与积分事务逻辑
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由配置
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据验证：validator
//! - 序列化：serde (camelCase)

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;

// 重新导出核心类型
pub use dto::{
    ApiResponse, CreateOrderRequest, DashboardStats, LoginResponse, OrderDto, OrderSummaryDto,
    PointsBalanceDto,
};
pub use error::{ApiError, Result};
pub use models::{Order, OrderStatus, PaymentStatus, Product, ProductCategory, User, UserRole};
pub use service::{loyalty::FREE_DRINK_COST, OrderWorkflow};
