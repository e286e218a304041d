//! 请求 DTO 定义
//!
//! 所有 REST API 的请求参数和请求体结构

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{OrderStatus, PaymentStatus};

/// 注册请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "姓名长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "密码长度必须在6-72个字符之间"))]
    pub password: String,
}

/// 登录请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 1, message = "密码不能为空"))]
    pub password: String,
}

/// 创建管理员请求（已有管理员操作）
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    #[validate(length(min = 1, max = 100, message = "姓名长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 6, max = 72, message = "密码长度必须在6-72个字符之间"))]
    pub password: String,
}

/// 加入购物车请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub user_id: i64,
    pub product_id: i64,
    #[validate(range(min = 1, message = "数量必须大于 0"))]
    pub qty: i32,
}

/// 修改购物车条目数量请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1, message = "数量必须大于 0"))]
    pub qty: i32,
}

/// 订单行项目
///
/// price 缺省时由服务端按当前商品价格补齐快照
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: i64,
    pub qty: i32,
    pub price: Option<f64>,
}

/// 创建订单请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: i64,
    #[validate(length(min = 1, message = "订单必须包含至少一个商品"))]
    pub items: Vec<OrderItemRequest>,
    pub total: f64,
    /// 配送位置，原样保存为 JSON 文本
    pub delivery_location: Option<serde_json::Value>,
    #[validate(length(min = 1, message = "支付参考号不能为空"))]
    pub payment_reference: String,
    /// 兼容旧客户端：允许显式传入初始支付状态
    pub payment_status: Option<PaymentStatus>,
    /// 免费饮品订单：用 10 积分兑换，total 强制为 0
    #[serde(default)]
    pub is_free_drink: bool,
}

/// 更新订单状态请求（管理员）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// 更新支付核验状态请求（管理员）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// 顾客直接兑换免费饮品请求（不产生订单的旧流程）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimFreeDrinkRequest {
    pub user_id: i64,
}

/// 联系表单请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100, message = "姓名长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    #[validate(length(min = 1, max = 2000, message = "留言长度必须在1-2000个字符之间"))]
    pub message: String,
}
