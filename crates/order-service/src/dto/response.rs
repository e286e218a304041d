//! 响应 DTO 定义
//!
//! 所有 REST API 的响应体结构，统一 camelCase 输出

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{OrderStatus, PaymentStatus, ProductCategory, User, UserRole};

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 创建成功响应（无数据）
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: None,
        }
    }
}

/// 下单结果摘要
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryDto {
    pub id: i64,
    pub payment_reference: Option<String>,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub item_count: i64,
    /// 免费饮品订单扣减后的积分余额，普通订单不返回，
    /// 调用方无需再发一次查询即可刷新本地状态
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_balance: Option<i32>,
}

/// 订单行项目（含商品信息）
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: i64,
    pub product_id: i64,
    pub qty: i32,
    pub price: f64,
    pub product_name: String,
    pub category: ProductCategory,
}

/// 订单详情
///
/// 管理端列表额外带上顾客信息，顾客自查时不返回
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: i64,
    pub user_id: i64,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub delivery_location: Option<String>,
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

/// 购物车条目（含商品信息）
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub qty: i32,
    pub product_name: String,
    pub price: f64,
    pub category: ProductCategory,
    pub img: Option<String>,
}

/// 顾客信息（管理端视图）
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

/// 登录/注册返回的用户信息
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub points: i32,
}

impl From<User> for AuthUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            points: user.points,
        }
    }
}

/// 登录响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Token 过期时间（Unix 秒）
    pub expires_at: i64,
    pub user: AuthUserDto,
}

/// 积分余额
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsBalanceDto {
    pub user_id: i64,
    pub points: i32,
}

/// 管理端数据看板
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    /// 当月非取消且进入制作流程的订单流水
    pub monthly_income: f64,
    /// 按历史销量排序的前 5 个商品
    pub best_selling_products: Vec<BestSellerDto>,
}

/// 畅销商品（仪表盘）
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BestSellerDto {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub img: Option<String>,
    /// 该商品在所有订单中的累计销量
    pub total_qty: i64,
}

/// 管理员账号（管理端视图）
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminAccountDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_response_success() {
        let resp = ApiResponse::success(42);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], json!(true));
        assert_eq!(json["code"], json!("SUCCESS"));
        assert_eq!(json["data"], json!(42));
    }

    #[test]
    fn test_api_response_empty_omits_data() {
        let resp: ApiResponse<()> = ApiResponse::success_empty("操作成功");
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_dashboard_stats_camel_case() {
        let stats = DashboardStats {
            total_customers: 8,
            total_orders: 20,
            pending_orders: 2,
            monthly_income: 128.5,
            best_selling_products: vec![BestSellerDto {
                id: 3,
                name: "拿铁".to_string(),
                price: 4.5,
                img: None,
                total_qty: 42,
            }],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalCustomers"], json!(8));
        assert_eq!(json["monthlyIncome"], json!(128.5));
        assert_eq!(json["bestSellingProducts"][0]["name"], json!("拿铁"));
        assert_eq!(json["bestSellingProducts"][0]["totalQty"], json!(42));
    }

    #[test]
    fn test_order_summary_camel_case() {
        let dto = OrderSummaryDto {
            id: 1,
            payment_reference: Some("PAY-001".to_string()),
            total: 12.5,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::PendingVerification,
            item_count: 3,
            points_balance: None,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["paymentReference"], json!("PAY-001"));
        assert_eq!(json["paymentStatus"], json!("pending_verification"));
        assert_eq!(json["itemCount"], json!(3));
        // 普通订单不带积分余额字段
        assert!(json.get("pointsBalance").is_none());
    }

    #[test]
    fn test_free_drink_summary_includes_balance() {
        let dto = OrderSummaryDto {
            id: 2,
            payment_reference: Some("FREE-DRINK".to_string()),
            total: 0.0,
            status: OrderStatus::Approved,
            payment_status: PaymentStatus::Verified,
            item_count: 1,
            points_balance: Some(0),
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["pointsBalance"], json!(0));
        assert_eq!(json["status"], json!("approved"));
        assert_eq!(json["paymentStatus"], json!("verified"));
    }

    #[test]
    fn test_order_dto_omits_absent_customer() {
        let dto = OrderDto {
            id: 1,
            user_id: 2,
            total: 10.0,
            status: OrderStatus::Delivered,
            payment_status: PaymentStatus::Verified,
            payment_reference: None,
            delivery_location: None,
            points: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![],
            customer_name: None,
            customer_email: None,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("customerName").is_none());
        assert_eq!(json["points"], json!(2));
    }
}
