//! 订单服务错误类型定义
//!
//! 业务规则违反、资源缺失、认证失败统一在这里映射到 HTTP 状态码和错误码

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::models::OrderStatus;

/// 订单服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 认证错误
    #[error("未授权: {0}")]
    Unauthorized(String),
    #[error("禁止访问: {0}")]
    Forbidden(String),
    #[error("邮箱或密码错误")]
    InvalidCredentials,
    #[error("该邮箱已注册")]
    EmailAlreadyRegistered,

    // 验证错误
    #[error("参数验证失败: {0}")]
    Validation(String),

    // 资源不存在
    #[error("订单不存在: {0}")]
    OrderNotFound(i64),
    #[error("顾客不存在: {0}")]
    CustomerNotFound(i64),
    #[error("商品不存在: {0}")]
    ProductNotFound(i64),
    #[error("购物车条目不存在: {0}")]
    CartItemNotFound(i64),

    // 业务规则错误
    #[error("支付核验未通过的订单只能保持 pending 或转为 cancelled，不允许转为 {0:?}")]
    PaymentRejectedTransition(OrderStatus),
    #[error("支付尚未核验通过，订单不能标记为已送达")]
    DeliveryRequiresVerifiedPayment,
    #[error("订单已处于终态 {0:?}，不能再变更状态")]
    TerminalStatus(OrderStatus),
    #[error("积分不足: 兑换需要 {required} 分，当前余额 {balance} 分")]
    InsufficientPoints { required: i32, balance: i32 },

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,

            Self::Validation(_)
            | Self::EmailAlreadyRegistered
            | Self::PaymentRejectedTransition(_)
            | Self::DeliveryRequiresVerifiedPayment
            | Self::TerminalStatus(_)
            | Self::InsufficientPoints { .. } => StatusCode::BAD_REQUEST,

            Self::OrderNotFound(_)
            | Self::CustomerNotFound(_)
            | Self::ProductNotFound(_)
            | Self::CartItemNotFound(_) => StatusCode::NOT_FOUND,

            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::OrderNotFound(_) => "ORDER_NOT_FOUND",
            Self::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::CartItemNotFound(_) => "CART_ITEM_NOT_FOUND",
            Self::PaymentRejectedTransition(_) => "PAYMENT_REJECTED",
            Self::DeliveryRequiresVerifiedPayment => "PAYMENT_NOT_VERIFIED",
            Self::TerminalStatus(_) => "TERMINAL_STATUS",
            Self::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志，防止信息泄露
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从共享基础设施错误转换
impl From<coffee_shared::error::CoffeeError> for ApiError {
    fn from(err: coffee_shared::error::CoffeeError) -> Self {
        match err {
            coffee_shared::error::CoffeeError::Database(e) => Self::Database(e),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    /// 构造所有错误变体及其期望的 (StatusCode, error_code) 映射。
    /// 使用表驱动方式避免逐个变体写重复断言，同时保证新增变体时只需在一处维护。
    fn all_error_variants() -> Vec<(ApiError, StatusCode, &'static str)> {
        vec![
            (ApiError::Unauthorized("token expired".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (ApiError::Forbidden("admin only".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            (ApiError::EmailAlreadyRegistered, StatusCode::BAD_REQUEST, "EMAIL_ALREADY_REGISTERED"),
            (ApiError::Validation("items is empty".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ApiError::OrderNotFound(10), StatusCode::NOT_FOUND, "ORDER_NOT_FOUND"),
            (ApiError::CustomerNotFound(20), StatusCode::NOT_FOUND, "CUSTOMER_NOT_FOUND"),
            (ApiError::ProductNotFound(30), StatusCode::NOT_FOUND, "PRODUCT_NOT_FOUND"),
            (ApiError::CartItemNotFound(40), StatusCode::NOT_FOUND, "CART_ITEM_NOT_FOUND"),
            // 业务规则违反统一 400，调用方修正后可重试
            (ApiError::PaymentRejectedTransition(OrderStatus::Preparing), StatusCode::BAD_REQUEST, "PAYMENT_REJECTED"),
            (ApiError::DeliveryRequiresVerifiedPayment, StatusCode::BAD_REQUEST, "PAYMENT_NOT_VERIFIED"),
            (ApiError::TerminalStatus(OrderStatus::Cancelled), StatusCode::BAD_REQUEST, "TERMINAL_STATUS"),
            (ApiError::InsufficientPoints { required: 10, balance: 9 }, StatusCode::BAD_REQUEST, "INSUFFICIENT_POINTS"),
            (ApiError::Internal("unexpected state".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    /// 确保每个错误变体都映射到正确的 HTTP 状态码。
    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, label) in all_error_variants() {
            assert_eq!(error.status_code(), expected_status, "状态码不匹配: variant={label}");
        }
    }

    /// 错误码是 API 契约的一部分，客户端用它做条件分支，必须逐一锁定。
    #[test]
    fn test_all_variants_error_code() {
        for (error, _status, expected_code) in all_error_variants() {
            assert_eq!(error.error_code(), expected_code, "错误码不匹配: expected={expected_code}");
        }
    }

    /// Display 输出直接作为 API 响应的 message 字段返回给用户，
    /// 必须包含关键上下文（如 ID、余额），否则用户无法定位问题。
    #[test]
    fn test_display_contains_context() {
        assert!(ApiError::OrderNotFound(42).to_string().contains("42"));
        assert!(ApiError::CustomerNotFound(7).to_string().contains("7"));
        assert!(ApiError::Validation("paymentReference 缺失".into())
            .to_string()
            .contains("paymentReference"));

        let insufficient = ApiError::InsufficientPoints { required: 10, balance: 9 };
        let msg = insufficient.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("9"));
    }

    /// IntoResponse 是错误到 HTTP 响应的最终出口，
    /// 必须验证状态码正确、响应体结构完整（success/code/message/data 四字段）。
    #[tokio::test]
    async fn test_into_response_body_structure() {
        for (error, expected_status, expected_code) in all_error_variants() {
            let label = format!("{:?}", error);
            let response = error.into_response();

            assert_eq!(response.status(), expected_status, "响应状态码不匹配: {label}");

            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("读取响应体失败");
            let body: serde_json::Value =
                serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");

            assert_eq!(body["success"], json!(false), "success 字段应为 false: {label}");
            assert_eq!(body["code"], json!(expected_code), "code 字段不匹配: {label}");
            assert!(!body["message"].as_str().unwrap_or("").is_empty(), "message 不应为空: {label}");
            assert!(body["data"].is_null(), "data 字段应为 null: {label}");
        }
    }

    /// 系统级错误的响应消息不应泄露内部细节，只返回通用提示。
    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        let error = ApiError::Internal("stack overflow at module X".into());
        let response = error.into_response();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        let message = body["message"].as_str().unwrap();

        assert!(!message.contains("stack overflow"), "系统错误消息泄露了内部细节: {message}");
        assert!(message.contains("服务内部错误"));
    }

    /// validator 是请求参数校验的统一入口，转换必须把字段级错误信息带入，
    /// 否则用户无法知道哪个字段校验失败。
    #[test]
    fn test_from_validation_errors() {
        use validator::{ValidationError, ValidationErrors};

        let mut errors = ValidationErrors::new();
        let mut field_error = ValidationError::new("length");
        field_error.message = Some("支付参考号不能为空".into());
        errors.add("paymentReference", field_error);

        let api_error: ApiError = errors.into();
        match &api_error {
            ApiError::Validation(msg) => {
                assert!(msg.contains("paymentReference"), "转换后应保留字段名: {msg}");
            }
            other => panic!("期望 Validation 变体，实际: {:?}", other),
        }
        assert_eq!(api_error.status_code(), StatusCode::BAD_REQUEST);
    }

    /// sqlx::Error 通过 #[from] 自动派生 From，验证转换后类型和状态码正确
    #[test]
    fn test_from_sqlx_error() {
        let api_error = ApiError::from(sqlx::Error::RowNotFound);
        assert!(matches!(api_error, ApiError::Database(_)));
        assert_eq!(api_error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error_code(), "DATABASE_ERROR");
    }
}
