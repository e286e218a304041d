//! 统一错误处理模块
//!
//! 定义基础设施层共享的错误类型，使用 thiserror 提供良好的错误信息。
//! 业务层（订单服务）有自己的错误类型并负责 HTTP 映射。

use thiserror::Error;

/// 基础设施错误类型
#[derive(Debug, Error)]
pub enum CoffeeError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("迁移失败: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),

    #[error("记录未找到: {entity} id={id}")]
    NotFound { entity: String, id: String },

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, CoffeeError>;

impl CoffeeError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::Migration(_) => "MIGRATION_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = CoffeeError::NotFound {
            entity: "Order".to_string(),
            id: "123".to_string(),
        };
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_is_retryable() {
        let db_err = CoffeeError::Database(sqlx::Error::PoolTimedOut);
        assert!(db_err.is_retryable());

        let not_found = CoffeeError::NotFound {
            entity: "Order".to_string(),
            id: "123".to_string(),
        };
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn test_display_contains_context() {
        let err = CoffeeError::NotFound {
            entity: "Customer".to_string(),
            id: "42".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Customer"));
        assert!(msg.contains("42"));
    }
}
