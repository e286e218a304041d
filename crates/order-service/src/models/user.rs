//! 用户实体模型

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::enums::UserRole;

/// 用户（顾客或管理员）
///
/// 密码哈希不参与序列化，避免意外泄露到 API 响应
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    /// 积分累计，数据库 CHECK 约束保证非负
    pub points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            role: UserRole::Customer,
            points: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["points"], 5);
        assert_eq!(json["role"], "customer");
    }
}
