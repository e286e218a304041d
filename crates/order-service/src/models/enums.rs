//! 订单服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化，
//! 数据库和 API 统一使用 snake_case 字符串。

use serde::{Deserialize, Serialize};

/// 订单状态
///
/// 正常流转：pending -> approved -> preparing -> ready -> delivered，
/// cancelled 可以从任意非终态进入。delivered 和 cancelled 为终态。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum OrderStatus {
    /// 待处理 - 等待支付核验与接单
    #[default]
    Pending,
    /// 已接单 - 支付核验通过，进入制作队列
    Approved,
    /// 制作中
    Preparing,
    /// 待取餐
    Ready,
    /// 已送达 - 终态，触发积分结算
    Delivered,
    /// 已取消 - 终态
    Cancelled,
}

impl OrderStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

/// 支付核验状态
///
/// 顾客线下转账后提交支付参考号，由管理员人工核验
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum PaymentStatus {
    /// 待核验
    #[default]
    PendingVerification,
    /// 核验通过
    Verified,
    /// 核验未通过 - 订单自动取消
    NotVerified,
}

/// 商品分类
///
/// 数据库存储与 API 均使用首字母大写的历史值（Hot/Ice/Frappe/Bakery）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum ProductCategory {
    Hot,
    Ice,
    Frappe,
    Bakery,
}

impl ProductCategory {
    /// 是否计入积分的饮品类目（烘焙类不计分）
    pub fn is_drink(&self) -> bool {
        matches!(self, Self::Hot | Self::Ice | Self::Frappe)
    }
}

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Ready.is_terminal());
    }

    #[test]
    fn test_order_status_serde_snake_case() {
        assert_eq!(serde_json::to_value(OrderStatus::Pending).unwrap(), json!("pending"));
        assert_eq!(serde_json::to_value(OrderStatus::Delivered).unwrap(), json!("delivered"));
        let parsed: OrderStatus = serde_json::from_value(json!("preparing")).unwrap();
        assert_eq!(parsed, OrderStatus::Preparing);
    }

    #[test]
    fn test_payment_status_serde() {
        assert_eq!(
            serde_json::to_value(PaymentStatus::PendingVerification).unwrap(),
            json!("pending_verification")
        );
        assert_eq!(
            serde_json::to_value(PaymentStatus::NotVerified).unwrap(),
            json!("not_verified")
        );
        let parsed: PaymentStatus = serde_json::from_value(json!("verified")).unwrap();
        assert_eq!(parsed, PaymentStatus::Verified);
    }

    #[test]
    fn test_drink_categories() {
        assert!(ProductCategory::Hot.is_drink());
        assert!(ProductCategory::Ice.is_drink());
        assert!(ProductCategory::Frappe.is_drink());
        assert!(!ProductCategory::Bakery.is_drink());
    }

    #[test]
    fn test_product_category_wire_format() {
        // API 与数据库沿用历史上的首字母大写值
        assert_eq!(serde_json::to_value(ProductCategory::Hot).unwrap(), json!("Hot"));
        assert_eq!(serde_json::to_value(ProductCategory::Bakery).unwrap(), json!("Bakery"));
        let parsed: ProductCategory = serde_json::from_value(json!("Frappe")).unwrap();
        assert_eq!(parsed, ProductCategory::Frappe);
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(serde_json::to_value(UserRole::Admin).unwrap(), json!("admin"));
        let parsed: UserRole = serde_json::from_value(json!("customer")).unwrap();
        assert_eq!(parsed, UserRole::Customer);
    }
}
