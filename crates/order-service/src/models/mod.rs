//! 实体模型模块
//!
//! 与数据库表一一对应的结构体和共享枚举

pub mod cart;
pub mod enums;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem};
pub use enums::{OrderStatus, PaymentStatus, ProductCategory, UserRole};
pub use order::{Order, OrderItem};
pub use product::Product;
pub use user::User;
