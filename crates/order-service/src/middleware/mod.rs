//! HTTP 中间件模块

pub mod auth;

pub use auth::{auth_middleware, ensure_self_or_admin};
