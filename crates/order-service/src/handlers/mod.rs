//! HTTP 处理器模块

pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod order;
pub mod product;
