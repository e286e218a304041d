//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, state::AppState};

/// 构建认证路由（注册、登录公开，/auth/me 需要 Token）
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::current_user))
}

/// 构建商品目录路由（公开）
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(handlers::product::list_products))
        .route("/products/featured", get(handlers::product::featured_products))
        .route("/products/{id}", get(handlers::product::get_product))
}

/// 构建购物车路由（需要登录，只能操作本人购物车）
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart/add", post(handlers::cart::add_to_cart))
        .route("/cart/item/{id}", put(handlers::cart::update_cart_item))
        .route("/cart/item/{id}", delete(handlers::cart::remove_cart_item))
        .route("/cart/clear/{userId}", delete(handlers::cart::clear_cart))
        .route("/cart/{userId}", get(handlers::cart::get_cart))
}

/// 构建订单路由（需要登录）
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(handlers::order::create_order))
        .route("/orders/user/{userId}", get(handlers::order::list_user_orders))
        .route(
            "/orders/claim-free-drink",
            post(handlers::order::claim_free_drink),
        )
}

/// 构建联系我们路由（公开）
pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(handlers::contact::submit_contact))
}

/// 构建管理后台路由（需要管理员角色）
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::admin::dashboard))
        .route("/admins", get(handlers::admin::list_admins))
        .route("/customers", get(handlers::admin::list_customers))
        .route("/orders", get(handlers::admin::list_orders))
        .route(
            "/orders/{id}/status",
            put(handlers::admin::update_order_status),
        )
        .route(
            "/orders/{id}/payment-status",
            put(handlers::admin::update_payment_status),
        )
        .route(
            "/customers/{id}/reset-points",
            put(handlers::admin::reset_points),
        )
        .route(
            "/customers/{id}/claim-free-drink",
            put(handlers::admin::claim_free_drink),
        )
        .route("/create-admin", post(handlers::admin::create_admin))
}

/// 组装 /api 下的全部路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(product_routes())
        .merge(cart_routes())
        .merge(order_routes())
        .merge(contact_routes())
        .nest("/admin", admin_routes())
}
