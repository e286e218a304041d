//! 咖啡店在线点单服务入口
//!
//! 加载配置、初始化日志与数据库、执行迁移后启动 HTTP 服务。

use axum::{http::HeaderValue, middleware, routing::get, Json, Router};
use coffee_order_service::{
    auth::{JwtConfig, JwtManager},
    middleware::auth_middleware,
    routes,
    state::AppState,
};
use coffee_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/default.toml + 环境覆盖 + COFFEE_ 前缀环境变量
    let config = AppConfig::load("coffee-order-service").unwrap_or_default();

    observability::init(&config.observability)?;

    info!("Starting coffee-order-service on {}", config.server_addr());

    let db = Database::connect(&config.database).await?;

    // 启动时自动执行数据库迁移，幂等
    sqlx::migrate!("./migrations").run(db.pool()).await?;
    info!("Database migrations applied");

    // JWT 密钥配置：生产环境必须通过环境变量注入，开发环境使用默认值
    let jwt_secret = std::env::var("COFFEE_JWT_SECRET").unwrap_or_else(|_| {
        if config.is_production() {
            panic!("COFFEE_JWT_SECRET must be set in production environment");
        }
        warn!("Using default JWT secret - set COFFEE_JWT_SECRET for production");
        JwtConfig::default().secret
    });

    let jwt_expires = std::env::var("COFFEE_JWT_EXPIRES_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or_else(|| JwtConfig::default().expires_in_secs);

    let jwt_config = JwtConfig {
        secret: jwt_secret,
        expires_in_secs: jwt_expires,
        issuer: "coffee-order-service".to_string(),
    };

    let state = AppState::new(db.pool().clone(), JwtManager::new(jwt_config));

    // CORS 配置：通过 COFFEE_CORS_ORIGINS 环境变量控制允许的来源
    let allowed_origins = std::env::var("COFFEE_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    let cors = if allowed_origins == "*" {
        if config.is_production() {
            warn!("COFFEE_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let app = Router::new()
        .nest("/api", routes::api_routes())
        .route("/health", get(health_check))
        .route(
            "/ready",
            get({
                let db_for_ready = db;
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .layer(cors)
        // 认证中间件：验证 JWT Token 并注入 Claims
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 优雅关闭：收到 SIGTERM 或 Ctrl+C 时停止接收新连接并等待已有请求完成
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

/// 存活探针：服务进程正常即返回 ok
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "coffee-order-service"
    }))
}

/// 就绪探针：检查数据库连接是否可用
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let db_ok = db.health_check().await.is_ok();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": "coffee-order-service",
        "checks": {
            "database": if db_ok { "ok" } else { "fail" }
        }
    }))
}
