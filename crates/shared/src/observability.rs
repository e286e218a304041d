//! 日志初始化模块
//!
//! 基于 tracing-subscriber 提供结构化日志输出，
//! 支持通过配置切换 json / pretty 两种格式。

use crate::config::ObservabilityConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化全局日志订阅器
///
/// 日志级别优先读取 RUST_LOG 环境变量，否则使用配置中的 log_level。
/// 重复调用会返回错误（全局订阅器只能设置一次）。
pub fn init(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .try_init()?;
        }
    }

    Ok(())
}
