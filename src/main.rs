// ==========================================
// 刀具磨损追踪系统 - HTTP 服务主入口
// ==========================================

use anyhow::Context;
use tokio::net::TcpListener;

use tool_wear_tracker::app::{build_router, AppState};
use tool_wear_tracker::config::AppConfig;
use tool_wear_tracker::{i18n, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("配置加载失败")?;

    // 初始化日志系统
    logging::init(config.log_format);
    i18n::set_locale(&config.locale);

    tracing::info!("==================================================");
    tracing::info!("刀具磨损追踪系统");
    tracing::info!("系统版本: {}", tool_wear_tracker::VERSION);
    tracing::info!("==================================================");

    let bind_addr = config.bind_addr.clone();
    let state = AppState::from_config(config)?;
    let router = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", bind_addr))?;
    tracing::info!("HTTP 服务已启动: {}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("HTTP 服务已退出");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，正在关闭");
}
