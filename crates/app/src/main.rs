use std::path::PathBuf;
use std::sync::Arc;

use quotegate_api::server::{AppState, start_server};
use quotegate_broker::demo::DemoBrokerClient;
use quotegate_broker::rest::RestBrokerClient;
use quotegate_core::config::BackendMode;
use quotegate_core::market::port::BrokerClient;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod settings;

/// # Summary
/// 应用启动入口，纯粹的装配容器。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 加载配置，缺少令牌时直接退出，不对外提供服务。
/// 3. 按配置实例化后端客户端 (真实 REST 或演示数据)。
/// 4. 构造共享状态并启动 HTTP 服务，直到收到退出信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Quotegate starting...");

    // 2. 加载配置
    let config_path = std::env::var_os("QUOTEGATE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("quotegate.toml"));
    let config = settings::load_config(&config_path, std::env::var(settings::TOKEN_ENV).ok())?;

    if config.backend.token.is_empty() {
        error!("FATAL: {} environment variable is not set.", settings::TOKEN_ENV);
        std::process::exit(1);
    }
    info!(
        mode = ?config.backend.mode,
        token = %config.backend.token.masked(),
        "Backend configured"
    );

    // 3. 实例化后端客户端
    let client: Arc<dyn BrokerClient> = match config.backend.mode {
        BackendMode::Rest => Arc::new(RestBrokerClient::new(&config.backend)?),
        BackendMode::Demo => {
            warn!("Using DEMO backend, all responses are synthetic");
            Arc::new(DemoBrokerClient::default())
        }
    };

    // 4. 启动服务
    let state = AppState::new(client, &config);
    start_server(state, &config.server.bind_addr()).await?;

    info!("Shutdown complete");
    Ok(())
}
