//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 完成依赖装配后调用。

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use quotegate_core::common::time::{SystemClock, TimeProvider};
use quotegate_core::config::AppConfig;
use quotegate_core::market::port::BrokerClient;

use crate::error::ErrorMapper;
use crate::gateway::MarketGateway;
use crate::routes::{account, health, market};
use crate::types::ApiErrorResponse;

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有字段在服务启动前构造，生命周期与进程等同，之后只读。
/// - 请求之间不共享任何可变状态。
#[derive(Clone)]
pub struct AppState {
    /// 后端适配器 (持有唯一的后端客户端句柄)
    pub gateway: Arc<MarketGateway>,
    /// 时钟，用于派生 K 线时间窗口
    pub clock: Arc<dyn TimeProvider>,
    /// 错误分类映射器 (携带需要脱敏的凭证)
    pub errors: Arc<ErrorMapper>,
}

impl AppState {
    /// # Summary
    /// 由注入的后端客户端与启动配置构造状态。
    ///
    /// # Arguments
    /// * `client` - 后端 RPC 客户端，真实实现或测试替身
    /// * `config` - 启动时加载的配置，其中的令牌用于错误信息脱敏
    pub fn new(client: Arc<dyn BrokerClient>, config: &AppConfig) -> Self {
        Self {
            gateway: Arc::new(MarketGateway::new(client)),
            clock: Arc::new(SystemClock),
            errors: Arc::new(ErrorMapper::new([config.backend.token.clone()])),
        }
    }

    /// 替换时钟
    pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
        self.clock = clock;
        self
    }
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quotegate 行情网关 API",
        version = "0.1.0",
        description = "券商行情/账户后端的 HTTP 网关。负责参数校验、后端调用与错误码映射。",
        license(name = "MIT")
    ),
    tags(
        (name = "行情 (Market)", description = "最新价与历史 K 线查询"),
        (name = "账户 (Account)", description = "账户列表与投资组合查询"),
        (name = "系统 (System)", description = "存活检查")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// 构建完整的路由树 (含 Swagger UI 与 CORS)，不绑定端口，便于进程内测试。
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(market::get_last_prices))
        .routes(routes!(market::get_candles))
        .routes(routes!(account::get_accounts))
        .routes(routes!(account::get_portfolio))
        .routes(routes!(health::health))
        .with_state(state)
        .split_for_parts();

    // 网关本身不做鉴权，允许任意来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .fallback(route_not_found)
        .layer(cors)
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiErrorResponse::from_msg("Route not found.")),
    )
}

/// 构建路由并启动 HTTP 监听，收到 Ctrl-C 后优雅退出。
///
/// # Arguments
/// * `state` - 由 app crate 装配的共享状态
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:3001"`
pub async fn start_server(state: AppState, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Quotegate listening on {}", listener.local_addr()?);
    tracing::info!("📖 Swagger UI: http://{}/swagger-ui/", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
