use async_trait::async_trait;
use quotegate_core::config::BackendConfig;
use quotegate_core::market::port::{
    AccountsResponse, BackendError, BrokerClient, CandlesRequest, CandlesResponse,
    LastPricesRequest, LastPricesResponse, PortfolioRequest,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

const MARKET_DATA_SERVICE: &str = "tinkoff.public.invest.api.contract.v1.MarketDataService";
const USERS_SERVICE: &str = "tinkoff.public.invest.api.contract.v1.UsersService";
const OPERATIONS_SERVICE: &str = "tinkoff.public.invest.api.contract.v1.OperationsService";

/// # Summary
/// 券商公开 REST 网关客户端。每个 RPC 方法对应一次 `POST {base}/{service}/{method}`。
///
/// # Invariants
/// - 令牌只存在于默认请求头中，并标记为 sensitive，不会出现在 `Debug` 输出与错误信息里。
/// - 不设置整体请求超时，只限制建连时间。
#[derive(Clone)]
pub struct RestBrokerClient {
    client: Client,
    base_url: String,
}

impl RestBrokerClient {
    /// # Summary
    /// 根据后端配置创建客户端。
    ///
    /// # Logic
    /// 1. 安装 rustls 的 ring 加密后端 (进程内只生效一次)。
    /// 2. 构造 Bearer 鉴权头与 `x-app-name` 头。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Returns
    /// 令牌或应用名含非法头字符、客户端构建失败时返回 `BackendError`。
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        install_crypto_provider();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.expose()))
            .map_err(|_| BackendError::transport("backend token is not a valid header value"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        let app_name = HeaderValue::from_str(&config.app_name)
            .map_err(|_| BackendError::transport("backend app name is not a valid header value"))?;
        headers.insert("x-app-name", app_name);

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .default_headers(headers)
            .build()
            .map_err(|e| BackendError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn invoke<B, R>(&self, service: &str, method: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}/{}", self.base_url, service, method);
        debug!(%url, "calling backend");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::transport(format!("backend request failed: {}", e.without_url())))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| BackendError::transport(format!("failed to read backend response: {e}")))?;

        if !status.is_success() {
            return Err(decode_failure(status, &bytes));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::transport(format!("failed to decode backend response: {e}")))
    }
}

fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// REST 网关的错误响应体
#[derive(Deserialize)]
struct RestErrorBody {
    code: Option<i32>,
    message: Option<String>,
    description: Option<String>,
}

/// # Summary
/// 将非 2xx 响应解码为 `BackendError`。
///
/// # Logic
/// 1. 优先使用响应体中的 `code`，缺失时按 HTTP 状态推断。
/// 2. `description` 作为人类可读消息，`message` (券商内部错误号) 放入 details。
/// 3. 响应体无法解析时只保留状态信息。
fn decode_failure(status: StatusCode, body: &[u8]) -> BackendError {
    let fallback_code = code_for_status(status);
    let fallback_message = format!("backend responded with HTTP {status}");

    let Ok(parsed) = serde_json::from_slice::<RestErrorBody>(body) else {
        return BackendError {
            code: fallback_code,
            message: fallback_message,
            details: None,
        };
    };

    let code = parsed.code.or(fallback_code);
    let message = parsed.message.filter(|m| !m.is_empty());
    match parsed.description.filter(|d| !d.is_empty()) {
        Some(description) => BackendError {
            code,
            message: description,
            details: message.map(Value::String),
        },
        None => BackendError {
            code,
            message: message.unwrap_or(fallback_message),
            details: None,
        },
    }
}

// gRPC 网关的标准状态映射
fn code_for_status(status: StatusCode) -> Option<i32> {
    match status.as_u16() {
        400 => Some(3),
        401 => Some(16),
        403 => Some(7),
        404 => Some(5),
        429 => Some(8),
        500 => Some(13),
        503 => Some(14),
        504 => Some(4),
        _ => None,
    }
}

#[async_trait]
impl BrokerClient for RestBrokerClient {
    async fn fetch_last_prices(
        &self,
        request: LastPricesRequest,
    ) -> Result<LastPricesResponse, BackendError> {
        self.invoke(MARKET_DATA_SERVICE, "GetLastPrices", &request).await
    }

    async fn fetch_candles(&self, request: CandlesRequest) -> Result<CandlesResponse, BackendError> {
        self.invoke(MARKET_DATA_SERVICE, "GetCandles", &request).await
    }

    async fn fetch_accounts(&self) -> Result<AccountsResponse, BackendError> {
        self.invoke(USERS_SERVICE, "GetAccounts", &json!({})).await
    }

    async fn fetch_portfolio(&self, request: PortfolioRequest) -> Result<Value, BackendError> {
        self.invoke(OPERATIONS_SERVICE, "GetPortfolio", &request).await
    }
}
