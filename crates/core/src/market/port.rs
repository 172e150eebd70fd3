use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::market::entity::{CurrencyKind, InstrumentId, IntervalKind};

/// # Summary
/// 后端调用失败，携带后端自定义的数值错误码 (gRPC 风格)。
///
/// # Invariants
/// - `code` 为 `None` 表示失败发生在传输或解码层，后端没有给出分类。
/// - `message` 原样透传后端文本，对外输出前必须经过凭证脱敏。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct BackendError {
    pub code: Option<i32>,
    pub message: String,
    pub details: Option<Value>,
}

impl BackendError {
    /// 构造带后端错误码的失败
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            message: message.into(),
            details: None,
        }
    }

    /// 构造无错误码的传输层失败
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// `GetLastPrices` 请求。`instrument_id` 与 `figi` 填入相同列表，后端两者择一读取。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPricesRequest {
    pub figi: Vec<InstrumentId>,
    pub instrument_id: Vec<InstrumentId>,
}

/// `GetCandles` 请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlesRequest {
    pub figi: InstrumentId,
    pub instrument_id: InstrumentId,
    pub interval: IntervalKind,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// `GetPortfolio` 请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioRequest {
    pub account_id: String,
    pub currency: CurrencyKind,
}

// 以下响应体的内层容器保持原始 JSON，由网关适配层校验形状后透传。

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPricesResponse {
    #[serde(default)]
    pub last_prices: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandlesResponse {
    #[serde(default)]
    pub candles: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountsResponse {
    #[serde(default)]
    pub accounts: Value,
}

/// # Summary
/// 券商后端 RPC 客户端能力契约。
///
/// # Invariants
/// - 实现者必须无内部可变状态或自行保证并发安全，网关以 `Arc<dyn BrokerClient>` 在所有请求间共享。
/// - 每次调用对应恰好一次后端请求，不做重试、缓存或去重。
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// # Summary
    /// 批量查询最新成交价。
    ///
    /// # Returns
    /// 成功返回 `{ lastPrices }`，失败返回带错误码的 `BackendError`。
    async fn fetch_last_prices(
        &self,
        request: LastPricesRequest,
    ) -> Result<LastPricesResponse, BackendError>;

    /// # Summary
    /// 查询单个标的在时间窗口内的 K 线。
    async fn fetch_candles(&self, request: CandlesRequest) -> Result<CandlesResponse, BackendError>;

    /// 查询令牌可见的全部账户
    async fn fetch_accounts(&self) -> Result<AccountsResponse, BackendError>;

    /// 查询指定账户的投资组合记录 (整个对象原样返回)
    async fn fetch_portfolio(&self, request: PortfolioRequest) -> Result<Value, BackendError>;
}
