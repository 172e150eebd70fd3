//! # 后端适配层
//!
//! 持有进程级唯一的 `BrokerClient` 句柄，每个入站请求恰好发起一次后端调用。
//! 不重试、不缓存、不覆盖超时；后端失败原样上抛，由路由边界交给错误映射器。

use std::sync::Arc;

use quotegate_core::market::entity::{CandleQuery, LastPriceQuery, PortfolioQuery, TimeWindow};
use quotegate_core::market::port::{
    BackendError, BrokerClient, CandlesRequest, LastPricesRequest, PortfolioRequest,
};
use serde_json::{Map, Value};
use thiserror::Error;

/// 适配层错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// 后端调用失败，原样透传
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// 后端成功返回但容器形状不符合约定
    #[error("unexpected backend response shape")]
    UnexpectedShape {
        field: &'static str,
        found: &'static str,
    },
}

/// # Summary
/// 后端适配器。
///
/// # Invariants
/// - `client` 在进程启动时注入，之后只读，可被任意多个并发请求共享。
#[derive(Clone)]
pub struct MarketGateway {
    client: Arc<dyn BrokerClient>,
}

impl MarketGateway {
    pub fn new(client: Arc<dyn BrokerClient>) -> Self {
        Self { client }
    }

    /// # Summary
    /// 查询最新价。
    ///
    /// # Logic
    /// 1. `figi` 与 `instrumentId` 填入同一份标识列表 (后端可能读取其中任一字段)。
    /// 2. 校验 `lastPrices` 为数组后返回其元素。
    pub async fn last_prices(&self, query: &LastPriceQuery) -> Result<Vec<Value>, AdapterError> {
        let request = LastPricesRequest {
            figi: query.identifiers.clone(),
            instrument_id: query.identifiers.clone(),
        };
        let resp = self.client.fetch_last_prices(request).await?;
        expect_sequence("lastPrices", resp.last_prices)
    }

    /// 查询 K 线，时间窗口由调用方派生后原样传入
    pub async fn candles(
        &self,
        query: &CandleQuery,
        window: TimeWindow,
    ) -> Result<Vec<Value>, AdapterError> {
        let request = CandlesRequest {
            figi: query.identifier.clone(),
            instrument_id: query.identifier.clone(),
            interval: query.interval,
            from: window.from,
            to: window.to,
        };
        let resp = self.client.fetch_candles(request).await?;
        expect_sequence("candles", resp.candles)
    }

    pub async fn accounts(&self) -> Result<Vec<Value>, AdapterError> {
        let resp = self.client.fetch_accounts().await?;
        expect_sequence("accounts", resp.accounts)
    }

    /// 查询投资组合，要求后端返回 JSON 对象
    pub async fn portfolio(&self, query: &PortfolioQuery) -> Result<Map<String, Value>, AdapterError> {
        let request = PortfolioRequest {
            account_id: query.account_id.clone(),
            currency: query.currency,
        };
        match self.client.fetch_portfolio(request).await? {
            Value::Object(record) => Ok(record),
            other => Err(AdapterError::UnexpectedShape {
                field: "portfolio",
                found: json_kind(&other),
            }),
        }
    }
}

fn expect_sequence(field: &'static str, payload: Value) -> Result<Vec<Value>, AdapterError> {
    match payload {
        Value::Array(items) => Ok(items),
        other => Err(AdapterError::UnexpectedShape {
            field,
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
