//! # 测试替身
//!
//! `MockBrokerClient` 实现完整的 `BrokerClient` 能力集，按操作预置响应并记录每次调用，
//! 供下游 crate 在不接触网络的情况下驱动网关。

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::market::port::{
    AccountsResponse, BackendError, BrokerClient, CandlesRequest, CandlesResponse,
    LastPricesRequest, LastPricesResponse, PortfolioRequest,
};

/// 后端操作名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    LastPrices,
    Candles,
    Accounts,
    Portfolio,
}

/// 一次被记录的后端调用及其完整入参
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    LastPrices(LastPricesRequest),
    Candles(CandlesRequest),
    Accounts,
    Portfolio(PortfolioRequest),
}

impl RecordedCall {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::LastPrices(_) => Operation::LastPrices,
            RecordedCall::Candles(_) => Operation::Candles,
            RecordedCall::Accounts => Operation::Accounts,
            RecordedCall::Portfolio(_) => Operation::Portfolio,
        }
    }
}

/// # Summary
/// 可编排的后端替身。
///
/// # Logic
/// - 未预置的操作返回空容器 (`[]`，投资组合为 `{}`)。
/// - `respond` 设置的是内层容器本身，替身负责包进 `{ lastPrices }` 等外层。
#[derive(Debug, Default)]
pub struct MockBrokerClient {
    scripted: Mutex<HashMap<Operation, Result<Value, BackendError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockBrokerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置某操作的成功载荷
    pub fn respond(self, op: Operation, payload: Value) -> Self {
        self.script(op, Ok(payload))
    }

    /// 预置某操作的失败
    pub fn fail(self, op: Operation, err: BackendError) -> Self {
        self.script(op, Err(err))
    }

    /// 所有操作均以同一错误失败
    pub fn fail_all(self, err: BackendError) -> Self {
        [
            Operation::LastPrices,
            Operation::Candles,
            Operation::Accounts,
            Operation::Portfolio,
        ]
        .into_iter()
        .fold(self, |mock, op| mock.fail(op, err.clone()))
    }

    fn script(self, op: Operation, outcome: Result<Value, BackendError>) -> Self {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op, outcome);
        self
    }

    /// 迄今为止的调用记录 (按发生顺序)
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn record(&self, call: RecordedCall) -> Result<Value, BackendError> {
        let op = call.operation();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&op)
            .cloned()
            .unwrap_or_else(|| match op {
                Operation::Portfolio => Ok(json!({})),
                _ => Ok(json!([])),
            })
    }
}

#[async_trait]
impl BrokerClient for MockBrokerClient {
    async fn fetch_last_prices(
        &self,
        request: LastPricesRequest,
    ) -> Result<LastPricesResponse, BackendError> {
        let last_prices = self.record(RecordedCall::LastPrices(request))?;
        Ok(LastPricesResponse { last_prices })
    }

    async fn fetch_candles(&self, request: CandlesRequest) -> Result<CandlesResponse, BackendError> {
        let candles = self.record(RecordedCall::Candles(request))?;
        Ok(CandlesResponse { candles })
    }

    async fn fetch_accounts(&self) -> Result<AccountsResponse, BackendError> {
        let accounts = self.record(RecordedCall::Accounts)?;
        Ok(AccountsResponse { accounts })
    }

    async fn fetch_portfolio(&self, request: PortfolioRequest) -> Result<Value, BackendError> {
        self.record(RecordedCall::Portfolio(request))
    }
}
