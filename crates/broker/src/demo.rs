use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use quotegate_core::market::entity::IntervalKind;
use quotegate_core::market::port::{
    AccountsResponse, BackendError, BrokerClient, CandlesRequest, CandlesResponse,
    LastPricesRequest, LastPricesResponse, PortfolioRequest,
};
use serde_json::{Value, json};
use std::time::Duration;

/// 单次 K 线响应的最大根数
const MAX_DEMO_CANDLES: usize = 500;

/// # Summary
/// 演示用后端，返回固定形状的行情数据并模拟网络延迟。
///
/// # Invariants
/// - 无内部状态，相同入参总是返回相同的数据 (时间戳字段除外)。
/// - 只认识 `demo_accounts()` 中的账户，其余账户返回错误码 5。
#[derive(Debug, Clone)]
pub struct DemoBrokerClient {
    latency: Duration,
}

impl DemoBrokerClient {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for DemoBrokerClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(40))
    }
}

fn quotation(units: i64, nano: i32) -> Value {
    json!({ "units": units.to_string(), "nano": nano })
}

fn money(units: i64, currency: &str) -> Value {
    json!({ "currency": currency, "units": units.to_string(), "nano": 0 })
}

fn step_of(interval: IntervalKind) -> TimeDelta {
    match interval {
        IntervalKind::OneMin => TimeDelta::minutes(1),
        IntervalKind::FiveMin => TimeDelta::minutes(5),
        IntervalKind::FifteenMin => TimeDelta::minutes(15),
        IntervalKind::Hour => TimeDelta::hours(1),
        IntervalKind::Day => TimeDelta::days(1),
    }
}

/// 从 `to` 向前按周期回溯生成 K 线，按时间升序返回
fn demo_candles(interval: IntervalKind, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Value> {
    let step = step_of(interval);
    let mut candles = Vec::new();
    let mut time = to - step;
    let mut price: i64 = 250;
    while time >= from && candles.len() < MAX_DEMO_CANDLES {
        candles.push(json!({
            "open": quotation(price, 0),
            "high": quotation(price + 2, 0),
            "low": quotation(price - 1, 0),
            "close": quotation(price + 1, 500_000_000),
            "volume": "1000",
            "time": time.to_rfc3339(),
            "isComplete": true,
        }));
        price = if price > 200 { price - 1 } else { 250 };
        time -= step;
    }
    candles.reverse();
    candles
}

fn demo_accounts() -> Vec<Value> {
    vec![
        json!({
            "id": "acc123",
            "type": "ACCOUNT_TYPE_TINKOFF",
            "name": "Broker Account",
            "status": "ACCOUNT_STATUS_OPEN",
            "accessLevel": "ACCOUNT_ACCESS_LEVEL_FULL_ACCESS",
        }),
        json!({
            "id": "acc456",
            "type": "ACCOUNT_TYPE_TINKOFF_IIS",
            "name": "IIS Account",
            "status": "ACCOUNT_STATUS_OPEN",
            "accessLevel": "ACCOUNT_ACCESS_LEVEL_FULL_ACCESS",
        }),
    ]
}

#[async_trait]
impl BrokerClient for DemoBrokerClient {
    async fn fetch_last_prices(
        &self,
        request: LastPricesRequest,
    ) -> Result<LastPricesResponse, BackendError> {
        self.simulate_latency().await;
        let now = Utc::now().to_rfc3339();
        let last_prices = request
            .figi
            .iter()
            .map(|figi| {
                json!({
                    "figi": figi,
                    "instrumentUid": figi,
                    "price": quotation(250, 0),
                    "time": now,
                })
            })
            .collect();
        Ok(LastPricesResponse {
            last_prices: Value::Array(last_prices),
        })
    }

    async fn fetch_candles(&self, request: CandlesRequest) -> Result<CandlesResponse, BackendError> {
        self.simulate_latency().await;
        let candles = demo_candles(request.interval, request.from, request.to);
        Ok(CandlesResponse {
            candles: Value::Array(candles),
        })
    }

    async fn fetch_accounts(&self) -> Result<AccountsResponse, BackendError> {
        self.simulate_latency().await;
        Ok(AccountsResponse {
            accounts: Value::Array(demo_accounts()),
        })
    }

    async fn fetch_portfolio(&self, request: PortfolioRequest) -> Result<Value, BackendError> {
        self.simulate_latency().await;
        let known = demo_accounts()
            .iter()
            .any(|a| a["id"] == Value::String(request.account_id.clone()));
        if !known {
            return Err(BackendError::new(5, "Account not found.")
                .with_details(Value::String("50004".into())));
        }

        let currency = request.currency.as_str();
        Ok(json!({
            "accountId": request.account_id,
            "totalAmountShares": money(1000, currency),
            "totalAmountBonds": money(500, currency),
            "totalAmountCurrencies": money(0, currency),
            "positions": [{
                "figi": "BBG004730N88",
                "instrumentType": "share",
                "quantity": quotation(10, 0),
                "averagePositionPrice": money(250, currency),
            }],
        }))
    }
}
