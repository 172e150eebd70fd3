use chrono::{TimeDelta, TimeZone, Utc};
use mockito::{Matcher, Server};
use quotegate_broker::rest::RestBrokerClient;
use quotegate_core::config::{BackendConfig, Secret};
use quotegate_core::market::entity::{CurrencyKind, InstrumentId, IntervalKind};
use quotegate_core::market::port::{BrokerClient, CandlesRequest, LastPricesRequest, PortfolioRequest};
use serde_json::json;

const MARKET_DATA: &str = "/tinkoff.public.invest.api.contract.v1.MarketDataService";

fn client_for(server: &Server) -> RestBrokerClient {
    let config = BackendConfig {
        base_url: format!("{}/", server.url()),
        token: Secret::new("test-token"),
        ..Default::default()
    };
    RestBrokerClient::new(&config).expect("client must build")
}

/// # Summary
/// 最新价请求必须同时携带 figi 与 instrumentId，并附带 Bearer 令牌。
#[tokio::test]
async fn test_last_prices_sends_dual_identifier_fields() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", format!("{MARKET_DATA}/GetLastPrices").as_str())
        .match_header("authorization", "Bearer test-token")
        .match_header("x-app-name", "quotegate")
        .match_body(Matcher::Json(json!({
            "figi": ["BBG004730N88", "USD000UTSTOM"],
            "instrumentId": ["BBG004730N88", "USD000UTSTOM"],
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"lastPrices":[{"figi":"BBG004730N88","price":{"units":"250","nano":0}}]}"#)
        .create_async()
        .await;

    let ids = vec![
        InstrumentId::parse("BBG004730N88").unwrap(),
        InstrumentId::parse("USD000UTSTOM").unwrap(),
    ];
    let resp = client_for(&server)
        .fetch_last_prices(LastPricesRequest {
            figi: ids.clone(),
            instrument_id: ids,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.last_prices[0]["figi"], "BBG004730N88");
}

#[tokio::test]
async fn test_candles_sends_interval_code_and_window() {
    let mut server = Server::new_async().await;
    let to = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
    let from = to - TimeDelta::days(7);
    let mock = server
        .mock("POST", format!("{MARKET_DATA}/GetCandles").as_str())
        .match_body(Matcher::Json(json!({
            "figi": "BBG004730N88",
            "instrumentId": "BBG004730N88",
            "interval": 5,
            "from": "2024-03-01T12:00:00Z",
            "to": "2024-03-08T12:00:00Z",
        })))
        .with_status(200)
        .with_body(r#"{"candles":[]}"#)
        .create_async()
        .await;

    let figi = InstrumentId::parse("BBG004730N88").unwrap();
    let resp = client_for(&server)
        .fetch_candles(CandlesRequest {
            figi: figi.clone(),
            instrument_id: figi,
            interval: IntervalKind::Day,
            from,
            to,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(resp.candles, json!([]));
}

/// # Summary
/// 后端错误体中的 code 与 description 需原样进入 `BackendError`。
#[tokio::test]
async fn test_backend_error_body_is_decoded() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/tinkoff.public.invest.api.contract.v1.OperationsService/GetPortfolio")
        .with_status(404)
        .with_body(r#"{"code":5,"message":"50004","description":"account not found"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .fetch_portfolio(PortfolioRequest {
            account_id: "missing".into(),
            currency: CurrencyKind::Rub,
        })
        .await
        .unwrap_err();

    assert_eq!(err.code, Some(5));
    assert_eq!(err.message, "account not found");
    assert_eq!(err.details, Some(json!("50004")));
}

#[tokio::test]
async fn test_accounts_and_undecodable_success_body() {
    let mut server = Server::new_async().await;
    let _accounts = server
        .mock("POST", "/tinkoff.public.invest.api.contract.v1.UsersService/GetAccounts")
        .match_body(Matcher::Json(json!({})))
        .with_status(200)
        .with_body(r#"{"accounts":[{"id":"acc123"}]}"#)
        .create_async()
        .await;
    let _prices = server
        .mock("POST", format!("{MARKET_DATA}/GetLastPrices").as_str())
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let accounts = client.fetch_accounts().await.unwrap();
    assert_eq!(accounts.accounts, json!([{"id": "acc123"}]));

    let err = client
        .fetch_last_prices(LastPricesRequest {
            figi: vec![],
            instrument_id: vec![],
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, None);
    assert!(!err.message.contains("test-token"));
}
