//! # 行情路由控制器
//!
//! 实现 `/last-prices` 与 `/candles` 两个只读查询接口。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde_json::Value;

use crate::error::GatewayError;
use crate::params::{derive_candles, derive_last_prices};
use crate::routes::malformed_query;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, BackendRecord, CandlesParams, LastPricesParams};

/// 批量查询最新价
///
/// `figis` 按逗号切分，去空白并丢弃空项后原序发往后端。
/// 成功时原样返回后端的 `lastPrices` 数组。
#[utoipa::path(
    get,
    path = "/last-prices",
    tag = "行情 (Market)",
    params(
        ("figis" = String, Query, description = "逗号分隔的 FIGI 列表", example = "BBG004730N88,USD000UTSTOM")
    ),
    responses(
        (status = 200, description = "最新价列表", body = Vec<BackendRecord>),
        (status = 400, description = "参数缺失或没有有效的 FIGI", body = ApiErrorResponse),
        (status = 401, description = "后端拒绝令牌", body = ApiErrorResponse),
        (status = 429, description = "后端限流", body = ApiErrorResponse),
        (status = 500, description = "后端内部错误或响应格式异常", body = ApiErrorResponse)
    )
)]
pub async fn get_last_prices(
    State(state): State<AppState>,
    params: Result<Query<LastPricesParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, GatewayError> {
    let Query(params) = params.map_err(|e| state.errors.map(malformed_query(e)))?;
    let query = derive_last_prices(params.figis.as_deref()).map_err(|e| state.errors.map(e))?;

    tracing::debug!(figis = ?query.identifiers, "requesting last prices");
    let prices = state
        .gateway
        .last_prices(&query)
        .await
        .map_err(|e| state.errors.map(e))?;

    tracing::info!(requested = query.identifiers.len(), returned = prices.len(), "last prices served");
    Ok(Json(prices))
}

/// 查询历史 K 线
///
/// 时间窗口为 `[now - days, now]`，`now` 在每个请求内只采样一次。
#[utoipa::path(
    get,
    path = "/candles",
    tag = "行情 (Market)",
    params(
        ("figi" = String, Query, description = "证券 FIGI", example = "BBG004730N88"),
        ("interval" = String, Query, description = "K 线周期: 1min, 5min, 15min, hour, day (大小写不敏感)", example = "day"),
        ("days" = u32, Query, description = "回溯天数，正整数", example = 7)
    ),
    responses(
        (status = 200, description = "K 线列表", body = Vec<BackendRecord>),
        (status = 400, description = "参数缺失、周期不在允许集合内或天数非法", body = ApiErrorResponse),
        (status = 404, description = "标的不存在", body = ApiErrorResponse),
        (status = 429, description = "后端限流", body = ApiErrorResponse),
        (status = 500, description = "后端内部错误或响应格式异常", body = ApiErrorResponse)
    )
)]
pub async fn get_candles(
    State(state): State<AppState>,
    params: Result<Query<CandlesParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, GatewayError> {
    let Query(params) = params.map_err(|e| state.errors.map(malformed_query(e)))?;
    let now = state.clock.now();
    let (query, window) = derive_candles(
        params.figi.as_deref(),
        params.interval.as_deref(),
        params.days.as_deref(),
        now,
    )
    .map_err(|e| state.errors.map(e))?;

    tracing::debug!(
        figi = %query.identifier,
        interval = %query.interval,
        from = %window.from,
        to = %window.to,
        width_days = window.width().num_days(),
        "requesting candles"
    );
    let candles = state
        .gateway
        .candles(&query, window)
        .await
        .map_err(|e| state.errors.map(e))?;

    tracing::info!(figi = %query.identifier, returned = candles.len(), "candles served");
    Ok(Json(candles))
}
