//! # 账户路由控制器
//!
//! 实现 `/accounts` 与 `/portfolio/{account_id}` 接口，直接透传后端记录。

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::params::derive_portfolio;
use crate::routes::malformed_query;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, BackendRecord, PortfolioParams};

/// 列出令牌可访问的全部账户
#[utoipa::path(
    get,
    path = "/accounts",
    tag = "账户 (Account)",
    responses(
        (status = 200, description = "账户列表", body = Vec<BackendRecord>),
        (status = 401, description = "后端拒绝令牌", body = ApiErrorResponse),
        (status = 500, description = "后端内部错误或响应格式异常", body = ApiErrorResponse)
    )
)]
pub async fn get_accounts(State(state): State<AppState>) -> Result<Json<Vec<Value>>, GatewayError> {
    let accounts = state
        .gateway
        .accounts()
        .await
        .map_err(|e| state.errors.map(e))?;

    tracing::info!(returned = accounts.len(), "accounts served");
    Ok(Json(accounts))
}

/// 获取指定账户的投资组合
///
/// `currency` 决定汇总金额的计价货币，缺省为 rub。
#[utoipa::path(
    get,
    path = "/portfolio/{account_id}",
    tag = "账户 (Account)",
    params(
        ("account_id" = String, Path, description = "券商账户 ID"),
        ("currency" = Option<String>, Query, description = "计价货币: rub, usd, eur")
    ),
    responses(
        (status = 200, description = "投资组合记录", body = BackendRecord),
        (status = 400, description = "账户 ID 为空或货币非法", body = ApiErrorResponse),
        (status = 401, description = "后端拒绝令牌或无权访问该账户", body = ApiErrorResponse),
        (status = 404, description = "账户不存在", body = ApiErrorResponse),
        (status = 500, description = "后端内部错误或响应格式异常", body = ApiErrorResponse)
    )
)]
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    params: Result<Query<PortfolioParams>, QueryRejection>,
) -> Result<Json<Map<String, Value>>, GatewayError> {
    let Query(params) = params.map_err(|e| state.errors.map(malformed_query(e)))?;
    let query = derive_portfolio(&account_id, params.currency.as_deref())
        .map_err(|e| state.errors.map(e))?;

    let portfolio = state
        .gateway
        .portfolio(&query)
        .await
        .map_err(|e| state.errors.map(e))?;

    tracing::info!(account_id = %query.account_id, currency = query.currency.as_str(), "portfolio served");
    Ok(Json(portfolio))
}
