//! # DTO (Data Transfer Object) 层
//!
//! 网关对外输出的 JSON 结构。成功响应直接透传后端记录，
//! 这里只定义错误信封与文档用的占位 schema。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// 后端原样透传的记录，字段由后端决定
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct BackendRecord(pub Value);

/// 统一错误信封 `{ error, details?, code? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 人类可读的错误描述
    #[schema(example = "No valid FIGIs provided.")]
    pub error: String,
    /// 后端附带的错误细节
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<Value>,
    /// 后端数值错误码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 8)]
    pub code: Option<i32>,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            error: msg.into(),
            details: None,
            code: None,
        }
    }
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

// ============================================================
//  查询参数 (全部按可选字符串接收，缺失与非法由 params 模块统一判定)
// ============================================================

#[derive(Debug, Default, Deserialize)]
pub struct LastPricesParams {
    pub figis: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandlesParams {
    pub figi: Option<String>,
    pub interval: Option<String>,
    pub days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioParams {
    pub currency: Option<String>,
}
