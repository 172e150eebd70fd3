//! # 路由控制器
//!
//! 每个 Handler 串联 参数派生 → 后端适配 → 错误映射，且对每个请求只写一次响应。

use axum::extract::rejection::QueryRejection;
use quotegate_core::market::error::ValidationError;

pub mod account;
pub mod health;
pub mod market;

/// 查询字符串无法解码时归入校验失败
pub(crate) fn malformed_query(rejection: QueryRejection) -> ValidationError {
    ValidationError::MalformedQuery {
        reason: rejection.body_text(),
    }
}
