//! # 错误分类映射
//!
//! 把路由边界捕获到的任何失败 (本地校验失败、后端失败、后端载荷形状错误)
//! 统一分类为 `ErrorKind`，并生成 HTTP 状态码与 JSON 错误信封。
//!
//! ## 后端错误码对照
//! | 后端码 | ErrorKind | HTTP |
//! |---|---|---|
//! | 3 | ValidationError | 400 |
//! | 5 | NotFoundError | 404 |
//! | 7, 16 | AuthenticationError | 401 |
//! | 8 | RateLimitError | 429 |
//! | 13 | BackendInternalError | 500 |
//! | 其他 / 缺失 | UnknownError | 500 |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quotegate_core::config::Secret;
use quotegate_core::market::error::ValidationError;
use serde_json::Value;
use thiserror::Error;

use crate::gateway::AdapterError;
use crate::types::ApiErrorResponse;

const REDACTED: &str = "[REDACTED]";

/// 网关对外的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationError,
    AuthenticationError,
    RateLimitError,
    NotFoundError,
    BackendInternalError,
    UnknownError,
}

impl ErrorKind {
    /// 按后端数值错误码分类
    pub fn from_backend_code(code: Option<i32>) -> Self {
        match code {
            Some(3) => ErrorKind::ValidationError,
            Some(5) => ErrorKind::NotFoundError,
            Some(7 | 16) => ErrorKind::AuthenticationError,
            Some(8) => ErrorKind::RateLimitError,
            Some(13) => ErrorKind::BackendInternalError,
            _ => ErrorKind::UnknownError,
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
            ErrorKind::AuthenticationError => StatusCode::UNAUTHORIZED,
            ErrorKind::RateLimitError => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::NotFoundError => StatusCode::NOT_FOUND,
            ErrorKind::BackendInternalError | ErrorKind::UnknownError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// # Summary
/// 单次响应内的错误值，只由 [`ErrorMapper`] 构造。
///
/// # Invariants
/// - `message` 与 `details` 已完成凭证脱敏，可直接输出与记录日志。
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind:?}: {message}")]
pub struct GatewayError {
    pub kind: ErrorKind,
    pub message: String,
    pub backend_code: Option<i32>,
    pub details: Option<Value>,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn body(&self) -> ApiErrorResponse {
        ApiErrorResponse {
            error: self.message.clone(),
            details: self.details.clone(),
            code: self.backend_code,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = ?self.kind, code = ?self.backend_code, "request failed: {}", self.message);
        } else {
            tracing::warn!(kind = ?self.kind, code = ?self.backend_code, "request rejected: {}", self.message);
        }
        (status, Json(self.body())).into_response()
    }
}

/// 路由边界可能捕获到的所有失败
#[derive(Debug)]
pub enum Failure {
    Validation(ValidationError),
    Adapter(AdapterError),
}

impl From<ValidationError> for Failure {
    fn from(err: ValidationError) -> Self {
        Failure::Validation(err)
    }
}

impl From<AdapterError> for Failure {
    fn from(err: AdapterError) -> Self {
        Failure::Adapter(err)
    }
}

/// # Summary
/// 错误分类映射器，全函数、永不失败。
///
/// # Invariants
/// - 本地校验失败固定映射为 400，与任何后端码无关。
/// - 输出前把已知凭证的原文替换为 `[REDACTED]` (后端消息原样透传，可能回显令牌)。
#[derive(Debug, Clone, Default)]
pub struct ErrorMapper {
    secrets: Vec<Secret>,
}

impl ErrorMapper {
    /// 以需要脱敏的凭证构造，空凭证会被忽略
    pub fn new(secrets: impl IntoIterator<Item = Secret>) -> Self {
        Self {
            secrets: secrets.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// # Summary
    /// 将失败分类为 `GatewayError`。
    ///
    /// # Logic
    /// 1. 校验失败 → `ValidationError` / 400，不带后端码。
    /// 2. 后端载荷形状错误 → `BackendInternalError` / 500。
    /// 3. 后端失败 → 按后端码查表，码与 details 原样附带。
    /// 4. 对消息与 details 做凭证脱敏。
    pub fn map(&self, failure: impl Into<Failure>) -> GatewayError {
        let err = match failure.into() {
            Failure::Validation(err) => GatewayError {
                kind: ErrorKind::ValidationError,
                message: err.to_string(),
                backend_code: None,
                details: None,
            },
            Failure::Adapter(err @ AdapterError::UnexpectedShape { field, found }) => {
                tracing::error!(field, found, "backend payload has unexpected container shape");
                GatewayError {
                    kind: ErrorKind::BackendInternalError,
                    message: err.to_string(),
                    backend_code: None,
                    details: None,
                }
            }
            Failure::Adapter(AdapterError::Backend(err)) => GatewayError {
                kind: ErrorKind::from_backend_code(err.code),
                message: err.message,
                backend_code: err.code,
                details: err.details,
            },
        };

        GatewayError {
            message: self.redact(&err.message),
            details: err.details.map(|d| self.redact_value(d)),
            ..err
        }
    }

    fn redact(&self, text: &str) -> String {
        self.secrets.iter().fold(text.to_string(), |acc, secret| {
            acc.replace(secret.expose(), REDACTED)
        })
    }

    fn redact_value(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.redact(&s)),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| self.redact_value(v)).collect())
            }
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (self.redact(&k), self.redact_value(v)))
                    .collect(),
            ),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotegate_core::market::port::BackendError;
    use serde_json::json;

    #[test]
    fn test_backend_code_table() {
        let table = [
            (Some(3), ErrorKind::ValidationError, 400),
            (Some(5), ErrorKind::NotFoundError, 404),
            (Some(7), ErrorKind::AuthenticationError, 401),
            (Some(16), ErrorKind::AuthenticationError, 401),
            (Some(8), ErrorKind::RateLimitError, 429),
            (Some(13), ErrorKind::BackendInternalError, 500),
            (Some(2), ErrorKind::UnknownError, 500),
            (Some(14), ErrorKind::UnknownError, 500),
            (Some(-1), ErrorKind::UnknownError, 500),
            (Some(i32::MAX), ErrorKind::UnknownError, 500),
            (None, ErrorKind::UnknownError, 500),
        ];
        let mapper = ErrorMapper::default();
        for (code, kind, status) in table {
            let err = mapper.map(AdapterError::from(BackendError {
                code,
                message: "boom".into(),
                details: None,
            }));
            assert_eq!(err.kind, kind, "code {code:?}");
            assert_eq!(err.status().as_u16(), status, "code {code:?}");
            assert_eq!(err.backend_code, code);
        }
    }

    #[test]
    fn test_validation_is_always_bad_request() {
        let err = ErrorMapper::default().map(ValidationError::NoValidFigis);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.body(),
            ApiErrorResponse::from_msg("No valid FIGIs provided.")
        );
    }

    #[test]
    fn test_shape_error_is_backend_internal() {
        let err = ErrorMapper::default().map(AdapterError::UnexpectedShape {
            field: "lastPrices",
            found: "object",
        });
        assert_eq!(err.kind, ErrorKind::BackendInternalError);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "unexpected backend response shape");
        assert_eq!(err.backend_code, None);
    }

    #[test]
    fn test_body_omits_absent_fields() {
        let body = ErrorMapper::default().map(ValidationError::EmptyFigi).body();
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, json!({"error": "No valid FIGI provided."}));

        let body = ErrorMapper::default()
            .map(AdapterError::from(
                BackendError::new(8, "slow down").with_details(json!({"retryAfter": 1})),
            ))
            .body();
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(
            json,
            json!({"error": "slow down", "details": {"retryAfter": 1}, "code": 8})
        );
    }

    #[test]
    fn test_secret_is_redacted_everywhere() {
        let token = "t.fw7iTurYbenwWQp049ocrLNghDNN1I8R6Gf2Mvvz";
        let mapper = ErrorMapper::new([Secret::new(token), Secret::new("  ")]);
        let err = mapper.map(AdapterError::from(
            BackendError::new(16, format!("bad token {token}"))
                .with_details(json!({"header": format!("Bearer {token}"), "list": [token, 1]})),
        ));
        let rendered = serde_json::to_string(&err.body()).unwrap();
        assert!(!rendered.contains(token));
        assert_eq!(err.message, "bad token [REDACTED]");
        assert_eq!(err.details.unwrap()["list"][0], json!("[REDACTED]"));
    }
}
