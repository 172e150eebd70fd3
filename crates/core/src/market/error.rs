use thiserror::Error;

/// # Summary
/// 查询参数校验错误，全部在网关本地产生，不会触达后端。
///
/// # Invariants
/// - `Display` 输出即为返回给调用方的 `error` 字段，必须是人类可读的英文短句。
/// - 任何变体统一映射为 HTTP 400。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// 必填查询参数缺失
    #[error("Query parameter \"{name}\" is required.")]
    MissingParameter { name: &'static str },

    /// 标识符列表过滤空白后为空
    #[error("No valid FIGIs provided.")]
    NoValidFigis,

    /// 单个标识符去除空白后为空
    #[error("No valid FIGI provided.")]
    EmptyFigi,

    #[error("Invalid interval. Use 1min, 5min, 15min, hour, day.")]
    InvalidInterval { value: String },

    /// `days` 不是正整数
    #[error("Query parameter \"days\" must be a positive integer.")]
    InvalidDays { value: String },

    /// `days` 合法但回溯后超出时间可表示范围
    #[error("Query parameter \"days\" is out of range: {days}.")]
    DaysOutOfRange { days: i64 },

    #[error("Account id must not be empty.")]
    EmptyAccountId,

    #[error("Invalid currency. Use rub, usd, eur.")]
    InvalidCurrency { value: String },

    /// 查询字符串本身无法解码 (如重复参数)
    #[error("Malformed query string: {reason}")]
    MalformedQuery { reason: String },
}
