use chrono::{DateTime, TimeDelta, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::market::error::ValidationError;

/// # Summary
/// 交易所分配的证券标识 (FIGI 等)，对网关而言是不透明字符串。
///
/// # Invariants
/// - 只能通过 `parse` 构造，保证去除首尾空白后非空。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// # Summary
    /// 从原始字符串构造标识，去除首尾空白。
    ///
    /// # Returns
    /// 去空白后为空时返回 `ValidationError::EmptyFigi`。
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyFigi);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// # Summary
/// K 线聚合周期，封闭枚举。每个变体对应后端固定的数值编码。
///
/// # Invariants
/// - 新增变体时 `code` / `as_str` 的 match 由编译器穷举检查，`ALL` 需同步追加，`FromStr` 基于 `ALL` 匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalKind {
    OneMin,
    FiveMin,
    FifteenMin,
    Hour,
    Day,
}

impl IntervalKind {
    pub const ALL: [Self; 5] = [
        Self::OneMin,
        Self::FiveMin,
        Self::FifteenMin,
        Self::Hour,
        Self::Day,
    ];

    /// 后端 `CandleInterval` 数值编码
    pub const fn code(self) -> i32 {
        match self {
            Self::OneMin => 1,
            Self::FiveMin => 2,
            Self::FifteenMin => 3,
            Self::Hour => 4,
            Self::Day => 5,
        }
    }

    /// 查询字符串中使用的名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMin => "1min",
            Self::FiveMin => "5min",
            Self::FifteenMin => "15min",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ValidationError::InvalidInterval {
                value: value.to_string(),
            })
    }
}

// 后端以数值枚举接收周期
impl Serialize for IntervalKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// # Summary
/// 投资组合估值货币。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CurrencyKind {
    #[default]
    Rub,
    Usd,
    Eur,
}

impl CurrencyKind {
    /// 后端 `PortfolioRequest.CurrencyRequest` 数值编码
    pub const fn code(self) -> i32 {
        match self {
            Self::Rub => 0,
            Self::Usd => 1,
            Self::Eur => 2,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rub => "rub",
            Self::Usd => "usd",
            Self::Eur => "eur",
        }
    }
}

impl FromStr for CurrencyKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rub" => Ok(Self::Rub),
            "usd" => Ok(Self::Usd),
            "eur" => Ok(Self::Eur),
            _ => Err(ValidationError::InvalidCurrency {
                value: value.to_string(),
            }),
        }
    }
}

impl Serialize for CurrencyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// # Summary
/// 相对时间窗口 `[from, to)`。
///
/// # Invariants
/// - `from < to`，且 `to - from` 恰好等于构造时给定的天数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// # Summary
    /// 以同一个 `now` 为终点向前回溯 `days` 天。
    ///
    /// # Logic
    /// 1. `to` 直接取 `now`，不再重新采样时钟。
    /// 2. `from = to - days`，溢出时返回 `DaysOutOfRange`。
    ///
    /// # Arguments
    /// * `now`: 本次请求捕获的当前时间。
    /// * `days`: 窗口天数，必须为正。
    pub fn ending_at(now: DateTime<Utc>, days: u32) -> Result<Self, ValidationError> {
        let out_of_range = || ValidationError::DaysOutOfRange {
            days: i64::from(days),
        };
        if days == 0 {
            return Err(ValidationError::InvalidDays {
                value: days.to_string(),
            });
        }
        let width = TimeDelta::try_days(i64::from(days)).ok_or_else(out_of_range)?;
        let from = now.checked_sub_signed(width).ok_or_else(out_of_range)?;
        Ok(Self { from, to: now })
    }

    pub fn width(&self) -> TimeDelta {
        self.to - self.from
    }
}

/// 最新价查询，标识顺序与输入一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastPriceQuery {
    pub identifiers: Vec<InstrumentId>,
}

/// K 线查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleQuery {
    pub identifier: InstrumentId,
    pub interval: IntervalKind,
    pub window_days: u32,
}

/// 投资组合查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioQuery {
    pub account_id: String,
    pub currency: CurrencyKind,
}
