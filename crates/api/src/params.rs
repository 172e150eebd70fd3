//! # 查询参数派生
//!
//! 把原始查询字符串转换为带类型、已校验的请求值对象。
//! 这里产生的任何错误都是 `ValidationError`，调用方据此直接返回 400，不会触达后端。

use chrono::{DateTime, Utc};
use quotegate_core::market::entity::{
    CandleQuery, CurrencyKind, InstrumentId, IntervalKind, LastPriceQuery, PortfolioQuery,
    TimeWindow,
};
use quotegate_core::market::error::ValidationError;

/// # Summary
/// 解析逗号分隔的标识列表。
///
/// # Logic
/// 1. 参数缺失 → `MissingParameter("figis")`；空字符串视为已提供。
/// 2. 按 `,` 切分，逐个去除空白，丢弃空项，保留原始顺序与重复项。
/// 3. 结果为空 → `NoValidFigis`。
pub fn derive_last_prices(figis: Option<&str>) -> Result<LastPriceQuery, ValidationError> {
    let raw = figis.ok_or(ValidationError::MissingParameter { name: "figis" })?;

    let identifiers: Vec<InstrumentId> = raw
        .split(',')
        .filter_map(|token| InstrumentId::parse(token).ok())
        .collect();

    if identifiers.is_empty() {
        return Err(ValidationError::NoValidFigis);
    }
    Ok(LastPriceQuery { identifiers })
}

/// # Summary
/// 解析 K 线查询并以 `now` 为终点派生时间窗口。
///
/// # Logic
/// 1. 依次检查 `figi` / `interval` / `days` 是否存在，报告第一个缺失的字段。
/// 2. 标识去空白后不得为空。
/// 3. 周期名大小写不敏感地匹配固定集合。
/// 4. `days` 按十进制整数解析，必须为正。
/// 5. 窗口两端都基于传入的同一个 `now`。
///
/// # Arguments
/// * `now`: 调用方为本次请求采样一次的当前时间。
pub fn derive_candles(
    figi: Option<&str>,
    interval: Option<&str>,
    days: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(CandleQuery, TimeWindow), ValidationError> {
    let figi = figi.ok_or(ValidationError::MissingParameter { name: "figi" })?;
    let interval = interval.ok_or(ValidationError::MissingParameter { name: "interval" })?;
    let days = days.ok_or(ValidationError::MissingParameter { name: "days" })?;

    let identifier = InstrumentId::parse(figi)?;
    let interval: IntervalKind = interval.parse()?;
    let window_days = parse_window_days(days)?;
    let window = TimeWindow::ending_at(now, window_days)?;

    Ok((
        CandleQuery {
            identifier,
            interval,
            window_days,
        },
        window,
    ))
}

fn parse_window_days(raw: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidDays {
        value: raw.to_string(),
    };
    let days: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if days <= 0 {
        return Err(invalid());
    }
    u32::try_from(days).map_err(|_| ValidationError::DaysOutOfRange { days })
}

/// # Summary
/// 解析投资组合查询。货币缺失或为空白时取默认值 (RUB)。
pub fn derive_portfolio(
    account_id: &str,
    currency: Option<&str>,
) -> Result<PortfolioQuery, ValidationError> {
    let account_id = account_id.trim();
    if account_id.is_empty() {
        return Err(ValidationError::EmptyAccountId);
    }

    let currency = match currency.map(str::trim) {
        None | Some("") => CurrencyKind::default(),
        Some(raw) => raw.parse()?,
    };

    Ok(PortfolioQuery {
        account_id: account_id.to_string(),
        currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use proptest::prelude::*;

    fn ids(query: &LastPriceQuery) -> Vec<&str> {
        query.identifiers.iter().map(InstrumentId::as_str).collect()
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 10, 15, 0).unwrap()
    }

    #[test]
    fn test_last_prices_keeps_order_and_duplicates() {
        let q = derive_last_prices(Some(" B ,A,, B ,\tC")).unwrap();
        assert_eq!(ids(&q), vec!["B", "A", "B", "C"]);
    }

    #[test]
    fn test_last_prices_missing_vs_empty() {
        assert_eq!(
            derive_last_prices(None),
            Err(ValidationError::MissingParameter { name: "figis" })
        );
        let err = derive_last_prices(Some("")).unwrap_err();
        assert_eq!(err, ValidationError::NoValidFigis);
        assert_eq!(err.to_string(), "No valid FIGIs provided.");
    }

    #[test]
    fn test_candles_reports_first_missing_field() {
        let now = fixed_now();
        let cases = [
            (None, Some("day"), Some("7"), "figi"),
            (Some("X"), None, Some("7"), "interval"),
            (Some("X"), Some("day"), None, "days"),
            (None, None, None, "figi"),
        ];
        for (figi, interval, days, missing) in cases {
            let err = derive_candles(figi, interval, days, now).unwrap_err();
            assert_eq!(err, ValidationError::MissingParameter { name: missing });
            assert!(err.to_string().contains(missing));
        }
    }

    #[test]
    fn test_candles_derives_exact_window() {
        let now = fixed_now();
        let (query, window) =
            derive_candles(Some(" BBG004730N88 "), Some("DAY"), Some("7"), now).unwrap();
        assert_eq!(query.identifier.as_str(), "BBG004730N88");
        assert_eq!(query.interval, IntervalKind::Day);
        assert_eq!(query.window_days, 7);
        assert_eq!(window.to, now);
        assert_eq!(window.to - window.from, TimeDelta::days(7));
    }

    #[test]
    fn test_candles_rejects_bad_values() {
        let now = fixed_now();
        assert!(matches!(
            derive_candles(Some("X"), Some("weekly"), Some("7"), now),
            Err(ValidationError::InvalidInterval { .. })
        ));
        assert_eq!(
            derive_candles(Some("  "), Some("day"), Some("7"), now).unwrap_err(),
            ValidationError::EmptyFigi
        );
        for days in ["0", "-3", "abc", "7.5", "", "0x10"] {
            assert!(
                matches!(
                    derive_candles(Some("X"), Some("day"), Some(days), now),
                    Err(ValidationError::InvalidDays { .. })
                ),
                "days={days:?} should be rejected"
            );
        }
        assert!(matches!(
            derive_candles(Some("X"), Some("day"), Some("99999999999"), now),
            Err(ValidationError::DaysOutOfRange { .. })
        ));
    }

    #[test]
    fn test_portfolio_currency_defaults_and_validation() {
        let q = derive_portfolio(" acc123 ", None).unwrap();
        assert_eq!(q.account_id, "acc123");
        assert_eq!(q.currency, CurrencyKind::Rub);
        assert_eq!(derive_portfolio("acc", Some(" ")).unwrap().currency, CurrencyKind::Rub);
        assert_eq!(derive_portfolio("acc", Some("EUR")).unwrap().currency, CurrencyKind::Eur);
        assert!(matches!(
            derive_portfolio("acc", Some("gbp")),
            Err(ValidationError::InvalidCurrency { .. })
        ));
        assert_eq!(derive_portfolio("   ", None), Err(ValidationError::EmptyAccountId));
    }

    proptest! {
        #[test]
        fn prop_separator_only_input_is_rejected(raw in "[ ,\t]{0,24}") {
            prop_assert_eq!(derive_last_prices(Some(raw.as_str())), Err(ValidationError::NoValidFigis));
        }

        #[test]
        fn prop_tokens_survive_in_order(tokens in proptest::collection::vec("[A-Z0-9]{1,12}", 1..8)) {
            let raw = tokens.iter().map(|t| format!(" {t} ")).collect::<Vec<_>>().join(",");
            let query = derive_last_prices(Some(raw.as_str())).unwrap();
            let parsed: Vec<String> = query.identifiers.iter().map(|i| i.to_string()).collect();
            prop_assert_eq!(parsed, tokens);
        }

        #[test]
        fn prop_window_width_matches_days(days in 1u32..36_500) {
            let (_, window) = derive_candles(Some("X"), Some("hour"), Some(days.to_string().as_str()), fixed_now()).unwrap();
            prop_assert_eq!(window.to - window.from, TimeDelta::days(i64::from(days)));
        }
    }
}
