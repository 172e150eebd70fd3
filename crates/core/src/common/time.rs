use chrono::{DateTime, Utc};

/// # Summary
/// 时钟接口，隔离物理系统时间。
/// 网关每个请求只调用一次 `now()`，派生出的时间窗口两端都基于这一次采样。
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 生产环境时钟，直接读取操作系统时间。
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeProvider for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// # Summary
/// 固定时钟，供测试断言精确的窗口边界。
///
/// # Invariants
/// - 构造后时间不再变化，所有请求看到同一个 `now`。
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    current: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { current: at }
    }
}

impl TimeProvider for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_never_moves() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start);
        assert!(SystemClock.now() > start);
    }
}
