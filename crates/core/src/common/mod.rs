//! 跨模块共享的基础设施抽象。

pub mod time;

pub use time::{FixedClock, SystemClock, TimeProvider};
