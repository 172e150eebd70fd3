//! # `quotegate-core` - 网关领域核心
//!
//! 定义行情网关的请求值对象、参数校验错误、后端 RPC 客户端端口 (`BrokerClient`)
//! 以及进程级配置。本 crate 不包含任何 I/O 实现。

pub mod common;
pub mod config;

pub mod market {
    pub mod entity;
    pub mod error;
    pub mod port;
}

#[cfg(feature = "test-utils")]
pub mod testing;
