//! # `quotegate-api` - 行情 HTTP 网关
//!
//! 接收松散类型的 REST 查询，派生并校验参数，转换为后端 RPC 的强类型调用，
//! 再把后端数值错误码映射为 HTTP 状态码与稳定的 JSON 错误信封。
//!
//! ## 单请求流水线
//! Router → [`params`] (派生/校验) → [`gateway`] (单次后端调用) → [`error`] (错误分类) → Router (写回响应)

pub mod error;
pub mod gateway;
pub mod params;
pub mod routes;
pub mod server;
pub mod types;
