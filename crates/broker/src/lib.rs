//! # `quotegate-broker` - 券商后端客户端实现
//!
//! 提供 `BrokerClient` 端口的两个具体实现:
//! - [`rest::RestBrokerClient`]: 通过券商公开 REST 网关访问真实后端
//! - [`demo::DemoBrokerClient`]: 进程内演示数据，本地联调与压测使用

pub mod demo;
pub mod rest;
