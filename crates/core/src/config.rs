use serde::{Deserialize, Serialize};
use std::fmt;

/// 全局应用配置，进程启动时加载一次，此后只读。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

/// 后端客户端选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// 真实券商 REST 网关
    #[default]
    Rest,
    /// 进程内演示数据，不发起网络请求
    Demo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub mode: BackendMode,
    pub base_url: String,
    /// 访问令牌，启动时必须非空
    pub token: Secret,
    /// 随请求上报的应用名 (`x-app-name`)
    pub app_name: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            mode: BackendMode::Rest,
            base_url: "https://invest-public-api.tinkoff.ru/rest".to_string(),
            token: Secret::default(),
            app_name: "quotegate".to_string(),
        }
    }
}

/// # Summary
/// 敏感字符串包装。`Debug` / `Display` 永远不输出原文。
///
/// # Invariants
/// - 只有 `expose()` 能取得原文，调用点应限于构造后端鉴权头与脱敏比对。
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// # Summary
    /// 启动日志使用的掩码形式。
    ///
    /// # Logic
    /// 只保留末尾 `min(4, 长度 / 4)` 个字符，并附上总长度；短于 4 个字符时不泄露任何原文。
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let shown = (chars.len() / 4).min(4);
        let tail: String = chars[chars.len() - shown..].iter().collect();
        format!("***{tail} ({} chars)", chars.len())
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
