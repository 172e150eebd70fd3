//! 启动配置加载: 内置默认值 → 可选配置文件 → `QUOTEGATE__*` 环境变量 → 令牌环境变量。

use config::{Config, ConfigError, Environment, File};
use quotegate_core::config::AppConfig;
use std::path::Path;

/// 承载券商令牌的环境变量
pub const TOKEN_ENV: &str = "TINKOFF_API_TOKEN";

/// # Summary
/// 加载应用配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 作为最底层来源。
/// 2. 叠加 `file` (不存在时跳过)。
/// 3. 叠加 `QUOTEGATE__SECTION__KEY` 形式的环境变量。
/// 4. `token` 非空时覆盖 `backend.token`。
///
/// # Returns
/// 来源解析失败或字段类型不匹配时返回 `ConfigError`；令牌是否为空由调用方判定。
pub fn load_config(file: &Path, token: Option<String>) -> Result<AppConfig, ConfigError> {
    let token = token.filter(|t| !t.trim().is_empty());

    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix("QUOTEGATE")
                .prefix_separator("__")
                .separator("__"),
        )
        .set_override_option("backend.token", token)?
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quotegate_core::config::BackendMode;
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml"), None).unwrap();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.backend.mode, BackendMode::Rest);
        assert!(config.backend.token.is_empty());
    }

    #[test]
    fn test_file_values_and_token_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quotegate.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 8080\n\n[backend]\nmode = \"demo\"\ntoken = \"from-file\"\n"
        )
        .unwrap();

        let config = load_config(&path, None).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.backend.mode, BackendMode::Demo);
        assert_eq!(config.backend.token.expose(), "from-file");

        let config = load_config(&path, Some("from-env".into())).unwrap();
        assert_eq!(config.backend.token.expose(), "from-env");

        let config = load_config(&path, Some("   ".into())).unwrap();
        assert_eq!(config.backend.token.expose(), "from-file");
    }
}
