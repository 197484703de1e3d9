use serde::{Deserialize, Serialize};

/// 全局应用配置
///
/// 所有字段带默认值，配置文件可以只覆盖其中一部分。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ingest: IngestConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JWT 签名密钥
    pub jwt_secret: String,
    /// `/internal/refresh-all` 的触发密钥（外部调度器持有）
    pub refresh_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 摄取任务跟踪的股票代码全集
    pub symbols: Vec<String>,
    /// 回看窗口天数，首次摄取时拉取的最大历史跨度
    pub lookback_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// 回归模型工件 (JSON) 的路径，进程启动时一次性加载
    pub artifact_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            ingest: IngestConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "YOUR_SUPER_SECRET_KEY".to_string(), // Default for dev, should be overwritten by config
            refresh_secret: "YOUR_REFRESH_SECRET".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            symbols: [
                "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "NVDA", "META", "JNJ", "MA", "NFLX",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            lookback_days: 365,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: "data/next_close_model.json".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.jwt_secret, "YOUR_SUPER_SECRET_KEY");
        assert_eq!(config.database.data_dir, "data");
        assert_eq!(config.ingest.symbols.len(), 10);
        assert_eq!(config.ingest.lookback_days, 365);
        assert_eq!(config.model.artifact_path, "data/next_close_model.json");
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        // 配置文件只覆盖一部分字段，其余落回默认值
        let toml = r#"
            [server]
            port = 9000
        "#;
        let config: AppConfig = toml::from_str(toml).expect("valid toml");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.ingest.lookback_days, 365);
    }
}
