//! 统一配置中心
//!
//! 配置按以下优先级合并（后者覆盖前者）：
//! - 内置默认值
//! - `CHAT_CONFIG_FILE` 指定的配置文件（按扩展名识别 TOML/YAML/JSON）
//! - `CHAT_` 前缀的环境变量，层级用 `__` 分隔，例如 `CHAT_SERVER__PORT=9090`
//!
//! 合并结果在返回前经过 `validator` 校验。

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::{Validate, ValidationError};

/// 配置文件路径环境变量
pub const CONFIG_FILE_ENV: &str = "CHAT_CONFIG_FILE";
/// 环境变量前缀
pub const ENV_PREFIX: &str = "CHAT_";

const REDACTED: &str = "redacted";

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub auth: AuthConfig,
    #[validate(nested)]
    pub storage: StorageConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// 单个请求的处理时限
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8080,
            request_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 认证配置：RS256 密钥对、令牌有效期和密码哈希强度
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// PEM 格式的 RSA 私钥
    #[validate(length(min = 1))]
    pub private_key_path: String,
    /// PEM 格式的 RSA 公钥
    #[validate(length(min = 1))]
    pub public_key_path: String,
    #[validate(range(min = 1))]
    pub token_ttl_minutes: u64,
    #[validate(length(min = 1))]
    pub issuer: String,
    #[validate(range(min = 4, max = 31))]
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            private_key_path: "app.rsa".into(),
            public_key_path: "app.rsa.pub".into(),
            token_ttl_minutes: 100,
            issuer: "chat".into(),
            bcrypt_cost: 12,
        }
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 进程内存储，重启后数据丢失
    #[default]
    Memory,
    Postgres,
}

/// 存储配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_storage"))]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// `postgres` 后端必填
    #[validate(url)]
    pub database_url: Option<String>,
    #[validate(range(min = 1))]
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 5,
        }
    }
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ValidationError> {
    if storage.backend == StorageBackend::Postgres && storage.database_url.is_none() {
        let mut err = ValidationError::new("database_url_required");
        err.message = Some("postgres backend requires storage.database_url".into());
        return Err(err);
    }
    Ok(())
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

impl AppConfig {
    /// 按默认值、配置文件、环境变量的顺序加载并校验配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// 组装配置源，但不提取
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            if path.ends_with(".yml") || path.ends_with(".yaml") {
                figment = figment.merge(Yaml::file(path));
            } else if path.ends_with(".json") {
                figment = figment.merge(Json::file(path));
            } else {
                figment = figment.merge(Toml::file(path));
            }
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// 日志安全的摘要，数据库连接串中的口令被隐藏
    pub fn sanitize(&self) -> String {
        let mut redacted = self.clone();
        if let Some(database_url) = redacted.storage.database_url.as_mut() {
            *database_url = redact_url(database_url);
        }
        format!("{redacted:?}")
    }
}

/// 隐藏连接串中的密码；无法解析的连接串整体隐藏。
fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if !url.cannot_be_a_base() => {
            if url.password().is_some() {
                let _ = url.set_password(Some(REDACTED));
            }
            url.to_string()
        }
        _ => REDACTED.to_owned(),
    }
}
