//! console-config - 配置加载库
//!
//! 加载顺序：`{dir}/default.toml` → `{dir}/{APP_ENV}.toml` → `APP__` 前缀环境变量
//! （以 `__` 分隔层级，例如 `APP__SERVER__PORT=9000`）

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

use secrecy::Secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 启动时自动执行迁移
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    // 根据环境自动调整连接池大小
    // 开发环境: 10, 生产环境: 50
    match std::env::var("APP_ENV").as_deref() {
        Ok("production") => 50,
        _ => 10,
    }
}

fn default_true() -> bool {
    true
}

/// Redis 配置
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Secret<String>,
}

/// JWT 配置
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    /// token 有效期（秒），同时作为缓存中登录态的 TTL
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

fn default_expires_in() -> u64 {
    7200
}

fn default_issuer() -> String {
    "console-admin".to_string()
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
    /// 为空时允许任意来源（仅限开发环境）
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    1024 * 1024
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_enabled: true,
        }
    }
}

/// 邮件配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: Secret<String>,
    pub from_email: String,
    pub from_name: String,
    #[serde(default)]
    pub use_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// 图形验证码配置
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    #[serde(default = "default_captcha_size")]
    pub size: usize,
    #[serde(default = "default_captcha_width")]
    pub width: u32,
    #[serde(default = "default_captcha_height")]
    pub height: u32,
    #[serde(default = "default_captcha_font_size")]
    pub font_size: u32,
    /// 干扰线条数目
    #[serde(default = "default_captcha_noise")]
    pub noise: usize,
    /// 过滤掉容易混淆的字符
    #[serde(default = "default_captcha_ignore_chars")]
    pub ignore_chars: String,
    #[serde(default = "default_true")]
    pub color: bool,
    #[serde(default = "default_captcha_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_captcha_size() -> usize {
    4
}

fn default_captcha_width() -> u32 {
    100
}

fn default_captcha_height() -> u32 {
    50
}

fn default_captcha_font_size() -> u32 {
    45
}

fn default_captcha_noise() -> usize {
    3
}

fn default_captcha_ignore_chars() -> String {
    "0o1i".to_string()
}

fn default_captcha_ttl_secs() -> u64 {
    300
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            size: default_captcha_size(),
            width: default_captcha_width(),
            height: default_captcha_height(),
            font_size: default_captcha_font_size(),
            noise: default_captcha_noise(),
            ignore_chars: default_captcha_ignore_chars(),
            color: true,
            ttl_secs: default_captcha_ttl_secs(),
        }
    }
}

/// 邮箱验证码配置
#[derive(Debug, Clone, Deserialize)]
pub struct VerificationConfig {
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_code_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_code_length() -> usize {
    6
}

fn default_code_ttl_secs() -> u64 {
    600
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            ttl_secs: default_code_ttl_secs(),
        }
    }
}

/// 启动阶段连接外部依赖的重试参数
#[derive(Debug, Clone, Deserialize)]
pub struct StartupConfig {
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_connect_attempts() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            connect_attempts: default_connect_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    pub email: EmailConfig,
    #[serde(default)]
    pub captcha: CaptchaConfig,
    #[serde(default)]
    pub verification: VerificationConfig,
    #[serde(default)]
    pub startup: StartupConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

/// JWT 密钥最小长度（生产环境）
const MIN_JWT_SECRET_LEN: usize = 32;

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("APP__").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        use secrecy::ExposeSecret;

        if self.is_production() && self.jwt.secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "jwt.secret must be at least {} characters in production",
                MIN_JWT_SECRET_LEN
            )));
        }
        if self.jwt.expires_in == 0 {
            return Err(ConfigError::Invalid("jwt.expires_in must be positive".into()));
        }
        if self.startup.initial_backoff_ms > self.startup.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "startup.initial_backoff_ms must not exceed startup.max_backoff_ms".into(),
            ));
        }
        if self.captcha.size == 0 {
            return Err(ConfigError::Invalid("captcha.size must be positive".into()));
        }
        if self.verification.code_length == 0 || self.verification.code_length > 18 {
            return Err(ConfigError::Invalid(
                "verification.code_length must be within 1..=18".into(),
            ));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
