use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder secret shipped by early deployments; never accepted
pub const PLACEHOLDER_SECRET: &str = "your-secret-key-change-in-production";

/// Secrets shorter than this are accepted with a warning
const RECOMMENDED_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Value of `Access-Control-Allow-Origin`; `*` allows any origin
    #[serde(default = "default_cors_origin")]
    pub cors_allowed_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origin: default_cors_origin(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenConfig {
    /// HMAC secret for entitlement credentials. Required.
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
    /// Gumroad access token. Without it no real purchase can be verified.
    pub access_token: Option<String>,
    #[serde(default = "default_payment_base_url")]
    pub base_url: String,
    #[serde(default = "default_payment_timeout")]
    pub timeout_seconds: u64,
    /// When set, sales for any other product are rejected
    pub product_id: Option<String>,
    /// Accept the development bypass reference. Only honoured while
    /// `access_token` is absent.
    #[serde(default)]
    pub dev_bypass: bool,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_payment_base_url(),
            timeout_seconds: default_payment_timeout(),
            product_id: None,
            dev_bypass: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_payment_base_url() -> String {
    "https://api.gumroad.com/v2".to_string()
}

fn default_payment_timeout() -> u64 {
    10
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Signing secret of a validated configuration
    pub fn signing_secret(&self) -> anyhow::Result<&str> {
        self.token
            .secret
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("token.secret is not configured"))
    }
}

/// Load configuration from an optional TOML file, then the environment.
///
/// Environment keys use the `ESTIMATE_GATE` prefix with `__` separators,
/// e.g. `ESTIMATE_GATE__TOKEN__SECRET`. The deployment variables
/// `JWT_SECRET` and `GUMROAD_ACCESS_TOKEN` override both.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix("ESTIMATE_GATE")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("token.secret", non_empty_env("JWT_SECRET"))?
        .set_override_option("payment.access_token", non_empty_env("GUMROAD_ACCESS_TOKEN"))?
        .build()?;

    let mut cfg: Config = config.try_deserialize()?;
    normalize_config(&mut cfg);
    validate_config(&cfg)?;

    Ok(cfg)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Blank optional values count as absent
fn normalize_config(cfg: &mut Config) {
    for value in [
        &mut cfg.token.secret,
        &mut cfg.payment.access_token,
        &mut cfg.payment.product_id,
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            *value = None;
        }
    }
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    let Some(secret) = cfg.token.secret.as_deref() else {
        anyhow::bail!("token.secret must be configured (or set JWT_SECRET)");
    };

    if secret == PLACEHOLDER_SECRET {
        anyhow::bail!("token.secret is still the placeholder value; configure a real secret");
    }

    if secret.len() < RECOMMENDED_SECRET_LEN {
        tracing::warn!(
            length = secret.len(),
            "token.secret is shorter than {} bytes",
            RECOMMENDED_SECRET_LEN
        );
    }

    if cfg.server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    if !(1..=60).contains(&cfg.payment.timeout_seconds) {
        anyhow::bail!(
            "payment.timeout_seconds must be between 1 and 60, got {}",
            cfg.payment.timeout_seconds
        );
    }

    if let Err(e) = reqwest::Url::parse(&cfg.payment.base_url) {
        anyhow::bail!("payment.base_url '{}' is invalid: {}", cfg.payment.base_url, e);
    }

    if cfg.payment.dev_bypass && cfg.payment.access_token.is_some() {
        tracing::warn!("payment.dev_bypass is ignored because payment.access_token is configured");
    }

    Ok(())
}
