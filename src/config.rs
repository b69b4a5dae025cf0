use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub admin_email: String,
    pub admin_password: String,
    pub currency: String,
    pub bcrypt_cost: u32,
    pub max_upload_bytes: usize,
    pub razorpay: RazorpayConfig,
    pub cloudinary: Option<CloudinaryConfig>,
}

#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
}

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .field("currency", &self.currency)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("razorpay_key_id", &self.razorpay.key_id)
            .field("razorpay_base_url", &self.razorpay.base_url)
            .field("cloudinary_configured", &self.cloudinary.is_some())
            .finish()
    }
}

/// Raised when a deployment leaves a security-critical setting unset.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

impl Config {
    /// Reads the process environment (and `.env`, when present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. `JWT_SECRET`, `ADMIN_EMAIL` and
    /// `ADMIN_PASSWORD` have no fallback.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_warn = |key: &str, fallback: &str| {
            lookup(key).unwrap_or_else(|| {
                warn!("{} not set, using fallback value", key);
                fallback.to_string()
            })
        };

        let cloudinary = match (
            lookup("CLOUDINARY_CLOUD_NAME"),
            lookup("CLOUDINARY_API_KEY"),
            lookup("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                base_url: lookup("CLOUDINARY_BASE_URL").unwrap_or_else(|| "https://api.cloudinary.com/v1_1".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", 5000),
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_secs: parse_or(&lookup, "TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS),
            admin_email: required("ADMIN_EMAIL")?,
            admin_password: required("ADMIN_PASSWORD")?,
            currency: lookup("CURRENCY").unwrap_or_else(|| "INR".to_string()),
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            razorpay: RazorpayConfig {
                key_id: or_warn("RAZORPAY_KEY_ID", ""),
                key_secret: or_warn("RAZORPAY_KEY_SECRET", ""),
                base_url: lookup("RAZORPAY_BASE_URL").unwrap_or_else(|| "https://api.razorpay.com/v1".to_string()),
            },
            cloudinary,
        })
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
