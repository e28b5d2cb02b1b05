use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::security::auth;

/// Credentials for the hosted image backend. Present only when all three
/// `CLOUDINARY_*` credentials are set.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: Option<String>,
}

/// Process-wide configuration, read once from the environment at startup.
pub struct SiteConfig {
    /// bcrypt hash of `ADMIN_PASSWORD`.
    pub admin_password_hash: String,
    pub session_secret: String,
    pub session_ttl_hours: i64,
    pub login_rate_limit: u64,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub port: Option<u16>,
    /// Take the client address from proxy headers. Only safe behind a
    /// reverse proxy that overwrites them.
    pub trust_proxy_headers: bool,
    pub cloudinary: Option<CloudinaryConfig>,
}

fn required(name: &str) -> Result<String, String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("Missing required environment variable: {}", name)),
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match optional(name) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| format!("Invalid value for {}: {}", name, v)),
        None => Ok(default),
    }
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, String> {
        let password = required("ADMIN_PASSWORD")?;
        let session_secret = required("SESSION_SECRET")?;

        let cloudinary = match (
            optional("CLOUDINARY_CLOUD_NAME"),
            optional("CLOUDINARY_API_KEY"),
            optional("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: optional("CLOUDINARY_FOLDER"),
            }),
            (None, None, None) => None,
            _ => {
                log::warn!("Cloudinary credentials are incomplete; using local uploads");
                None
            }
        };

        Ok(SiteConfig {
            admin_password_hash: auth::hash_password(&password)?,
            session_secret,
            session_ttl_hours: parse_or("SESSION_TTL_HOURS", 24i64)?.max(1),
            login_rate_limit: parse_or("LOGIN_RATE_LIMIT", 10u64)?.max(1),
            data_dir: PathBuf::from(optional("DATA_DIR").unwrap_or_else(|| "data".into())),
            uploads_dir: PathBuf::from(
                optional("UPLOADS_DIR").unwrap_or_else(|| "website/uploads".into()),
            ),
            port: optional("PORT").map(|p| p.trim().parse()).transpose().map_err(
                |e: std::num::ParseIntError| format!("Invalid value for PORT: {}", e),
            )?,
            trust_proxy_headers: parse_or("TRUST_PROXY_HEADERS", false)?,
            cloudinary,
        })
    }

    /// Rocket `secret_key`: 256-bit hex digest of `SESSION_SECRET`.
    pub fn secret_key_hex(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.session_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}
