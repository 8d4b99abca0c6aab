use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Username of the single owner every import is attributed to.
    pub default_username: String,
    pub import_batch_size: usize,
    pub import_source: String,
    pub preview_rows: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let import_batch_size = parse_env("IMPORT_BATCH_SIZE", 50usize)?;
        if import_batch_size == 0 {
            bail!("IMPORT_BATCH_SIZE must be at least 1");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            default_username: std::env::var("DEFAULT_USERNAME")
                .unwrap_or_else(|_| "default".to_string()),
            import_batch_size,
            import_source: std::env::var("IMPORT_SOURCE").unwrap_or_else(|_| "csv".to_string()),
            preview_rows: parse_env("PREVIEW_ROWS", 20usize)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
