use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub max_connections: u32,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

const DB_PART_VARS: [&str; 5] = ["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME", "DB_PORT"];

/// Builds a Postgres URL from discrete connection settings.
pub fn compose_database_url(host: &str, user: &str, password: &str, name: &str, port: &str) -> String {
    format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
}

/// Masks the password of a connection URL so it can be logged.
pub fn redact_database_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    let Some(at) = url.rfind('@').filter(|&at| at > scheme_end) else {
        return url.to_string();
    };
    match url[scheme_end..at].find(':') {
        Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at..]),
        None => url.to_string(),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which returns `None` for unset keys.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            database_url: database_url(&lookup)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            data_path: lookup("SWIFT_DATA_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data.csv")),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            rate_limit_per_second: parse_or(&lookup, "RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_or(&lookup, "RATE_LIMIT_BURST", 20)?,
        };

        if config.max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be at least 1");
        }
        if config.rate_limit_per_second == 0 || config.rate_limit_burst == 0 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND and RATE_LIMIT_BURST must be at least 1");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Database URL: {}", redact_database_url(&config.database_url));
        tracing::debug!("Data file: {}", config.data_path.display());
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn database_url<F>(lookup: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").or_else(|| lookup("DB_URL")) {
        if url.trim().is_empty() {
            anyhow::bail!("DATABASE_URL cannot be empty");
        }
        if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
            anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
        }
        return Ok(url);
    }

    let parts: Vec<String> = DB_PART_VARS
        .iter()
        .map(|key| lookup(key).filter(|v| !v.trim().is_empty()))
        .collect::<Option<_>>()
        .ok_or_else(|| {
            anyhow::anyhow!(
                "DATABASE_URL or all of {} environment variables required",
                DB_PART_VARS.join(", ")
            )
        })?;

    Ok(compose_database_url(
        &parts[0], &parts[1], &parts[2], &parts[3], &parts[4],
    ))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
