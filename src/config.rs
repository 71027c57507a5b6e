use crate::error::{Error, Result};
use crate::middleware::auth::AccessPolicy;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Signing key used when `JWT_SECRET` is unset outside production.
/// Anyone who knows this constant can mint tokens.
pub const FALLBACK_JWT_SECRET: &str = "fallback-secret-key-change-in-production";

const DEFAULT_PORT: u16 = 3001;
/// One year.
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;
const DEFAULT_DATABASE_URL: &str = "sqlite://database.sqlite";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl FromStr for AppEnv {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub app_env: AppEnv,
    pub jwt_secret: String,
    pub jwt_secret_is_fallback: bool,
    pub token_ttl_hours: i64,
    pub frontend_url: String,
    pub users_access: AccessPolicy,
    pub diligences_access: AccessPolicy,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let app_env: AppEnv = parse_or(&get, "APP_ENV", AppEnv::Development)?;

        let (jwt_secret, jwt_secret_is_fallback) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if app_env == AppEnv::Production => {
                return Err(Error::Config(
                    "JWT_SECRET must be set when APP_ENV=production".to_string(),
                ))
            }
            None => (FALLBACK_JWT_SECRET.to_string(), true),
        };

        let server_address = match get("SERVER_ADDRESS") {
            Some(addr) => addr,
            None => {
                let port: u16 = parse_or(&get, "BACKEND_PORT", DEFAULT_PORT)?;
                format!("0.0.0.0:{}", port)
            }
        };

        let token_ttl_hours: i64 = parse_or(&get, "TOKEN_TTL_HOURS", 24)?;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            return Err(Error::Config(format!(
                "Invalid value for TOKEN_TTL_HOURS: must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }

        let seed_admin = match (get("SEED_ADMIN_EMAIL"), get("SEED_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedAdmin {
                email,
                password,
                name: get("SEED_ADMIN_NAME").unwrap_or_else(|| "Administrateur".to_string()),
            }),
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            server_address,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            app_env,
            jwt_secret,
            jwt_secret_is_fallback,
            token_ttl_hours,
            frontend_url: get("FRONTEND_URL").unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            users_access: parse_or(&get, "USERS_ACCESS", AccessPolicy::Public)?,
            diligences_access: parse_or(&get, "DILIGENCES_ACCESS", AccessPolicy::Public)?,
            seed_admin,
            log_format: parse_or(&get, "LOG_FORMAT", LogFormat::Text)?,
        })
    }
}

fn parse_or<T, G>(get: &G, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}
