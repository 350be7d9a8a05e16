/*
 * Responsibility
 * - Environment/config loading (issuer, role pool ids, limits)
 * - Validation of required values (fail fast when missing)
 */
use std::fmt;

use url::Url;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Identity-provider user pool ids, one per application role.
#[derive(Debug, Clone)]
pub struct RolePools {
    pub dispatcher: String,
    pub admin: String,
    pub responder: String,
    pub ambulance_provider: String,
    pub hospital_admin: String,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Issuer base URL the JWKS endpoint hangs off of.
    pub auth_issuer: String,

    pub role_pools: RolePools,

    /// Default `limit` for paginated queries when the client sends none.
    pub default_query_limit: u32,

    /// TTL for the in-memory JWKS cache. Zero disables caching.
    pub jwks_cache_ttl_seconds: u64,

    /// Upper bound on directory list-users page fetches per call.
    pub max_list_pages: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let auth_issuer =
            std::env::var("AUTH_ISSUER").map_err(|_| ConfigError::Missing("AUTH_ISSUER"))?;
        Url::parse(&auth_issuer).map_err(|_| ConfigError::Invalid("AUTH_ISSUER"))?;

        let role_pools = RolePools {
            dispatcher: require("DISPATCHER_POOL_ID")?,
            admin: require("ADMIN_POOL_ID")?,
            responder: require("RESPONDER_POOL_ID")?,
            ambulance_provider: require("AMBULANCE_PROVIDER_POOL_ID")?,
            hospital_admin: require("HOSPITAL_ADMIN_POOL_ID")?,
            user: require("USER_POOL_ID")?,
        };

        let default_query_limit = std::env::var("DB_DEFAULT_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(20);

        let jwks_cache_ttl_seconds = std::env::var("JWKS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(300);

        let max_list_pages = std::env::var("MAX_LIST_PAGES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(50);

        Ok(Self {
            auth_issuer,
            role_pools,
            default_query_limit,
            jwks_cache_ttl_seconds,
            max_list_pages,
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key))
}
