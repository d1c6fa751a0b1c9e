//! Bridge Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use k3_signing::headers::DEFAULT_USER_AGENT;
use k3_signing::{AppIdentity, RequestSigner};
use zeroize::Zeroizing;

use crate::inventory::WarehouseConfig;

/// Bridge configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// K3 Cloud site root (e.g., "http://erp.example.com/K3Cloud")
    pub server_url: String,

    /// Data center (account set) id
    pub acct_id: String,

    /// Application id issued by the integration console
    pub app_id: String,

    /// Application secret
    pub app_secret: Zeroizing<String>,

    /// Integration user name
    pub user_name: String,

    /// Locale id (default: 2052 = zh-CN)
    pub lcid: u32,

    /// Organisation number (default: 0)
    pub org_num: u64,

    /// User-Agent sent with every call
    pub user_agent: String,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout_secs: u64,

    /// Primary inventory snapshot file
    pub cache_path: PathBuf,

    /// Extra copies of the snapshot written on sync
    pub cache_mirrors: Vec<PathBuf>,

    /// Snapshot lifetime in seconds (default: 86400 = 24 hours)
    pub cache_ttl_secs: u64,

    /// Interval between syncs in watch mode (default: 86400 = 24 hours)
    pub sync_interval_secs: u64,

    /// Warehouse codes per dashboard group
    pub warehouses: WarehouseConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Blank values count as unset, so `K3_APP_ID=` fails like a missing
    /// variable and `K3_ACCT_ID=` falls back to its default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_url: env_var("K3_SERVER_URL")
                .unwrap_or_else(|| "http://39.108.116.74/K3Cloud".into()),
            acct_id: env_var("K3_ACCT_ID").unwrap_or_else(|| "67bc259cd48a3e".into()),
            app_id: env_var("K3_APP_ID").context("K3_APP_ID must be set")?,
            app_secret: Zeroizing::new(
                env_var("K3_APP_SECRET").context("K3_APP_SECRET must be set")?,
            ),
            user_name: env_var("K3_USER_NAME").unwrap_or_else(|| "灵泽万川".into()),
            lcid: env_parse("K3_LCID").unwrap_or(2052),
            org_num: env_parse("K3_ORG_NUM").unwrap_or(0),
            user_agent: env_var("K3_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            request_timeout_secs: env_parse("K3_REQUEST_TIMEOUT_SECS").unwrap_or(30),
            cache_path: env_var("K3_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public/inventory-cache.json")),
            // Set but empty disables mirroring.
            cache_mirrors: env::var("K3_CACHE_MIRRORS")
                .map(|s| parse_path_list(&s))
                .unwrap_or_else(|_| vec![PathBuf::from("dist/inventory-cache.json")]),
            cache_ttl_secs: env_parse("K3_CACHE_TTL_SECS").unwrap_or(86400), // 24 hours
            sync_interval_secs: env_parse("K3_SYNC_INTERVAL_SECS").unwrap_or(86400),
            warehouses: WarehouseConfig::from_env(),
        })
    }

    /// Identity used to sign requests.
    pub fn identity(&self) -> AppIdentity {
        AppIdentity {
            app_id: self.app_id.clone(),
            app_secret: self.app_secret.clone(),
            acct_id: self.acct_id.clone(),
            user_name: self.user_name.clone(),
            lcid: self.lcid,
            org_num: self.org_num,
        }
    }

    /// Build a request signer for this identity.
    pub fn signer(&self) -> Result<RequestSigner> {
        RequestSigner::new(self.identity(), self.user_agent.clone())
            .context("Failed to decode gateway credentials from K3_APP_ID")
    }

    /// Create a default configuration for testing.
    ///
    /// Points at a local gateway; callers override `server_url` with the
    /// address of their test server.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080/K3Cloud".into(),
            acct_id: "test-acct".into(),
            app_id: "100001_AAECAwQFBgcICQoLDA0ODxAREhMUFRYX".into(),
            app_secret: Zeroizing::new("test-app-secret".into()),
            user_name: "tester".into(),
            lcid: 2052,
            org_num: 0,
            user_agent: DEFAULT_USER_AGENT.into(),
            request_timeout_secs: 5,
            cache_path: PathBuf::from("inventory-cache.json"),
            cache_mirrors: Vec::new(),
            cache_ttl_secs: 86400,
            sync_interval_secs: 86400,
            warehouses: WarehouseConfig::default(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_url", &self.server_url)
            .field("acct_id", &self.acct_id)
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("user_name", &self.user_name)
            .field("lcid", &self.lcid)
            .field("org_num", &self.org_num)
            .field("user_agent", &self.user_agent)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cache_path", &self.cache_path)
            .field("cache_mirrors", &self.cache_mirrors)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("sync_interval_secs", &self.sync_interval_secs)
            .field("warehouses", &self.warehouses)
            .finish()
    }
}

/// Read a variable, treating blank values as unset.
pub fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_var(key).and_then(|v| v.trim().parse().ok())
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn parse_path_list(s: &str) -> Vec<PathBuf> {
    parse_list(s).into_iter().map(PathBuf::from).collect()
}
