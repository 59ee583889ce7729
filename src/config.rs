use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub telegram: Telegram,
    pub queue: Queue,
    pub db: Db,
    #[serde(default = "default_server_addr")]
    pub server_addr: SocketAddr,
    #[serde(default)]
    pub services: Services,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    pub url: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Custom endpoint for SQS-compatible services.
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default = "default_wait_time_seconds")]
    pub wait_time_seconds: i32,
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Db {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Services {
    #[serde(default)]
    pub address_api: AddressApi,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AddressApi {
    pub url: String,
}

impl Default for AddressApi {
    fn default() -> Self {
        Self { url: "https://address.md".to_string() }
    }
}

fn default_server_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

const fn default_wait_time_seconds() -> i32 {
    20
}

const fn default_retry_delay_seconds() -> u64 {
    10
}

const fn default_pool_size() -> u32 {
    4
}

impl Config {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        serde_yaml::from_reader(file)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from environment-style variables. Every required
    /// variable must be present and non-empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional =
            |name: &str| lookup(name).filter(|value| !value.is_empty());
        let required = |name: &str| {
            optional(name).ok_or_else(|| {
                anyhow::anyhow!("Environment variable {name} is missing")
            })
        };

        Ok(Self {
            telegram: Telegram { token: required("TELEGRAM_BOT_TOKEN")? },
            queue: Queue {
                url: required("SQS_QUEUE_URL")?,
                region: required("AWS_REGION")?,
                access_key_id: required("AWS_ACCESS_KEY_ID")?,
                secret_access_key: required("AWS_SECRET_ACCESS_KEY")?,
                endpoint_url: optional("SQS_ENDPOINT_URL"),
                wait_time_seconds: default_wait_time_seconds(),
                retry_delay_seconds: default_retry_delay_seconds(),
            },
            db: Db {
                url: required("POSTGRES_CONN_STR")?,
                pool_size: optional("DB_POOL_SIZE")
                    .map(|s| s.parse::<u32>())
                    .transpose()
                    .context("DB_POOL_SIZE is not a number")?
                    .unwrap_or_else(default_pool_size),
            },
            server_addr: optional("METRICS_ADDR")
                .map(|s| s.parse::<SocketAddr>())
                .transpose()
                .context("METRICS_ADDR is not a socket address")?
                .unwrap_or_else(default_server_addr),
            services: Services {
                address_api: optional("ADDRESS_API_URL")
                    .map(|url| AddressApi { url })
                    .unwrap_or_default(),
            },
        })
    }
}
