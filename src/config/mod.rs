use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Listen address of the relay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream origin and the fetcher's transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL every relative resource path is joined onto
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_connect_timeout", with = "duration_serde::duration")]
    pub connect_timeout: Duration,
    #[serde(default = "default_request_timeout", with = "duration_serde::duration")]
    pub request_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Settings for the relay core itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Host written into rewritten manifest URLs
    #[serde(default = "default_public_host")]
    pub public_host: String,
    /// Port written into rewritten manifest URLs; falls back to `web.port`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    /// Where `[IN]`/`[OUT]`/`[TRACK SWITCH]` event lines are written
    #[serde(default)]
    pub event_output: EventOutput,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutput {
    #[default]
    Stdout,
    Stderr,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_connect_timeout() -> Duration {
    duration_serde::parse_default(DEFAULT_CONNECT_TIMEOUT)
}

fn default_request_timeout() -> Duration {
    duration_serde::parse_default(DEFAULT_REQUEST_TIMEOUT)
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_public_host() -> String {
    DEFAULT_PUBLIC_HOST.to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            public_host: default_public_host(),
            public_port: None,
            event_output: EventOutput::default(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the optional TOML file, then `HLS_RELAY_*` env vars.
    ///
    /// A missing config file is not an error. CLI overrides are applied by the caller.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Self::base_figment();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            } else {
                debug!("Config file {} not found, using defaults", path.display());
            }
        }

        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Figment seeded with built-in defaults
    pub fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        figment
            .extract()
            .context("Failed to extract configuration")
    }

    /// Parse and validate the upstream base URL
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.upstream.base_url.trim();
        if raw.is_empty() {
            bail!("Upstream base URL is not configured");
        }

        let url = Url::parse(raw).with_context(|| format!("Invalid upstream base URL: {raw}"))?;
        match url.scheme() {
            "http" | "https" => {}
            other => bail!("Unsupported upstream scheme '{other}' in {raw}"),
        }
        if url.host_str().is_none() {
            bail!("Upstream base URL has no host: {raw}");
        }

        Ok(url)
    }

    /// Port advertised in rewritten manifests
    pub fn public_port(&self) -> u16 {
        self.relay.public_port.unwrap_or(self.web.port)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.web.host, self.web.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.web.host, self.web.port
                )
            })
    }
}
