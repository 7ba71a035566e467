/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Upstream fetch defaults
// Note: base_url is the ONLY mandatory value and has no default
pub const DEFAULT_CONNECT_TIMEOUT: &str = "10s";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub const DEFAULT_USER_AGENT: &str = concat!("hls-relay/", env!("CARGO_PKG_VERSION"));

// Manifest rewriting defaults
pub const DEFAULT_PUBLIC_HOST: &str = "localhost";

// Environment variable prefix, nested keys split on `__` (HLS_RELAY_WEB__PORT)
pub const ENV_PREFIX: &str = "HLS_RELAY_";
