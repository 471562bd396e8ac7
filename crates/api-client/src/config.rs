//! Client and transport configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::{insert_header, Headers};

/// API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Prefix for every endpoint template
    #[serde(default)]
    pub base_url: String,

    /// Headers sent with every request unless overridden per call
    #[serde(default = "default_headers")]
    pub default_headers: Headers,

    /// Emit a trace line per request, response and rejected body
    #[serde(default = "default_logging")]
    pub logging: bool,

    /// Settings for the built-in reqwest transport
    #[serde(default)]
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            default_headers: default_headers(),
            logging: default_logging(),
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new client config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the whole default header mapping
    pub fn with_default_headers(mut self, headers: Headers) -> Self {
        self.default_headers = headers;
        self
    }

    /// Add or overwrite one default header
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.default_headers, key, value);
        self
    }

    /// Enable or disable trace output
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// Set transport configuration
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }
}

/// Configuration of [`ReqwestTransport`](crate::ReqwestTransport)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Connection timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// HTTP/HTTPS proxy URL
    #[serde(default)]
    pub proxy: Option<String>,

    /// Custom user agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirects to follow (0 = no redirects)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Enable connection pooling
    #[serde(default = "default_pool_enabled")]
    pub pool_enabled: bool,

    /// Pool idle timeout
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            proxy: None,
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            pool_enabled: default_pool_enabled(),
            pool_idle_timeout: default_pool_idle_timeout(),
        }
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set proxy URL
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

// Default value functions for serde
fn default_headers() -> Headers {
    Headers::from([("Content-Type".to_string(), "application/json".to_string())])
}

fn default_logging() -> bool {
    true
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_user_agent() -> String {
    format!("api-client/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_redirects() -> usize {
    10
}

fn default_pool_enabled() -> bool {
    true
}

fn default_pool_idle_timeout() -> Duration {
    Duration::from_secs(90)
}
