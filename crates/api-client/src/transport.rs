//! Transport capability and its reqwest implementation

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::TransportConfig,
    error::{ClientError, Result, TransportError},
    request::{Headers, HttpMethod},
};

/// Finalized request handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    /// Serialized JSON body
    pub body: Option<String>,
}

/// Raw outcome of an exchange; any status, including 4xx/5xx
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: String,
}

/// Mockable transport trait
///
/// Implementations perform exactly one exchange per call and report a
/// non-2xx status as a normal response. Timeout detection, if any, belongs
/// here and is reported as [`TransportError::Timeout`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> std::result::Result<TransportResponse, TransportError>;
}

/// Production transport on top of `reqwest`
pub struct ReqwestTransport {
    inner: reqwest::Client,
    config: TransportConfig,
}

impl ReqwestTransport {
    /// Create a new transport with configuration
    pub fn new(config: TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ClientError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        if config.pool_enabled {
            builder = builder.pool_idle_timeout(config.pool_idle_timeout);
        } else {
            builder = builder.pool_max_idle_per_host(0);
        }

        let inner = builder
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// Create a transport with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(TransportConfig::default())
    }

    /// Get configuration
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> std::result::Result<TransportResponse, TransportError> {
        let url = request
            .url
            .parse::<url::Url>()
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", request.url)))?;

        let mut builder = self.inner.request(request.method.into(), url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Create a shared transport (Arc-wrapped for cloning)
pub fn shared_transport(config: TransportConfig) -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(ReqwestTransport::new(config)?))
}
