//! Request and response interceptor chains
//!
//! Interceptors run strictly in registration order, each one receiving the
//! previous one's output. A chain is append-only and belongs to a single
//! [`ApiClient`](crate::ApiClient).
//!
//! Request interceptors are fallible: an `Err` aborts the request and is
//! reported as an [`ErrorKind::UnknownError`](crate::ErrorKind) envelope.
//! Response interceptors are plain transforms and also see error envelopes.
//!
//! ```ignore
//! client.add_request_interceptor(|config: RequestConfig| async move {
//!     Ok::<_, anyhow::Error>(config.with_header("Authorization", "Bearer secret"))
//! });
//! ```

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{request::RequestConfig, response::ApiResponse};

/// Transform applied to every outgoing request
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    async fn intercept(&self, config: RequestConfig) -> anyhow::Result<RequestConfig>;
}

#[async_trait]
impl<F, Fut> RequestInterceptor for F
where
    F: Fn(RequestConfig) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<RequestConfig>> + Send + 'static,
{
    async fn intercept(&self, config: RequestConfig) -> anyhow::Result<RequestConfig> {
        (self)(config).await
    }
}

/// Transform applied to every response envelope, success or error
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    async fn intercept(&self, response: ApiResponse) -> ApiResponse;
}

#[async_trait]
impl<F, Fut> ResponseInterceptor for F
where
    F: Fn(ApiResponse) -> Fut + Send + Sync,
    Fut: Future<Output = ApiResponse> + Send + 'static,
{
    async fn intercept(&self, response: ApiResponse) -> ApiResponse {
        (self)(response).await
    }
}

/// Adds `Authorization: Bearer <token>` to every request
#[derive(Debug, Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl RequestInterceptor for BearerAuth {
    async fn intercept(&self, config: RequestConfig) -> anyhow::Result<RequestConfig> {
        Ok(config.with_header("Authorization", format!("Bearer {}", self.token)))
    }
}

/// Ordered, append-only list of interceptors
///
/// Each run works on a snapshot taken when the run starts, so interceptors
/// registered meanwhile only apply to later runs.
pub struct InterceptorChain<I: ?Sized> {
    interceptors: RwLock<Vec<Arc<I>>>,
}

impl<I: ?Sized> InterceptorChain<I> {
    pub fn new() -> Self {
        Self {
            interceptors: RwLock::new(Vec::new()),
        }
    }

    /// Append an interceptor to the end of the chain
    pub fn push(&self, interceptor: Arc<I>) {
        self.interceptors.write().push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.read().is_empty()
    }

    fn snapshot(&self) -> Vec<Arc<I>> {
        self.interceptors.read().clone()
    }
}

impl<I: ?Sized> Default for InterceptorChain<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl InterceptorChain<dyn RequestInterceptor> {
    /// Run every request interceptor; the first failure stops the chain
    pub async fn run(&self, config: RequestConfig) -> anyhow::Result<RequestConfig> {
        let mut config = config;
        for interceptor in self.snapshot() {
            config = interceptor.intercept(config).await?;
        }
        Ok(config)
    }
}

impl InterceptorChain<dyn ResponseInterceptor> {
    /// Run every response interceptor
    pub async fn run(&self, response: ApiResponse) -> ApiResponse {
        let mut response = response;
        for interceptor in self.snapshot() {
            response = interceptor.intercept(response).await;
        }
        response
    }
}
