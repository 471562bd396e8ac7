//! API client facade and request pipeline
//!
//! A call goes through: address construction and body validation, the
//! request interceptors, one transport exchange, classification into an
//! [`ApiResponse`], and finally the response interceptors. Ordinary
//! failures at any stage come back as an error envelope.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    body::{validate_body, BodyCheck},
    config::ClientConfig,
    endpoint::build_url,
    error::{ApiError, Result},
    interceptor::{InterceptorChain, RequestInterceptor, ResponseInterceptor},
    request::{insert_header, merge_headers, Headers, HttpMethod, RequestConfig, RequestOptions},
    response::{classify, classify_fault, ApiResponse, Details},
    transport::{shared_transport, Transport, TransportRequest},
};

/// HTTP API client
///
/// Cheap to share behind an `Arc`; default headers and interceptor lists may
/// be changed while requests are in flight and take effect for every step
/// that has not started yet.
pub struct ApiClient {
    base_url: String,
    logging: bool,
    default_headers: RwLock<Headers>,
    request_interceptors: InterceptorChain<dyn RequestInterceptor>,
    response_interceptors: InterceptorChain<dyn ResponseInterceptor>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client backed by a [`ReqwestTransport`](crate::ReqwestTransport)
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = shared_transport(config.transport.clone())?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Create a client on top of any transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url,
            logging: config.logging,
            default_headers: RwLock::new(config.default_headers),
            request_interceptors: InterceptorChain::new(),
            response_interceptors: InterceptorChain::new(),
            transport,
        }
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether trace output is enabled
    pub fn logging_enabled(&self) -> bool {
        self.logging
    }

    /// Snapshot of the current default headers
    pub fn default_headers(&self) -> Headers {
        self.default_headers.read().clone()
    }

    /// Add or overwrite one default header
    pub fn set_default_header(&self, key: impl Into<String>, value: impl Into<String>) {
        insert_header(&mut self.default_headers.write(), key, value);
    }

    /// Append a request interceptor
    pub fn add_request_interceptor(&self, interceptor: impl RequestInterceptor + 'static) {
        self.request_interceptors.push(Arc::new(interceptor));
    }

    /// Append a response interceptor
    pub fn add_response_interceptor(&self, interceptor: impl ResponseInterceptor + 'static) {
        self.response_interceptors.push(Arc::new(interceptor));
    }

    /// Execute a GET request
    pub async fn get(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        self.request(HttpMethod::Get, endpoint, None, options).await
    }

    /// Execute a DELETE request
    pub async fn delete(&self, endpoint: &str, options: RequestOptions) -> ApiResponse {
        self.request(HttpMethod::Delete, endpoint, None, options).await
    }

    /// Execute a POST request with an optional JSON body
    pub async fn post(
        &self,
        endpoint: &str,
        body: impl Into<Option<Value>>,
        options: RequestOptions,
    ) -> ApiResponse {
        self.request(HttpMethod::Post, endpoint, body.into(), options).await
    }

    /// Execute a PUT request with an optional JSON body
    pub async fn put(
        &self,
        endpoint: &str,
        body: impl Into<Option<Value>>,
        options: RequestOptions,
    ) -> ApiResponse {
        self.request(HttpMethod::Put, endpoint, body.into(), options).await
    }

    /// Execute a PATCH request with an optional JSON body
    pub async fn patch(
        &self,
        endpoint: &str,
        body: impl Into<Option<Value>>,
        options: RequestOptions,
    ) -> ApiResponse {
        self.request(HttpMethod::Patch, endpoint, body.into(), options).await
    }

    /// POST any serializable body
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResponse {
        self.request_json(HttpMethod::Post, endpoint, body, options).await
    }

    /// PUT any serializable body
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResponse {
        self.request_json(HttpMethod::Put, endpoint, body, options).await
    }

    /// PATCH any serializable body
    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResponse {
        self.request_json(HttpMethod::Patch, endpoint, body, options).await
    }

    async fn request_json<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResponse {
        match serde_json::to_value(body) {
            Ok(value) => self.request(method, endpoint, Some(value), options).await,
            Err(e) => {
                if self.logging {
                    warn!("{method} {endpoint} rejected: failed to serialize request body: {e}");
                }
                let response = ApiResponse::err(serialization_error(&e));
                self.response_interceptors.run(response).await
            }
        }
    }

    /// Run the full pipeline for one request
    ///
    /// Never fails for ordinary request problems. A panic raised by a
    /// response interceptor is not caught and reaches the caller.
    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> ApiResponse {
        let response = self.execute(method, endpoint, body, options).await;
        self.response_interceptors.run(response).await
    }

    async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> ApiResponse {
        let (extra_headers, path_params, query_params) = options.into_parts();
        let url = build_url(&self.base_url, endpoint, &path_params, &query_params);

        if validate_body(body.as_ref(), self.logging) == BodyCheck::Reject {
            return ApiResponse::err(
                ApiError::validation("Invalid request body")
                    .with_details(Details::Diagnostic(
                        "request body must be an object, an array or null".to_string(),
                    )),
            );
        }

        let mut headers = self.default_headers();
        merge_headers(&mut headers, extra_headers);

        let config = RequestConfig {
            url,
            method,
            headers,
            body,
        };
        let config = match self.request_interceptors.run(config).await {
            Ok(config) => config,
            Err(e) => {
                if self.logging {
                    warn!("{method} {endpoint} aborted by request interceptor: {e:#}");
                }
                return ApiResponse::err(
                    ApiError::unknown(format!("Request interceptor failed: {e}"))
                        .with_details(Details::Diagnostic(format!("{e:#}"))),
                );
            }
        };

        // `null` bodies are not sent
        let body = config.body.as_ref().filter(|body| !body.is_null());
        let body = match body.map(serde_json::to_string).transpose() {
            Ok(body) => body,
            Err(e) => return ApiResponse::err(serialization_error(&e)),
        };

        if self.logging {
            info!("{} {}", config.method, config.url);
        }

        let request = TransportRequest {
            method: config.method,
            url: config.url,
            headers: config.headers,
            body,
        };
        let (method, url) = (request.method, request.url.clone());

        match self.transport.send(request).await {
            Ok(raw) => {
                if self.logging {
                    info!("{method} {url} -> {}", raw.status);
                }
                classify(raw)
            }
            Err(fault) => {
                let error = classify_fault(&fault);
                if self.logging {
                    warn!("{method} {url} -> {}: {}", error.kind(), error.message());
                }
                ApiResponse::err(error)
            }
        }
    }
}

fn serialization_error(err: &serde_json::Error) -> ApiError {
    ApiError::validation("Failed to serialize request body")
        .with_details(Details::Diagnostic(err.to_string()))
}
