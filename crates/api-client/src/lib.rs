//! Interceptor-driven HTTP API client
//!
//! Builds requests from endpoint templates, runs them through request
//! interceptors, sends them over a pluggable transport and hands back a
//! uniform [`ApiResponse`] envelope after the response interceptors.
//!
//! ## Features
//!
//! - **Endpoint templates**: `:name` path parameters and encoded query strings
//! - **Interceptor chains**: ordered async hooks before and after the transport
//! - **Uniform envelope**: every failure is classified into one [`ErrorKind`]
//! - **Trait-based transport**: mockable via [`Transport`], `reqwest` by default
//!
//! ```ignore
//! use api_client::{ApiClient, ClientConfig, RequestOptions};
//!
//! let client = ApiClient::new(ClientConfig::new().with_base_url("https://api.example.com"))?;
//! let response = client
//!     .get("/users/:id", RequestOptions::new().path_param("id", 42))
//!     .await;
//!
//! match response.into_result() {
//!     Ok(user) => println!("{user:?}"),
//!     Err(error) => eprintln!("{} ({:?})", error.message(), error.status()),
//! }
//! ```

pub mod body;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod interceptor;
pub mod request;
pub mod response;
pub mod transport;

pub use client::ApiClient;
pub use config::{ClientConfig, TransportConfig};
pub use endpoint::{build_url, Params};
pub use error::{ApiError, ClientError, ErrorKind, Result, TransportError};
pub use interceptor::{BearerAuth, InterceptorChain, RequestInterceptor, ResponseInterceptor};
pub use request::{Headers, HttpMethod, RequestConfig, RequestOptions};
pub use response::{ApiResponse, Details, Payload};
pub use transport::{shared_transport, ReqwestTransport, Transport, TransportRequest, TransportResponse};
