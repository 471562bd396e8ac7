//! Request-side types

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::Params;

/// Header mapping
///
/// Keys keep the spelling they were inserted with. Go through
/// [`insert_header`] so names that differ only in case replace each other.
pub type Headers = BTreeMap<String, String>;

/// Insert a header, dropping any existing key that matches case-insensitively
pub fn insert_header(headers: &mut Headers, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
    headers.insert(key, value.into());
}

/// Case-insensitive header lookup
pub fn find_header<'a>(headers: &'a Headers, key: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
        .map(|(_, value)| value.as_str())
}

/// Overlay `extra` on `base`; entries of `extra` win regardless of key case
pub fn merge_headers(base: &mut Headers, extra: Headers) {
    for (key, value) in extra {
        insert_header(base, key, value);
    }
}

/// HTTP method of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Outgoing request as seen by request interceptors
///
/// Built fresh for every call. Interceptors receive it by value and may
/// change any field before it reaches the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl RequestConfig {
    /// Header value, matching the name case-insensitively
    pub fn header(&self, key: &str) -> Option<&str> {
        find_header(&self.headers, key)
    }

    /// Set a header, replacing any previous value for the key
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, key, value);
        self
    }
}

/// Per-call options: extra headers, path parameters and query parameters
///
/// ```ignore
/// let options = RequestOptions::new()
///     .path_param("id", 42)
///     .query("include", "posts")
///     .header("X-Trace", "abc");
/// let response = client.get("/users/:id", options).await;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    headers: Headers,
    path_params: Params,
    query_params: Params,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra header; wins over a default header with the same name in any case
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, key, value);
        self
    }

    /// Value substituted for the `:key` token of the endpoint template
    pub fn path_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.insert(key, value);
        self
    }

    /// Query-string entry
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.insert(key, value);
        self
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    pub(crate) fn into_parts(self) -> (Headers, Params, Params) {
        (self.headers, self.path_params, self.query_params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_strings() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(reqwest::Method::from(HttpMethod::Delete), reqwest::Method::DELETE);
        assert_eq!(serde_json::to_value(HttpMethod::Get).unwrap(), "GET");
    }

    #[test]
    fn test_options_builder() {
        let options = RequestOptions::new()
            .header("X-Trace", "abc")
            .path_param("id", 42)
            .query("page", 2)
            .query("page", 3);

        assert_eq!(options.headers().get("X-Trace").map(String::as_str), Some("abc"));
        assert_eq!(options.path_params().get("id"), Some("42"));
        assert_eq!(options.query_params().len(), 1);
        assert_eq!(options.query_params().get("page"), Some("3"));
    }

    #[test]
    fn test_config_header_helpers() {
        let config = RequestConfig {
            url: "/x".to_string(),
            method: HttpMethod::Get,
            headers: Headers::new(),
            body: None,
        }
        .with_header("Authorization", "Bearer t");

        assert_eq!(config.header("Authorization"), Some("Bearer t"));
        assert_eq!(config.header("authorization"), Some("Bearer t"));

        let config = config.with_header("AUTHORIZATION", "Bearer u");
        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.header("Authorization"), Some("Bearer u"));
    }

    #[test]
    fn test_merge_headers_ignores_case() {
        let mut headers = Headers::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("X-Tenant".to_string(), "blue".to_string()),
        ]);
        let extra = Headers::from([("content-type".to_string(), "text/plain".to_string())]);

        merge_headers(&mut headers, extra);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("content-type").map(String::as_str), Some("text/plain"));
        assert!(!headers.contains_key("Content-Type"));
        assert_eq!(find_header(&headers, "x-tenant"), Some("blue"));
    }
}
