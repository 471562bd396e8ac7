//! Response envelope and classification
//!
//! Every request ends in an [`ApiResponse`]. The classifier turns a raw
//! [`TransportResponse`] (or a [`TransportError`]) into one: the body is
//! parsed as JSON when possible and kept as text otherwise, and the status
//! decides between success and [`ErrorKind::ApiError`](crate::ErrorKind).

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    error::{ApiError, TransportError},
    transport::TransportResponse,
};

const DEFAULT_FAILURE_MESSAGE: &str = "Request failed";
const DEFAULT_NETWORK_MESSAGE: &str = "Network error occurred";

/// Response body after the "JSON first, text otherwise" parse
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    /// Parse a raw body, falling back to the text when it is not JSON
    pub fn parse(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Json(_) => None,
            Payload::Text(text) => Some(text),
        }
    }

    /// Deserialize into a typed value; text payloads deserialize as a JSON string
    pub fn deserialize<T: DeserializeOwned>(self) -> serde_json::Result<T> {
        match self {
            Payload::Json(value) => serde_json::from_value(value),
            Payload::Text(text) => serde_json::from_value(Value::String(text)),
        }
    }

    /// `message` field of a JSON object payload, if it is a non-empty string
    fn message(&self) -> Option<&str> {
        self.as_json()
            .and_then(|value| value.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

/// Details attached to an [`ApiError`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Details {
    /// Structured remote payload
    Json(Value),
    /// Remote payload that was not JSON
    Text(String),
    /// Description of a local fault
    Diagnostic(String),
}

impl From<Payload> for Details {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Json(value) => Details::Json(value),
            Payload::Text(text) => Details::Text(text),
        }
    }
}

/// Uniform result envelope
///
/// Exactly one of `data` and `error` is present, and `success` is true iff
/// `error` is absent. Use [`ApiResponse::ok`] or [`ApiResponse::err`] to
/// build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T = Payload> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn into_error(self) -> Option<ApiError> {
        self.error
    }

    /// Convert into a `Result`, so `?` can be used on the envelope
    pub fn into_result(self) -> std::result::Result<T, ApiError> {
        match (self.data, self.error) {
            (_, Some(error)) => Err(error),
            (Some(data), None) => Ok(data),
            (None, None) => Err(ApiError::unknown("Response carried neither data nor error")),
        }
    }

    /// Transform the success payload, leaving errors untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
        }
    }

    /// Transform the error, leaving success payloads untouched
    pub fn map_err(self, f: impl FnOnce(ApiError) -> ApiError) -> Self {
        Self {
            error: self.error.map(f),
            ..self
        }
    }
}

impl<T> From<std::result::Result<T, ApiError>> for ApiResponse<T> {
    fn from(result: std::result::Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ApiResponse::ok(data),
            Err(error) => ApiResponse::err(error),
        }
    }
}

impl ApiResponse<Payload> {
    /// Decode the payload into `T`
    ///
    /// A payload that does not fit `T` becomes a validation error; error
    /// envelopes pass through unchanged.
    pub fn decode<T: DeserializeOwned>(self) -> ApiResponse<T> {
        match self.into_result() {
            Ok(payload) => match payload.deserialize() {
                Ok(data) => ApiResponse::ok(data),
                Err(e) => ApiResponse::err(
                    ApiError::validation("Failed to decode response data")
                        .with_details(Details::Diagnostic(e.to_string())),
                ),
            },
            Err(error) => ApiResponse::err(error),
        }
    }
}

/// Check whether a status is inside the 2xx acceptance range
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Classify a completed exchange
pub fn classify(response: TransportResponse) -> ApiResponse {
    let payload = Payload::parse(response.body);

    if !is_success_status(response.status) {
        let message = payload.message().unwrap_or(DEFAULT_FAILURE_MESSAGE).to_string();
        return ApiResponse::err(ApiError::api(response.status, message).with_details(payload));
    }

    ApiResponse::ok(payload)
}

/// Classify a transport fault
///
/// Timeouts keep their own tag; everything else is a network error.
pub fn classify_fault(fault: &TransportError) -> ApiError {
    let message = fault.to_string();
    let message = if message.is_empty() {
        DEFAULT_NETWORK_MESSAGE.to_string()
    } else {
        message
    };

    let error = if fault.is_timeout() {
        ApiError::timeout(message)
    } else {
        ApiError::network(message)
    };
    error.with_details(Details::Diagnostic(format!("{fault:?}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{error::ErrorKind, request::Headers};

    fn raw(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            headers: Headers::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_json_success() {
        let response = classify(raw(200, r#"{"id":1,"name":"Alice"}"#));
        assert!(response.is_success());
        assert!(response.error().is_none());
        assert_eq!(
            response.data(),
            Some(&Payload::Json(json!({"id": 1, "name": "Alice"})))
        );
    }

    #[test]
    fn test_text_fallback_is_not_an_error() {
        let response = classify(raw(200, "plain text, not json"));
        assert!(response.is_success());
        assert_eq!(
            response.data(),
            Some(&Payload::Text("plain text, not json".to_string()))
        );
    }

    #[test]
    fn test_empty_body_is_empty_text() {
        let response = classify(raw(204, ""));
        assert!(response.is_success());
        assert_eq!(response.data().and_then(Payload::as_text), Some(""));
    }

    #[test]
    fn test_api_error_uses_message_field() {
        let response = classify(raw(401, r#"{"message":"bad token"}"#));
        assert!(!response.is_success());
        assert!(response.data().is_none());

        let error = response.error().unwrap();
        assert_eq!(error.kind(), ErrorKind::ApiError);
        assert_eq!(error.status(), Some(401));
        assert_eq!(error.message(), "bad token");
        assert_eq!(error.details(), Some(&Details::Json(json!({"message": "bad token"}))));
    }

    #[test]
    fn test_api_error_default_message() {
        for body in [r#"{"error":"nope"}"#, r#"{"message":""}"#, r#"{"message":42}"#, "Bad Gateway"] {
            let response = classify(raw(502, body));
            let error = response.error().unwrap();
            assert_eq!(error.message(), "Request failed", "body: {body}");
            assert_eq!(error.status(), Some(502));
        }
    }

    #[test]
    fn test_text_error_payload_kept_as_details() {
        let response = classify(raw(500, "internal error"));
        assert_eq!(
            response.error().unwrap().details(),
            Some(&Details::Text("internal error".to_string()))
        );
    }

    #[test]
    fn test_status_boundaries() {
        assert!(!is_success_status(199));
        assert!(is_success_status(200));
        assert!(is_success_status(299));
        assert!(!is_success_status(300));
    }

    #[test]
    fn test_fault_classification() {
        let error = classify_fault(&TransportError::Connect("connection refused".into()));
        assert_eq!(error.kind(), ErrorKind::NetworkError);
        assert!(error.message().contains("connection refused"));
        assert!(matches!(error.details(), Some(Details::Diagnostic(_))));

        let error = classify_fault(&TransportError::Timeout("after 30s".into()));
        assert_eq!(error.kind(), ErrorKind::TimeoutError);
    }

    #[test]
    fn test_decode_typed_payload() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct User {
            id: u64,
        }

        let response = ApiResponse::ok(Payload::Json(json!({"id": 7}))).decode::<User>();
        assert_eq!(response.into_data(), Some(User { id: 7 }));

        let response = ApiResponse::ok(Payload::Text("nope".into())).decode::<User>();
        assert_eq!(response.error().unwrap().kind(), ErrorKind::ValidationError);

        let response = ApiResponse::<Payload>::err(ApiError::network("down")).decode::<User>();
        assert_eq!(response.error().unwrap().kind(), ErrorKind::NetworkError);
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ApiResponse::ok(3).into_result().unwrap(), 3);

        let error = ApiResponse::<i32>::err(ApiError::timeout("slow"))
            .into_result()
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TimeoutError);
    }

    #[test]
    fn test_envelope_serialization() {
        let json = serde_json::to_value(ApiResponse::ok(Payload::Json(json!({"a": 1})))).unwrap();
        assert_eq!(json, json!({"success": true, "data": {"a": 1}}));

        let json = serde_json::to_value(ApiResponse::<Payload>::err(ApiError::validation("bad"))).unwrap();
        assert_eq!(
            json,
            json!({"success": false, "error": {"type": "VALIDATION_ERROR", "message": "bad"}})
        );
    }
}
