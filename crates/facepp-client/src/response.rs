//! Response values and JSON decoding.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Result of a successful endpoint call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// JSON-decoded body (`decode_result` enabled, the default).
    Json(serde_json::Value),
    /// Untouched body bytes (`decode_result` disabled).
    Raw(Bytes),
}

impl ApiResponse {
    /// The decoded JSON value, if decoding was enabled.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Raw(_) => None,
        }
    }

    /// Consume into the decoded JSON value.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::Raw(_) => None,
        }
    }

    /// The raw body bytes, if decoding was disabled.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ApiResponse::Json(_) => None,
            ApiResponse::Raw(bytes) => Some(bytes),
        }
    }

    /// Consume into the raw body bytes.
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            ApiResponse::Json(_) => None,
            ApiResponse::Raw(bytes) => Some(bytes),
        }
    }

    /// Deserialize the response into a typed value, from the decoded
    /// JSON or straight from raw bytes.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            ApiResponse::Json(value) => T::deserialize(value),
            ApiResponse::Raw(bytes) => serde_json::from_slice(bytes),
        }
    }
}

/// Decode a response body as UTF-8 JSON.
pub(crate) fn decode(url: &str, body: Bytes) -> Result<ApiResponse, ApiError> {
    let text = std::str::from_utf8(&body).map_err(|_| decode_error(url, &body))?;
    let value = serde_json::from_str(text).map_err(|_| decode_error(url, &body))?;
    Ok(ApiResponse::Json(value))
}

fn decode_error(url: &str, body: &[u8]) -> ApiError {
    ApiError::Decode {
        url: url.to_string(),
        value: String::from_utf8_lossy(body).into_owned(),
    }
}
