//! Structured errors for API calls.

use crate::transport::TransportError;
use crate::upload::MAX_UPLOAD_BYTES;

/// Errors surfaced by endpoint calls.
///
/// Transport failures are retried before they reach the caller; every
/// other variant is terminal on first occurrence.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The call was malformed and was rejected before any I/O.
    #[error("usage error: {0}")]
    Usage(String),

    /// An upload file exceeds the 2 MiB cap, checked before the file
    /// is opened.
    #[error("file too large for upload: {path} is {size} bytes (limit {MAX_UPLOAD_BYTES})")]
    FileTooLarge {
        /// Path of the offending file.
        path: String,
        /// Its size on disk.
        size: u64,
    },

    /// Filesystem failure while reading an upload file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to construct the HTTP transport.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] TransportError),

    /// The server answered with an HTTP error status. Never retried.
    #[error("HTTP error {code} from {url}: {body}")]
    Http {
        /// Response status code.
        code: u16,
        /// Request URL.
        url: String,
        /// Raw response body as text.
        body: String,
    },

    /// Transport-level failure after the retry budget was exhausted.
    /// The original error is preserved as the source.
    #[error("transport error for {url}: {source}")]
    Transport {
        /// Request URL.
        url: String,
        /// The last transport failure observed.
        #[source]
        source: TransportError,
    },

    /// The response body was not valid UTF-8 JSON while decoding was
    /// requested.
    #[error("json decode error for {url}: value={value:?}")]
    Decode {
        /// Request URL.
        url: String,
        /// The raw, undecodable body rendered as text.
        value: String,
    },
}

impl ApiError {
    /// HTTP-status-like code: the response status for [`ApiError::Http`],
    /// `-1` for every non-HTTP failure.
    pub fn code(&self) -> i32 {
        match self {
            ApiError::Http { code, .. } => i32::from(*code),
            _ => -1,
        }
    }

    /// The request URL, for variants that carry one.
    pub fn url(&self) -> Option<&str> {
        match self {
            ApiError::Http { url, .. }
            | ApiError::Transport { url, .. }
            | ApiError::Decode { url, .. } => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_code_and_url() {
        let err = ApiError::Http {
            code: 403,
            url: "https://api.example.com/detect".to_string(),
            body: "CONCURRENCY_LIMIT_EXCEEDED".to_string(),
        };
        assert_eq!(err.code(), 403);
        assert_eq!(err.url(), Some("https://api.example.com/detect"));

        let display = format!("{err}");
        assert!(display.contains("403"));
        assert!(display.contains("CONCURRENCY_LIMIT_EXCEEDED"));
    }

    #[test]
    fn non_http_errors_report_minus_one() {
        let usage = ApiError::Usage("only keyword parameters".to_string());
        assert_eq!(usage.code(), -1);
        assert_eq!(usage.url(), None);

        let too_large = ApiError::FileTooLarge {
            path: "/tmp/huge.jpg".to_string(),
            size: 3 * 1024 * 1024,
        };
        assert_eq!(too_large.code(), -1);
        assert!(format!("{too_large}").contains("/tmp/huge.jpg"));

        let decode = ApiError::Decode {
            url: "https://api.example.com/detect".to_string(),
            value: "<html>".to_string(),
        };
        assert_eq!(decode.code(), -1);
        assert_eq!(decode.url(), Some("https://api.example.com/detect"));
    }

    #[test]
    fn transport_error_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ApiError::Transport {
            url: "https://api.example.com/compare".to_string(),
            source: TransportError::Io(io),
        };
        assert!(err.source().is_some());
        assert_eq!(err.code(), -1);
    }
}
