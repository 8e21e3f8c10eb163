//! The HTTP transport seam.
//!
//! The dispatcher talks to the network through the [`Transport`]
//! trait, so tests can substitute a stub that records attempts. The
//! production implementation is a blocking reqwest client.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::{multipart, Client, ClientBuilder};

/// An outgoing signed request, before multipart encoding.
///
/// This is the representation handed to the pre-send hook; mutations
/// apply to every retry attempt of the call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Full request URL.
    pub url: String,
    /// Form fields in send order.
    pub fields: Vec<FormField>,
}

/// A single multipart form field.
#[derive(Debug, Clone)]
pub struct FormField {
    /// Field name.
    pub name: String,
    /// Field payload.
    pub data: FieldData,
}

/// Payload of a form field: scalar text or file content.
#[derive(Clone)]
pub enum FieldData {
    /// A scalar value in its string form.
    Text(String),
    /// File content with the filename reported to the server.
    File {
        /// Multipart part filename.
        filename: String,
        /// File bytes, read up front so retries can re-encode the body.
        content: Vec<u8>,
    },
}

impl fmt::Debug for FieldData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldData::Text(value) => f.debug_tuple("Text").field(value).finish(),
            FieldData::File { filename, content } => f
                .debug_struct("File")
                .field("filename", filename)
                .field("len", &content.len())
                .finish(),
        }
    }
}

/// A fully read HTTP response, error statuses included.
#[derive(Debug, Clone)]
pub struct TransportReply {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Bytes,
}

/// Transport-level failures. These are the retryable class of errors,
/// as opposed to HTTP error statuses which come back as a
/// [`TransportReply`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("connection failed: {0}")]
    Io(#[source] std::io::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Network(e)
        }
    }
}

/// Sends a multipart POST and reads the response to completion.
pub trait Transport: Send + Sync {
    /// Deliver `request` as a multipart/form-data POST.
    ///
    /// Any HTTP response, success or error status, is an `Ok` reply;
    /// `Err` is reserved for connection, socket, and timeout failures.
    fn post_multipart(&self, request: &ApiRequest) -> Result<TransportReply, TransportError>;
}

/// Production transport over a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport with the given per-request timeout
    /// (`None` disables the timeout entirely).
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_multipart(&self, request: &ApiRequest) -> Result<TransportReply, TransportError> {
        // reqwest consumes the form on send; rebuild it from the owned
        // field data on every attempt.
        let mut form = multipart::Form::new();
        for field in &request.fields {
            form = match &field.data {
                FieldData::Text(value) => form.text(field.name.clone(), value.clone()),
                FieldData::File { filename, content } => {
                    let part = multipart::Part::bytes(content.clone()).file_name(filename.clone());
                    form.part(field.name.clone(), part)
                }
            };
        }

        let response = self.client.post(&request.url).multipart(form).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?;
        Ok(TransportReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_builds_with_and_without_timeout() {
        assert!(HttpTransport::new(Some(Duration::from_secs(30))).is_ok());
        assert!(HttpTransport::new(None).is_ok());
    }

    #[test]
    fn field_data_debug_hides_file_bytes() {
        let field = FieldData::File {
            filename: "face.jpg".to_string(),
            content: vec![0u8; 4096],
        };
        let debug = format!("{field:?}");
        assert!(debug.contains("face.jpg"));
        assert!(debug.contains("4096"));
        assert!(!debug.contains("[0,"));
    }

    #[test]
    fn error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::Io(io);
        assert!(format!("{err}").contains("refused"));

        assert_eq!(format!("{}", TransportError::Timeout), "request timed out");
    }
}
