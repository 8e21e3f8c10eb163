//! Client configuration and request dispatch.

use std::thread;
use std::time::Duration;

use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::params::{ParamValue, Params};
use crate::response::{self, ApiResponse};
use crate::transport::{
    ApiRequest, FieldData, FormField, HttpTransport, Transport, TransportReply,
};

/// Default API server base URL.
pub const DEFAULT_SERVER: &str = "https://api-cn.faceplusplus.com/facepp/v3/";

/// Form field names injected into every request for signing.
const API_KEY_FIELD: &str = "api_key";
const API_SECRET_FIELD: &str = "api_secret";

/// Hook that may mutate a request after field assembly, before the
/// first send attempt.
pub type UpdateRequestHook = Box<dyn Fn(&mut ApiRequest) + Send + Sync>;

/// Client configuration, immutable after construction.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API key, sent as the `api_key` form field.
    pub key: String,
    /// API secret, sent as the `api_secret` form field.
    pub secret: String,
    /// Base URL, always ending in `/`.
    pub server: String,
    /// Decode response bodies as JSON.
    pub decode_result: bool,
    /// Per-request timeout; `None` disables it.
    pub timeout: Option<Duration>,
    /// Transport-failure retries after the first attempt.
    pub max_retries: u32,
    /// Fixed sleep between retries.
    pub retry_delay: Duration,
}

impl ApiConfig {
    /// Configuration with the documented defaults.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            server: DEFAULT_SERVER.to_string(),
            decode_result: true,
            timeout: Some(Duration::from_secs(30)),
            max_retries: 10,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Face++ API client.
///
/// Construction builds the HTTP transport once; endpoint nodes borrow
/// the client and may be used from independent threads.
pub struct Api {
    config: ApiConfig,
    transport: Box<dyn Transport>,
    update_request: Option<UpdateRequestHook>,
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("config", &self.config)
            .field("update_request", &self.update_request.is_some())
            .finish_non_exhaustive()
    }
}

impl Api {
    /// Start building a client with the given credentials.
    pub fn builder(key: impl Into<String>, secret: impl Into<String>) -> ApiBuilder {
        ApiBuilder {
            config: ApiConfig::new(key, secret),
            transport: None,
            update_request: None,
        }
    }

    /// The client configuration.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The root of the endpoint tree (empty prefix).
    pub fn root(&self) -> Endpoint<'_> {
        Endpoint::new(self, Vec::new())
    }

    /// Walk the endpoint tree along `path`.
    ///
    /// Unknown segments are a usage error, rejected before any I/O.
    pub fn endpoint(&self, path: &[&str]) -> Result<Endpoint<'_>, ApiError> {
        let mut node = self.root();
        for segment in path {
            node = node.child(segment).ok_or_else(|| {
                ApiError::Usage(format!(
                    "unknown endpoint segment '{segment}' under '/{}'",
                    node.path().join("/")
                ))
            })?;
        }
        Ok(node)
    }

    /// Build the signed form, apply the pre-send hook, send with
    /// retry, and decode if configured.
    pub(crate) fn invoke(&self, url: &str, params: Params) -> Result<ApiResponse, ApiError> {
        let mut fields = Vec::with_capacity(params.len() + 2);
        fields.push(FormField {
            name: API_KEY_FIELD.to_string(),
            data: FieldData::Text(self.config.key.clone()),
        });
        fields.push(FormField {
            name: API_SECRET_FIELD.to_string(),
            data: FieldData::Text(self.config.secret.clone()),
        });

        for (name, value) in params.iter() {
            if name == API_KEY_FIELD || name == API_SECRET_FIELD {
                return Err(ApiError::Usage(format!(
                    "parameter name '{name}' is reserved for request signing"
                )));
            }
            let data = match value {
                ParamValue::Text(s) => FieldData::Text(s.clone()),
                ParamValue::Int(i) => FieldData::Text(i.to_string()),
                ParamValue::Float(f) => FieldData::Text(f.to_string()),
                ParamValue::Bool(b) => FieldData::Text(b.to_string()),
                ParamValue::File(file) => FieldData::File {
                    filename: file.file_name(),
                    content: file.content()?,
                },
            };
            fields.push(FormField {
                name: name.clone(),
                data,
            });
        }

        let mut request = ApiRequest {
            url: url.to_string(),
            fields,
        };
        if let Some(hook) = &self.update_request {
            hook(&mut request);
        }

        let reply = self.send_with_retry(&request)?;

        if !(200..300).contains(&reply.status) {
            return Err(ApiError::Http {
                code: reply.status,
                url: request.url,
                body: String::from_utf8_lossy(&reply.body).into_owned(),
            });
        }

        if self.config.decode_result {
            response::decode(&request.url, reply.body)
        } else {
            Ok(ApiResponse::Raw(reply.body))
        }
    }

    /// Send, retrying transport failures with a fixed delay.
    ///
    /// HTTP error statuses come back as a reply and are never retried;
    /// the loop makes at most `max_retries + 1` attempts.
    fn send_with_retry(&self, request: &ApiRequest) -> Result<TransportReply, ApiError> {
        let mut remaining = self.config.max_retries;
        loop {
            match self.transport.post_multipart(request) {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    if remaining == 0 {
                        return Err(ApiError::Transport {
                            url: request.url.clone(),
                            source: err,
                        });
                    }
                    remaining -= 1;
                    tracing::debug!(url = %request.url, error = %err, "caught transport error; retrying");
                    thread::sleep(self.config.retry_delay);
                }
            }
        }
    }
}

/// Builder for [`Api`].
pub struct ApiBuilder {
    config: ApiConfig,
    transport: Option<Box<dyn Transport>>,
    update_request: Option<UpdateRequestHook>,
}

impl ApiBuilder {
    /// Override the API server base URL. A trailing `/` is appended
    /// if missing.
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.config.server = server.into();
        self
    }

    /// Whether to decode response bodies as JSON (default true).
    pub fn decode_result(mut self, decode: bool) -> Self {
        self.config.decode_result = decode;
        self
    }

    /// Per-request timeout (default 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Disable the per-request timeout.
    pub fn no_timeout(mut self) -> Self {
        self.config.timeout = None;
        self
    }

    /// Transport-failure retries after the first attempt (default 10).
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Fixed sleep between retries (default 5 seconds).
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    /// Install a hook that may mutate each request after field
    /// assembly, before the first send.
    pub fn update_request<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ApiRequest) + Send + Sync + 'static,
    {
        self.update_request = Some(Box::new(hook));
        self
    }

    /// Replace the HTTP transport. Intended for tests and unusual
    /// deployments; the default is a blocking reqwest client.
    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client, constructing the default transport if none
    /// was injected.
    pub fn build(self) -> Result<Api, ApiError> {
        let mut config = self.config;
        if !config.server.ends_with('/') {
            config.server.push('/');
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(config.timeout).map_err(ApiError::ClientBuild)?),
        };
        Ok(Api {
            config,
            transport,
            update_request: self.update_request,
        })
    }
}
