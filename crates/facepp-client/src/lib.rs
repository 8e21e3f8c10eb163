//! Client SDK for the Face++ facial-recognition HTTP API.
//!
//! Requests are signed multipart/form-data POSTs. Transient transport
//! failures are retried with a fixed delay; HTTP error statuses fail
//! immediately. JSON responses are decoded by default, with raw bytes
//! available on request.
//!
//! ```no_run
//! use facepp_client::{Api, Params, UploadFile};
//!
//! # fn main() -> Result<(), facepp_client::ApiError> {
//! let api = Api::builder("api-key", "api-secret").build()?;
//!
//! let detect = api.endpoint(&["detect"])?;
//! let result = detect.call(
//!     Params::new()
//!         .set("image_file", UploadFile::new("face.jpg"))
//!         .set("return_attributes", "gender,age"),
//! )?;
//! println!("{:?}", result.as_json());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod response;
pub mod transport;
pub mod upload;

pub use client::{Api, ApiBuilder, ApiConfig, UpdateRequestHook, DEFAULT_SERVER};
pub use endpoint::Endpoint;
pub use error::ApiError;
pub use params::{ParamValue, Params};
pub use response::ApiResponse;
pub use transport::{
    ApiRequest, FieldData, FormField, HttpTransport, Transport, TransportError, TransportReply,
};
pub use upload::{UploadFile, MAX_UPLOAD_BYTES};
