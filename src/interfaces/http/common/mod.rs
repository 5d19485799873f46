//! Shared HTTP plumbing: response envelope, error mapping, extractors.

mod error;
mod response;
mod validated_json;

pub use error::ApiError;
pub use response::{ApiResponse, Collection};
pub use validated_json::{ValidatedJson, ValidatedJsonRejection};
