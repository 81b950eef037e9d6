pub mod api;
pub mod error;
pub mod services;

pub use error::{get_request_timeout_ms, ServiceError, DEFAULT_REQUEST_TIMEOUT_MS};
