//! Driver error taxonomy.

use thiserror::Error;

use crate::client::{ClientError, ErrorCategory};

pub type Result<T> = std::result::Result<T, Error>;

/// The five error kinds the driver surfaces to callers.
///
/// Every transport failure is classified exactly once, then re-raised.
/// Nothing in this layer retries or backs off.
#[derive(Debug, Error)]
pub enum Error {
    /// Driver-level misuse, e.g. operating on a closed connection or cursor.
    #[error("interface error: {0}")]
    Interface(String),

    /// Malformed query, bad parameters, unsupported constructs, not-found.
    #[error("programming error: {0}")]
    Programming(String),

    /// Auth failures, quota limits, suspended resources, timeouts.
    #[error("operational error: {0}")]
    Operational(String),

    /// Server-side fault.
    #[error("internal error: {0}")]
    Internal(String),

    /// Feature the remote engine does not implement.
    #[error("not supported: {0}")]
    NotSupported(String),
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        let message = match err.status {
            Some(status) => format!("{} (status {status})", err.message),
            None => err.message,
        };
        match err.category {
            ErrorCategory::BadRequest
            | ErrorCategory::InvalidInput
            | ErrorCategory::NotFound => Error::Programming(message),
            ErrorCategory::Unauthorized
            | ErrorCategory::Forbidden
            | ErrorCategory::RateLimited
            | ErrorCategory::Suspended
            | ErrorCategory::Timeout
            | ErrorCategory::Other => Error::Operational(message),
            ErrorCategory::ServiceFault => Error::Internal(message),
            ErrorCategory::NotImplemented => Error::NotSupported(message),
        }
    }
}

impl From<docql_registry::TypeError> for Error {
    fn from(err: docql_registry::TypeError) -> Self {
        Error::Programming(err.to_string())
    }
}
