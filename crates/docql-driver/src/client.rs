//! Transport collaborator boundary.
//!
//! The HTTP/RPC client to the remote query service is an external
//! collaborator; this module specifies only its interface. Implementations
//! must raise a typed [`ClientError`]; the driver classifies it once and
//! never reinterprets or retries.

use thiserror::Error;

/// A result document as returned by the engine. Field encounter order is
/// preserved and is load-bearing for schema inference.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Coarse failure category reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    BadRequest,
    InvalidInput,
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    Suspended,
    Timeout,
    ServiceFault,
    NotImplemented,
    Other,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub category: ErrorCategory,
    pub message: String,
    pub status: Option<u16>,
}

impl ClientError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self { category, message: message.into(), status: None }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// A named bind parameter as it travels on the wire: stringified value plus
/// the engine's wire type tag. The parameter protocol has no native list
/// type, so list values are JSON-serialized before they get here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireParameter {
    pub name: String,
    pub value: String,
    pub wire_type: &'static str,
}

/// Column metadata optionally returned alongside a result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnField {
    pub name: String,
    pub wire_type: Option<String>,
}

/// A complete, already-buffered query response. From the driver's point of
/// view a "stream" is just this sequence; the transport has finished
/// consuming it.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub results: Vec<Document>,
    pub column_fields: Option<Vec<ColumnField>>,
}

/// Blocking query-execution collaborator.
pub trait QueryClient {
    /// Execute SQL with named parameters, optionally against a dedicated
    /// compute context.
    fn execute_sql(
        &self,
        sql: &str,
        params: &[WireParameter],
        compute_context: Option<&str>,
    ) -> std::result::Result<QueryResponse, ClientError>;

    /// Check a statement for validity without executing it.
    fn validate_sql(&self, sql: &str) -> std::result::Result<(), ClientError>;

    /// List the workspaces visible to the credential.
    fn list_workspaces(&self) -> std::result::Result<Vec<String>, ClientError>;

    /// List collections, optionally scoped to one workspace.
    fn list_collections(
        &self,
        workspace: Option<&str>,
    ) -> std::result::Result<Vec<String>, ClientError>;
}
