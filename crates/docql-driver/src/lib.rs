//! docql driver core
//!
//! Synchronous, forward-only driver surface over a remote document engine:
//! the error taxonomy, the transport collaborator trait, and the
//! Connection/Cursor state machines. The actual HTTP transport lives behind
//! [`QueryClient`]; this crate never retries and classifies every transport
//! failure exactly once.

mod client;
mod connection;
mod cursor;
mod error;

pub use client::{ClientError, ColumnField, Document, ErrorCategory, QueryClient, QueryResponse, WireParameter};
pub use connection::{ConnectArgs, Connection};
pub use cursor::{Cursor, Params, Row};
pub use error::{Error, Result};
