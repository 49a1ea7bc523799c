//! Connection state and connection-string parsing.

use std::cell::Cell;
use std::rc::Rc;

use docql_registry::TypeRegistry;
use url::Url;

use crate::client::QueryClient;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Parameters extracted from a connection URL.
///
/// The credential comes from the URL password, falling back to the
/// username; the optional compute-context identifier comes from the
/// path/database segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectArgs {
    pub api_server: String,
    pub api_key: String,
    pub compute_context: Option<String>,
}

impl ConnectArgs {
    pub fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|e| Error::Programming(format!("invalid connection string: {e}")))?;

        let host = url
            .host_str()
            .ok_or_else(|| Error::Programming("connection string has no host".to_string()))?;

        let api_key = match url.password() {
            Some(password) if !password.is_empty() => password.to_string(),
            _ => url.username().to_string(),
        };
        if api_key.is_empty() {
            return Err(Error::Programming(
                "connection string carries no credential".to_string(),
            ));
        }

        let compute_context = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);

        Ok(Self {
            api_server: format!("https://{host}"),
            api_key,
            compute_context,
        })
    }
}

pub(crate) struct ConnInner {
    pub(crate) client: Box<dyn QueryClient>,
    pub(crate) registry: Rc<TypeRegistry>,
    pub(crate) compute_context: Option<String>,
    pub(crate) closed: Cell<bool>,
}

/// A logical connection to the engine.
///
/// Closing a connection flips a flag that cursor guards check; it does not
/// force-close cursors that are already out. The engine has no sessions or
/// transactions, so there is nothing else to tear down.
pub struct Connection {
    inner: Rc<ConnInner>,
}

impl Connection {
    /// Open a connection and probe connectivity with `SELECT 1`.
    pub fn open(
        client: Box<dyn QueryClient>,
        compute_context: Option<String>,
        registry: Rc<TypeRegistry>,
    ) -> Result<Self> {
        client.execute_sql("SELECT 1", &[], compute_context.as_deref())?;
        tracing::debug!(compute_context = compute_context.as_deref(), "connection opened");
        Ok(Self {
            inner: Rc::new(ConnInner {
                client,
                registry,
                compute_context,
                closed: Cell::new(false),
            }),
        })
    }

    pub fn cursor(&self) -> Result<Cursor> {
        self.guard()?;
        Ok(Cursor::new(Rc::clone(&self.inner)))
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    pub fn close(&self) {
        self.inner.closed.set(true);
    }

    /// No-op; the engine has no transactions.
    pub fn commit(&self) {}

    /// No-op; the engine has no transactions.
    pub fn rollback(&self) {}

    /// Check a statement against the engine without executing it.
    pub fn validate(&self, sql: &str) -> Result<()> {
        self.guard()?;
        self.inner.client.validate_sql(sql)?;
        Ok(())
    }

    pub fn workspaces(&self) -> Result<Vec<String>> {
        self.guard()?;
        Ok(self.inner.client.list_workspaces()?)
    }

    pub fn collections(&self, workspace: Option<&str>) -> Result<Vec<String>> {
        self.guard()?;
        Ok(self.inner.client.list_collections(workspace)?)
    }

    fn guard(&self) -> Result<()> {
        if self.inner.closed.get() {
            return Err(Error::Interface("connection is closed".to_string()));
        }
        Ok(())
    }
}
