//! Dialect facade.
//!
//! Wires the registry, compiler, preparer and schema discovery together and
//! exposes the capability surface a generic relational-access layer asks
//! about. The engine has no foreign keys, views, indexes or transactions;
//! the corresponding answers are constants.

use std::rc::Rc;

use docql_driver::{ConnectArgs, Connection, QueryClient, Result};
use docql_ir::ColumnDescriptor;
use docql_registry::TypeRegistry;

use crate::compiler::Compiler;
use crate::preparer::IdentifierPreparer;
use crate::schema::{DescribeOptions, SchemaDiscovery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    Named,
}

/// Static capability flags for the generic relational layer.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    pub paramstyle: ParamStyle,
    pub positional_parameters: bool,
    pub supports_alter: bool,
    pub supports_sequences: bool,
    pub supports_native_enum: bool,
    pub supports_native_boolean: bool,
    pub supports_default_values: bool,
    pub supports_savepoints: bool,
    pub supports_transactions: bool,
    pub supports_sane_rowcount: bool,
    pub supports_statement_cache: bool,
    pub default_workspace: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryKeyConstraint {
    pub columns: Vec<String>,
    pub name: String,
}

pub struct Dialect {
    registry: Rc<TypeRegistry>,
    preparer: IdentifierPreparer,
}

impl Dialect {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(TypeRegistry::new()),
            preparer: IdentifierPreparer::new(),
        }
    }

    pub const fn capabilities() -> Capabilities {
        Capabilities {
            paramstyle: ParamStyle::Named,
            positional_parameters: false,
            supports_alter: false,
            supports_sequences: false,
            supports_native_enum: false,
            supports_native_boolean: true,
            supports_default_values: false,
            supports_savepoints: false,
            supports_transactions: false,
            supports_sane_rowcount: false,
            supports_statement_cache: true,
            default_workspace: "commons",
        }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn preparer(&self) -> &IdentifierPreparer {
        &self.preparer
    }

    pub fn compiler(&self) -> Compiler<'_> {
        Compiler::new(&self.registry)
    }

    /// Extract driver parameters from a connection URL.
    pub fn connect_args(url: &str) -> Result<ConnectArgs> {
        ConnectArgs::from_url(url)
    }

    /// Open a connection sharing this dialect's type registry.
    pub fn connect(
        &self,
        client: Box<dyn QueryClient>,
        compute_context: Option<String>,
    ) -> Result<Connection> {
        Connection::open(client, compute_context, Rc::clone(&self.registry))
    }

    pub fn schema_names(&self, conn: &Connection) -> Result<Vec<String>> {
        conn.workspaces()
    }

    pub fn table_names(&self, conn: &Connection, workspace: Option<&str>) -> Result<Vec<String>> {
        conn.collections(workspace)
    }

    /// Column list for a collection; `workspace` defaults to the engine's
    /// default workspace.
    pub fn get_columns(
        &self,
        conn: &Connection,
        workspace: Option<&str>,
        collection: &str,
        options: &DescribeOptions,
    ) -> Result<Vec<ColumnDescriptor>> {
        let workspace = workspace.unwrap_or(Self::capabilities().default_workspace);
        SchemaDiscovery::new(&self.registry).get_columns(conn, workspace, collection, options)
    }

    /// Existence probe. A Programming-class discovery failure reads as
    /// "absent"; interface, operational and internal failures propagate.
    pub fn has_table(
        &self,
        conn: &Connection,
        workspace: Option<&str>,
        collection: &str,
    ) -> Result<bool> {
        match self.get_columns(conn, workspace, collection, &DescribeOptions::default()) {
            Ok(_) => Ok(true),
            Err(docql_driver::Error::Programming(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Every collection is keyed by `_id`.
    pub fn primary_key(&self) -> PrimaryKeyConstraint {
        PrimaryKeyConstraint { columns: vec!["_id".to_string()], name: "_id_pk".to_string() }
    }

    /// The engine has no foreign keys.
    pub fn foreign_keys(&self, _conn: &Connection, _collection: &str) -> Vec<String> {
        Vec::new()
    }

    /// The engine has no secondary indexes.
    pub fn indexes(&self, _conn: &Connection, _collection: &str) -> Vec<String> {
        Vec::new()
    }

    /// The engine has no views.
    pub fn view_names(&self, _conn: &Connection, _workspace: Option<&str>) -> Vec<String> {
        Vec::new()
    }

    /// No transactions; rollback is a no-op.
    pub fn rollback(&self, conn: &Connection) {
        conn.rollback();
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_flags_match_the_engine() {
        let caps = Dialect::capabilities();
        assert_eq!(caps.paramstyle, ParamStyle::Named);
        assert!(!caps.positional_parameters);
        assert!(!caps.supports_transactions);
        assert!(!caps.supports_savepoints);
        assert!(caps.supports_native_boolean);
        assert!(!caps.supports_native_enum);
        assert_eq!(caps.default_workspace, "commons");
    }

    #[test]
    fn primary_key_is_always_the_id_column() {
        let pk = Dialect::new().primary_key();
        assert_eq!(pk.columns, vec!["_id".to_string()]);
        assert_eq!(pk.name, "_id_pk");
    }
}
