//! Schema discovery for schemaless collections.
//!
//! Two strategies, tried in order: a describe-style introspection query
//! (precise per-field nested typing, but rejected by some collection kinds
//! such as pre-aggregated rollups), then sampling a single row (universally
//! available, but blind to fields absent from the sampled document).

use std::collections::HashMap;

use docql_driver::{Connection, Cursor, Error, Params, Result};
use docql_ir::ColumnDescriptor;
use docql_registry::TypeRegistry;

use crate::preparer::IdentifierPreparer;

/// Options for the describe strategy.
#[derive(Debug, Clone)]
pub struct DescribeOptions {
    /// Maximum field-nesting depth the describe query reports.
    pub field_depth: u32,
}

impl Default for DescribeOptions {
    fn default() -> Self {
        Self { field_depth: 1 }
    }
}

pub struct SchemaDiscovery<'r> {
    registry: &'r TypeRegistry,
    preparer: IdentifierPreparer,
}

impl<'r> SchemaDiscovery<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry, preparer: IdentifierPreparer::new() }
    }

    /// Ordered column list for one collection.
    pub fn get_columns(
        &self,
        conn: &Connection,
        workspace: &str,
        collection: &str,
        options: &DescribeOptions,
    ) -> Result<Vec<ColumnDescriptor>> {
        match self.columns_from_describe(conn, workspace, collection, options) {
            Ok(columns) => Ok(columns),
            // The one deliberately absorbed error: a second strategy exists
            // to recover, so a describe failure is control flow, not a fault.
            Err(err) => {
                tracing::debug!(%err, workspace, collection, "describe failed, sampling one row");
                self.columns_from_sample(conn, workspace, collection)
            }
        }
    }

    fn columns_from_describe(
        &self,
        conn: &Connection,
        workspace: &str,
        collection: &str,
        options: &DescribeOptions,
    ) -> Result<Vec<ColumnDescriptor>> {
        let sql = format!(
            "DESCRIBE {} OPTION(max_field_depth = {})",
            self.preparer.quote_qualified(workspace, collection),
            options.field_depth
        );

        // Rollup-style collections reject describe semantics; validate
        // first and abandon the whole strategy on any failure rather than
        // partially trusting its output.
        conn.validate(&sql)?;

        let mut cursor = conn.cursor()?;
        cursor.execute(&sql, &Params::new())?;

        let (field_idx, type_idx) = describe_positions(&mut cursor)?;

        let mut columns = Vec::new();
        while let Some(row) = cursor.fetch_one()? {
            let path = dotted_path(row.get(field_idx))?;
            let tag = row
                .get(type_idx)
                .and_then(|v| v.as_str())
                .ok_or_else(|| Error::Programming("describe row has no type tag".to_string()))?;
            let ty = self.registry.descriptor(tag)?;
            // Describe output certifies non-nullness only for the
            // identifier field itself, not for `__id`-suffixed lookalikes.
            let nullable = path != "_id";
            columns.push(ColumnDescriptor { name: path, ty, nullable, default: None });
        }

        if columns.is_empty() {
            return Err(Error::Programming(format!(
                "describe returned no fields for {workspace}.{collection}"
            )));
        }
        Ok(columns)
    }

    fn columns_from_sample(
        &self,
        conn: &Connection,
        workspace: &str,
        collection: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        let sql = format!(
            "SELECT * FROM {} LIMIT 1",
            self.preparer.quote_qualified(workspace, collection)
        );
        let mut cursor = conn.cursor()?;
        cursor.execute(&sql, &Params::new())?;

        let columns = cursor
            .description()
            .map_err(|err| in_collection(err, workspace, collection))?
            .map(<[ColumnDescriptor]>::to_vec)
            .unwrap_or_default();

        if columns.is_empty() {
            // An empty schema would be indistinguishable from "collection
            // does not exist", so an empty collection reports a placeholder.
            let null_ty = self.registry.descriptor_of(docql_ir::Kind::Null);
            return Ok(vec![ColumnDescriptor::new("null", null_ty)]);
        }
        Ok(columns)
    }
}

fn describe_positions(cursor: &mut Cursor) -> Result<(usize, usize)> {
    let description = cursor
        .description()?
        .ok_or_else(|| Error::Programming("describe produced no result".to_string()))?;
    let position = |name: &str| {
        description
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::Programming(format!("describe result has no `{name}` column")))
    };
    Ok((position("field")?, position("type")?))
}

/// Join the segments of a describe field path with dots.
fn dotted_path(value: Option<&serde_json::Value>) -> Result<String> {
    let segments = value
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::Programming("describe row has no field path".to_string()))?;
    let parts: Vec<&str> = segments.iter().filter_map(|s| s.as_str()).collect();
    if parts.len() != segments.len() {
        return Err(Error::Programming("describe field path has non-string segments".to_string()));
    }
    Ok(parts.join("."))
}

fn in_collection(err: Error, workspace: &str, collection: &str) -> Error {
    match err {
        Error::Programming(message) => {
            Error::Programming(format!("{message} in collection {workspace}.{collection}"))
        }
        other => other,
    }
}
