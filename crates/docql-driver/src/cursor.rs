//! Forward-only result cursor.

use std::collections::HashMap;
use std::rc::Rc;

use docql_ir::{ColumnDescriptor, Value};
use docql_registry::TypeRegistry;

use crate::client::{QueryResponse, WireParameter};
use crate::connection::ConnInner;
use crate::error::{Error, Result};

/// Named bind parameters for one execution.
pub type Params = HashMap<String, Value>;

/// One positional result row, projected onto the column list.
pub type Row = Vec<serde_json::Value>;

/// Forward-only cursor over a buffered document result set.
///
/// Column descriptions are materialized on demand, once per executed
/// statement. Every public operation fails fast if the owning connection or
/// the cursor itself has been closed.
pub struct Cursor {
    conn: Rc<ConnInner>,
    closed: bool,
    response: Option<QueryResponse>,
    pos: usize,
    columns: Option<Vec<ColumnDescriptor>>,
    pub arraysize: usize,
}

impl Cursor {
    pub(crate) fn new(conn: Rc<ConnInner>) -> Self {
        Self {
            conn,
            closed: false,
            response: None,
            pos: 0,
            columns: None,
            arraysize: 1,
        }
    }

    /// Execute a statement with named parameters.
    ///
    /// List-valued parameters are serialized to JSON strings (top level
    /// only; values nested inside an object parameter are left to that
    /// object's own serialization). Failures from the transport are
    /// classified once and re-raised, never retried.
    pub fn execute(&mut self, sql: &str, params: &Params) -> Result<()> {
        self.guard()?;

        let wire = prepare_parameters(&self.conn.registry, params)?;
        tracing::debug!(sql, params = wire.len(), "executing statement");

        let response =
            self.conn
                .client
                .execute_sql(sql, &wire, self.conn.compute_context.as_deref())?;

        self.response = Some(response);
        self.pos = 0;
        self.columns = None;
        Ok(())
    }

    /// Sequential repetition of `execute`, one remote call per set.
    pub fn execute_many(&mut self, sql: &str, param_sets: &[Params]) -> Result<()> {
        for params in param_sets {
            self.execute(sql, params)?;
        }
        Ok(())
    }

    /// Advance by one row, or `None` at exhaustion (indefinitely).
    ///
    /// Documents in the same collection may have different present fields;
    /// any declared column absent from this particular document yields
    /// null.
    pub fn fetch_one(&mut self) -> Result<Option<Row>> {
        self.guard()?;
        self.materialize_columns()?;

        let Some(response) = self.response.as_ref() else {
            return Err(Error::Programming("no statement has been executed".to_string()));
        };
        let Some(doc) = response.results.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;

        let columns = self.columns.as_deref().unwrap_or(&[]);
        let row = columns
            .iter()
            .map(|col| doc.get(&col.name).cloned().unwrap_or(serde_json::Value::Null))
            .collect();
        Ok(Some(row))
    }

    pub fn fetch_many(&mut self, size: Option<usize>) -> Result<Vec<Row>> {
        let size = size.unwrap_or(self.arraysize);
        let mut rows = Vec::new();
        while rows.len() != size {
            match self.fetch_one()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    pub fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Ordered column metadata for the current statement, or `None` before
    /// any statement ran.
    pub fn description(&mut self) -> Result<Option<&[ColumnDescriptor]>> {
        self.guard()?;
        self.materialize_columns()?;
        Ok(self.columns.as_deref())
    }

    /// Total materialized result count. The engine cannot report row counts
    /// incrementally, so this is only meaningful after `execute` returns.
    pub fn rowcount(&self) -> Result<usize> {
        self.guard()?;
        match self.response.as_ref() {
            Some(response) => Ok(response.results.len()),
            None => Err(Error::Programming("no statement has been executed".to_string())),
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.response = None;
        self.columns = None;
    }

    fn guard(&self) -> Result<()> {
        if self.conn.closed.get() {
            return Err(Error::Interface("connection is closed".to_string()));
        }
        if self.closed {
            return Err(Error::Interface("cursor is closed".to_string()));
        }
        Ok(())
    }

    fn materialize_columns(&mut self) -> Result<()> {
        if self.columns.is_some() {
            return Ok(());
        }
        let Some(response) = self.response.as_ref() else {
            return Ok(());
        };
        let columns = describe_response(&self.conn.registry, response)?;
        self.columns = Some(columns);
        Ok(())
    }
}

/// Scoped acquisition: a dropped cursor is a closed cursor.
impl Drop for Cursor {
    fn drop(&mut self) {
        self.close();
    }
}

impl Iterator for Cursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.fetch_one().transpose()
    }
}

/// Build the column list for a response: explicit column-field metadata if
/// the engine sent it, otherwise the shape of the first document. Only the
/// identifier column is non-nullable.
fn describe_response(
    registry: &TypeRegistry,
    response: &QueryResponse,
) -> Result<Vec<ColumnDescriptor>> {
    if let Some(fields) = response.column_fields.as_ref().filter(|f| !f.is_empty()) {
        let first = response.results.first();
        return fields
            .iter()
            .map(|field| {
                let ty = match field.wire_type.as_deref() {
                    Some(tag) => registry.descriptor(tag).map_err(|e| {
                        Error::Programming(format!("{e} in field `{}`", field.name))
                    })?,
                    None => first
                        .and_then(|doc| doc.get(&field.name))
                        .map(|value| registry.infer(value))
                        .unwrap_or_else(|| registry.descriptor_of(docql_ir::Kind::Null)),
                };
                Ok(ColumnDescriptor::new(field.name.clone(), ty))
            })
            .collect();
    }

    let Some(doc) = response.results.first() else {
        return Ok(Vec::new());
    };
    Ok(doc
        .iter()
        .map(|(name, value)| ColumnDescriptor::new(name.clone(), registry.infer(value)))
        .collect())
}

fn prepare_parameters(registry: &TypeRegistry, params: &Params) -> Result<Vec<WireParameter>> {
    params
        .iter()
        .map(|(name, value)| {
            // The parameter protocol has no list type; lists travel as JSON
            // text and get reparsed inside the query.
            let value = match value {
                Value::Array(_) => Value::String(stringify_json(value)?),
                other => other.clone(),
            };
            Ok(WireParameter {
                name: name.clone(),
                wire_type: registry.param_tag(&value),
                value: stringify(&value)?,
            })
        })
        .collect()
}

fn stringify(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Date(_) | Value::Time(_) | Value::DateTime(_) => match value.to_json() {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        },
        Value::Bytes(_) | Value::Array(_) | Value::Object(_) => stringify_json(value)?,
    })
}

fn stringify_json(value: &Value) -> Result<String> {
    serde_json::to_string(&value.to_json())
        .map_err(|e| Error::Programming(format!("unserializable parameter: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_parameters_are_json_serialized() {
        let registry = TypeRegistry::new();
        let params = Params::from([(
            "path".to_string(),
            Value::Array(vec![Value::from("favorites"), Value::from("snack")]),
        )]);

        let wire = prepare_parameters(&registry, &params).unwrap();
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].value, r#"["favorites","snack"]"#);
        assert_eq!(wire[0].wire_type, "string");
    }

    #[test]
    fn scalar_parameters_pass_through() {
        let registry = TypeRegistry::new();
        let params = Params::from([
            ("n".to_string(), Value::Int(7)),
            ("who".to_string(), Value::from("Joe")),
            ("flag".to_string(), Value::Bool(true)),
        ]);

        let wire = prepare_parameters(&registry, &params).unwrap();
        let by_name: HashMap<_, _> = wire.iter().map(|p| (p.name.as_str(), p)).collect();
        assert_eq!(by_name["n"].value, "7");
        assert_eq!(by_name["n"].wire_type, "int");
        assert_eq!(by_name["who"].value, "Joe");
        assert_eq!(by_name["flag"].wire_type, "bool");
    }

    #[test]
    fn lists_nested_in_objects_are_not_reserialized() {
        let registry = TypeRegistry::new();
        let mut fields = std::collections::HashMap::new();
        fields.insert("tags".to_string(), Value::Array(vec![Value::Int(1)]));
        let params = Params::from([("doc".to_string(), Value::Object(fields))]);

        let wire = prepare_parameters(&registry, &params).unwrap();
        assert_eq!(wire[0].wire_type, "object");
        // One level of JSON encoding only: the nested list is a JSON array,
        // not an escaped string.
        assert_eq!(wire[0].value, r#"{"tags":[1]}"#);
    }

    #[test]
    fn temporal_parameters_are_iso_formatted() {
        let registry = TypeRegistry::new();
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let params = Params::from([("d".to_string(), Value::Date(date))]);

        let wire = prepare_parameters(&registry, &params).unwrap();
        assert_eq!(wire[0].value, "2024-03-09");
        assert_eq!(wire[0].wire_type, "date");
    }
}
