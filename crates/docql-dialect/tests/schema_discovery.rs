//! Schema discovery strategies against a scripted transport.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use docql_dialect::{DescribeOptions, Dialect};
use docql_driver::{
    ClientError, ColumnField, Connection, Document, Error, ErrorCategory, QueryClient,
    QueryResponse, WireParameter,
};

/// Scripted client: a validation outcome plus a queue of responses consumed
/// by successive statements (the connectivity probe is answered separately).
struct ScriptedClient {
    validate_err: Option<ClientError>,
    responses: RefCell<VecDeque<Result<QueryResponse, ClientError>>>,
    statements: Rc<RefCell<Vec<String>>>,
}

impl ScriptedClient {
    fn new(
        validate_err: Option<ClientError>,
        responses: Vec<Result<QueryResponse, ClientError>>,
    ) -> Self {
        Self {
            validate_err,
            responses: RefCell::new(responses.into()),
            statements: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl QueryClient for ScriptedClient {
    fn execute_sql(
        &self,
        sql: &str,
        _params: &[WireParameter],
        _compute_context: Option<&str>,
    ) -> Result<QueryResponse, ClientError> {
        if sql == "SELECT 1" {
            return Ok(QueryResponse::default());
        }
        self.statements.borrow_mut().push(sql.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted statement: {sql}"))
    }

    fn validate_sql(&self, _sql: &str) -> Result<(), ClientError> {
        match &self.validate_err {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn list_workspaces(&self) -> Result<Vec<String>, ClientError> {
        Ok(Vec::new())
    }

    fn list_collections(&self, _workspace: Option<&str>) -> Result<Vec<String>, ClientError> {
        Ok(Vec::new())
    }
}

fn doc(value: serde_json::Value) -> Document {
    value.as_object().cloned().expect("fixture documents are objects")
}

fn describe_response() -> QueryResponse {
    QueryResponse {
        results: vec![
            doc(serde_json::json!({"field": ["_event_time"], "type": "timestamp", "occurrences": 8, "total": 8})),
            doc(serde_json::json!({"field": ["_id"], "type": "string", "occurrences": 8, "total": 8})),
            doc(serde_json::json!({"field": ["info"], "type": "object", "occurrences": 8, "total": 8})),
            doc(serde_json::json!({"field": ["info", "lunch"], "type": "string", "occurrences": 6, "total": 8})),
            doc(serde_json::json!({"field": ["name"], "type": "string", "occurrences": 8, "total": 8})),
        ],
        column_fields: None,
    }
}

fn sample_response() -> QueryResponse {
    QueryResponse {
        results: vec![doc(serde_json::json!({
            "_id": "doc-1",
            "name": "Joe",
            "info": {"friends": ["Jack"]}
        }))],
        column_fields: None,
    }
}

fn rejected() -> ClientError {
    ClientError::new(ErrorCategory::BadRequest, "DESCRIBE not supported for this collection")
}

fn connect(dialect: &Dialect, client: ScriptedClient) -> Connection {
    dialect.connect(Box::new(client), None).expect("probe succeeds")
}

#[test]
fn describe_strategy_yields_dotted_nested_paths() {
    let dialect = Dialect::new();
    let conn = connect(&dialect, ScriptedClient::new(None, vec![Ok(describe_response())]));

    let columns = dialect
        .get_columns(&conn, None, "people", &DescribeOptions::default())
        .unwrap();

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["_event_time", "_id", "info", "info.lunch", "name"]);
    assert_eq!(columns[0].ty.wire_tag, "timestamp");
    assert_eq!(columns[2].ty.wire_tag, "object");
    assert!(columns[0].nullable);
    assert!(!columns[1].nullable, "_id is the sole non-null guarantee");
    assert!(columns.iter().all(|c| c.default.is_none()));
}

#[test]
fn describe_statement_carries_field_depth_and_quoting() {
    let dialect = Dialect::new();
    let client = ScriptedClient::new(None, vec![Ok(describe_response())]);
    let statements = client.statements.clone();
    let conn = connect(&dialect, client);

    dialect
        .get_columns(&conn, Some("prod"), "people", &DescribeOptions { field_depth: 3 })
        .unwrap();

    let statements = statements.borrow();
    assert_eq!(
        statements[0],
        "DESCRIBE \"prod\".\"people\" OPTION(max_field_depth = 3)"
    );
}

#[test]
fn describe_marks_only_the_id_field_non_nullable() {
    let response = QueryResponse {
        results: vec![
            doc(serde_json::json!({"field": ["_id"], "type": "string", "occurrences": 4, "total": 4})),
            doc(serde_json::json!({"field": ["person__id"], "type": "string", "occurrences": 4, "total": 4})),
        ],
        column_fields: None,
    };
    let dialect = Dialect::new();
    let conn = connect(&dialect, ScriptedClient::new(None, vec![Ok(response)]));

    let columns = dialect
        .get_columns(&conn, None, "links", &DescribeOptions::default())
        .unwrap();

    assert!(!columns[0].nullable);
    assert!(columns[1].nullable, "only the identifier itself is certified");
}

#[test]
fn validation_failure_falls_back_to_sampling() {
    let dialect = Dialect::new();
    let client = ScriptedClient::new(Some(rejected()), vec![Ok(sample_response())]);
    let statements = client.statements.clone();
    let conn = connect(&dialect, client);

    let columns = dialect
        .get_columns(&conn, None, "people", &DescribeOptions::default())
        .unwrap();

    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["_id", "name", "info"]);
    assert!(!columns[0].nullable);
    assert!(columns[1].nullable);
    assert!(columns[2].nullable);
    assert_eq!(columns[2].ty.wire_tag, "object");

    let statements = statements.borrow();
    assert_eq!(statements[0], "SELECT * FROM \"commons\".\"people\" LIMIT 1");
}

#[test]
fn describe_execution_failure_also_falls_back() {
    let dialect = Dialect::new();
    let client = ScriptedClient::new(None, vec![Err(rejected()), Ok(sample_response())]);
    let conn = connect(&dialect, client);

    let columns = dialect
        .get_columns(&conn, None, "people", &DescribeOptions::default())
        .unwrap();
    assert_eq!(columns.len(), 3);
}

#[test]
fn empty_collection_reports_a_placeholder_column() {
    let dialect = Dialect::new();
    let client = ScriptedClient::new(Some(rejected()), vec![Ok(QueryResponse::default())]);
    let conn = connect(&dialect, client);

    let columns = dialect
        .get_columns(&conn, None, "empty", &DescribeOptions::default())
        .unwrap();

    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].name, "null");
    assert_eq!(columns[0].ty.wire_tag, "null");
    assert!(columns[0].nullable);
}

#[test]
fn unknown_wire_tag_from_sampling_fails_hard() {
    let response = QueryResponse {
        results: vec![doc(serde_json::json!({"x": 1}))],
        column_fields: Some(vec![ColumnField {
            name: "x".to_string(),
            wire_type: Some("decimal128".to_string()),
        }]),
    };
    let dialect = Dialect::new();
    let client = ScriptedClient::new(Some(rejected()), vec![Ok(response)]);
    let conn = connect(&dialect, client);

    let err = dialect
        .get_columns(&conn, Some("prod"), "odd", &DescribeOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Programming(_)), "{err}");
    assert!(err.to_string().contains("decimal128"));
    assert!(err.to_string().contains("prod.odd"));
}

#[test]
fn has_table_reads_programming_failures_as_absent() {
    let dialect = Dialect::new();
    let not_found = ClientError::new(ErrorCategory::NotFound, "collection does not exist");
    let client =
        ScriptedClient::new(Some(rejected()), vec![Err(not_found)]);
    let conn = connect(&dialect, client);

    assert!(!dialect.has_table(&conn, None, "missing").unwrap());
}

#[test]
fn has_table_propagates_operational_failures() {
    let dialect = Dialect::new();
    let suspended = ClientError::new(ErrorCategory::Suspended, "resource suspended");
    let client = ScriptedClient::new(Some(rejected()), vec![Err(suspended)]);
    let conn = connect(&dialect, client);

    assert!(matches!(dialect.has_table(&conn, None, "people"), Err(Error::Operational(_))));
}
