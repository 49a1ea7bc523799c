//! docql expression IR
//!
//! Abstract relational expression trees produced by a generic query-builder
//! layer and consumed read-only by the dialect compiler. All nodes are
//! deterministically serializable.

use serde::{Deserialize, Serialize};

mod types;
mod value;

pub use types::*;
pub use value::Value;

/// Reference to the relation a column belongs to.
///
/// The join rewriter discriminates on this: only direct,
/// workspace-qualified collection references are re-aliased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TableRef {
    Collection {
        #[serde(skip_serializing_if = "Option::is_none")]
        workspace: Option<String>,
        name: String,
    },
    Alias {
        name: String,
    },
    Subquery {
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableRef>,
    pub name: String,
}

impl ColumnRef {
    pub fn bare(name: impl Into<String>) -> Self {
        Self { table: None, name: name.into() }
    }

    pub fn qualified(table: TableRef, name: impl Into<String>) -> Self {
        Self { table: Some(table), name: name.into() }
    }
}

/// Binary operators, closed at expression-construction time.
///
/// Operator symbols coming from the portable layer are resolved through
/// [`BinOp::from_symbol`]; anything outside the known set is retained as
/// `Other` and rejected deterministically when compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // String
    Like,
    NotLike,
    Concat,
    // JSON path family from the portable layer
    JsonGet,      // ->
    JsonGetText,  // ->>
    JsonPath,     // #>
    JsonPathText, // #>>
    /// Operator symbol outside the known set; fails compilation.
    Other(String),
}

impl BinOp {
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            "=" => BinOp::Eq,
            "!=" | "<>" => BinOp::Ne,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "AND" => BinOp::And,
            "OR" => BinOp::Or,
            "LIKE" => BinOp::Like,
            "NOT LIKE" => BinOp::NotLike,
            "||" => BinOp::Concat,
            "->" => BinOp::JsonGet,
            "->>" => BinOp::JsonGetText,
            "#>" => BinOp::JsonPath,
            "#>>" => BinOp::JsonPathText,
            other => BinOp::Other(other.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "=",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Like => "LIKE",
            BinOp::NotLike => "NOT LIKE",
            BinOp::Concat => "||",
            BinOp::JsonGet => "->",
            BinOp::JsonGetText => "->>",
            BinOp::JsonPath => "#>",
            BinOp::JsonPathText => "#>>",
            BinOp::Other(s) => s,
        }
    }

    /// Binding strength for parenthesization; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::Eq | BinOp::Ne | BinOp::Like | BinOp::NotLike => 3,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 4,
            BinOp::Add | BinOp::Sub | BinOp::Concat => 5,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 6,
            BinOp::JsonGet | BinOp::JsonGetText | BinOp::JsonPath | BinOp::JsonPathText => 7,
            BinOp::Other(_) => 3,
        }
    }
}

/// Expression tree node. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expr {
    Column { col: ColumnRef },
    Literal { value: Value },
    BinaryOp { op: BinOp, left: Box<Expr>, right: Box<Expr> },
    Cast { expr: Box<Expr>, kind: Kind },
    /// Nested-field or array-element access; `path` is a single key/index
    /// or a literal multi-key list.
    PathGet { container: Box<Expr>, path: Box<Expr> },
}

impl Expr {
    pub fn column(col: ColumnRef) -> Self {
        Expr::Column { col }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal { value: value.into() }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn cast(expr: Expr, kind: Kind) -> Self {
        Expr::Cast { expr: Box::new(expr), kind }
    }

    pub fn path(container: Expr, path: Expr) -> Self {
        Expr::PathGet { container: Box::new(container), path: Box::new(path) }
    }

    /// Multi-key path access, e.g. `info[["favorites", "snack"]]`.
    pub fn path_keys<I, S>(container: Expr, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys.into_iter().map(|k| Value::String(k.into())).collect();
        Self::path(container, Expr::Literal { value: Value::Array(keys) })
    }
}
