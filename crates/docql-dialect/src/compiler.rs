//! Expression-to-SQL compilation.
//!
//! Consumes an abstract expression tree read-only and produces dialect SQL
//! text plus a named-parameter map. Unsupported shapes fail here, before
//! any network call is made.

use std::collections::HashMap;

use docql_ir::{BinOp, ColumnRef, Expr, Kind, TableRef, Value};
use docql_registry::TypeRegistry;
use thiserror::Error;

use crate::join::{self, JoinClause};
use crate::preparer::IdentifierPreparer;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unsupported operator `{0}`")]
    UnsupportedOperator(String),
}

/// A compiled statement: SQL text plus the named parameters it binds.
/// Immutable once built, discarded after the remote call completes.
#[derive(Debug, Clone)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: HashMap<String, Value>,
}

pub struct Compiler<'r> {
    registry: &'r TypeRegistry,
    preparer: IdentifierPreparer,
}

struct BindCtx {
    params: HashMap<String, Value>,
    counter: usize,
}

impl BindCtx {
    fn new() -> Self {
        Self { params: HashMap::new(), counter: 0 }
    }

    fn bind(&mut self, value: Value) -> String {
        self.counter += 1;
        let name = format!("param_{}", self.counter);
        let placeholder = format!(":{name}");
        self.params.insert(name, value);
        placeholder
    }
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry, preparer: IdentifierPreparer::new() }
    }

    pub fn compile(&self, expr: &Expr) -> Result<CompiledStatement, CompileError> {
        let mut ctx = BindCtx::new();
        let sql = self.render(expr, &mut ctx)?;
        Ok(CompiledStatement { sql, params: ctx.params })
    }

    /// Render a join clause, re-aliasing workspace-qualified column
    /// references in the condition first.
    pub fn compile_join(&self, clause: &JoinClause) -> Result<CompiledStatement, CompileError> {
        let mut on = clause.on.clone();
        join::rewrite_condition(&mut on);

        let mut ctx = BindCtx::new();
        let on_sql = self.render(&on, &mut ctx)?;

        let mut sql = format!(
            "{} JOIN {}",
            self.render_table(&clause.left),
            self.render_table(&clause.right)
        );
        if let Some(alias) = &clause.right_alias {
            sql.push_str(&format!(" AS {}", self.preparer.quote(alias)));
        }
        sql.push_str(&format!(" ON {on_sql}"));
        Ok(CompiledStatement { sql, params: ctx.params })
    }

    fn render(&self, expr: &Expr, ctx: &mut BindCtx) -> Result<String, CompileError> {
        match expr {
            Expr::Column { col } => Ok(self.render_column(col)),
            Expr::Literal { value } => Ok(ctx.bind(value.clone())),
            Expr::Cast { expr, kind } => self.render_cast(expr, *kind, ctx),
            Expr::BinaryOp { op, left, right } => match op {
                // Nested-field access spellings from the portable layer.
                BinOp::JsonGet | BinOp::JsonPath | BinOp::JsonPathText => {
                    self.element_access(left, right, ctx)
                }
                // TODO: decide whether the subscript index should be offset;
                // the engine indexes arrays from 1, the portable layer from 0.
                BinOp::JsonGetText => Ok(format!(
                    "{}[{}]",
                    self.render_operand(left, op.precedence(), false, ctx)?,
                    self.render(right, ctx)?
                )),
                BinOp::Other(symbol) => {
                    Err(CompileError::UnsupportedOperator(symbol.clone()))
                }
                _ => self.render_infix(op, left, right, ctx),
            },
            Expr::PathGet { container, path } => self.element_access(container, path, ctx),
        }
    }

    fn render_cast(
        &self,
        expr: &Expr,
        kind: Kind,
        ctx: &mut BindCtx,
    ) -> Result<String, CompileError> {
        let inner = self.render(expr, ctx)?;
        // The dialect has no parameterized array type, so the array kind
        // always renders as the bare `array` name.
        let type_name = match kind {
            Kind::Array => "array",
            other => self.registry.tag_of(other),
        };
        Ok(format!("CAST({inner} AS {type_name})"))
    }

    /// Nested-field access on a schemaless document.
    ///
    /// A literal multi-key path cannot travel as a list bind parameter (the
    /// protocol has none), so it ships as JSON text and is reparsed inside
    /// the query. Every access is wrapped in TRY: any level of a document
    /// can turn out to be a non-container at runtime, and that must yield
    /// null, not a fault.
    fn element_access(
        &self,
        container: &Expr,
        key: &Expr,
        ctx: &mut BindCtx,
    ) -> Result<String, CompileError> {
        let target = self.render(container, ctx)?;
        let key_sql = match key {
            Expr::Literal { value } if value.is_list() => {
                format!("JSON_PARSE({})", ctx.bind(value.clone()))
            }
            other => self.render(other, ctx)?,
        };
        Ok(format!("TRY(ELEMENT_AT({target}, {key_sql}))"))
    }

    fn render_infix(
        &self,
        op: &BinOp,
        left: &Expr,
        right: &Expr,
        ctx: &mut BindCtx,
    ) -> Result<String, CompileError> {
        let precedence = op.precedence();
        let left_sql = self.render_operand(left, precedence, false, ctx)?;
        let right_sql = self.render_operand(right, precedence, true, ctx)?;
        Ok(format!("{left_sql} {} {right_sql}", op.symbol()))
    }

    fn render_operand(
        &self,
        expr: &Expr,
        parent_precedence: u8,
        is_right: bool,
        ctx: &mut BindCtx,
    ) -> Result<String, CompileError> {
        let sql = self.render(expr, ctx)?;
        let needs_parens = match expr {
            Expr::BinaryOp { op, .. } => {
                let child = op.precedence();
                child < parent_precedence || (is_right && child == parent_precedence)
            }
            _ => false,
        };
        Ok(if needs_parens { format!("({sql})") } else { sql })
    }

    fn render_column(&self, col: &ColumnRef) -> String {
        let column = self.preparer.quote(&col.name);
        match &col.table {
            Some(table) => match self.table_prefix(table) {
                Some(prefix) => format!("{prefix}.{column}"),
                None => column,
            },
            None => column,
        }
    }

    fn table_prefix(&self, table: &TableRef) -> Option<String> {
        match table {
            TableRef::Collection { workspace: Some(ws), name } => {
                Some(format!("{}.{}", self.preparer.quote(ws), self.preparer.quote(name)))
            }
            TableRef::Collection { workspace: None, name } => Some(self.preparer.quote(name)),
            TableRef::Alias { name } => Some(self.preparer.quote(name)),
            TableRef::Subquery { alias } => alias.as_deref().map(|a| self.preparer.quote(a)),
        }
    }

    pub(crate) fn render_table(&self, table: &TableRef) -> String {
        match table {
            TableRef::Collection { workspace: Some(ws), name } => {
                self.preparer.quote_qualified(ws, name)
            }
            TableRef::Collection { workspace: None, name } => self.preparer.quote(name),
            TableRef::Alias { name } => self.preparer.quote(name),
            TableRef::Subquery { alias } => match alias {
                Some(a) => self.preparer.quote(a),
                None => "(subquery)".to_string(),
            },
        }
    }
}
