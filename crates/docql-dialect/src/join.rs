//! Join-condition rewriting.
//!
//! The engine cannot resolve `workspace.table.column` references inside a
//! join condition when the same physical table also appears
//! workspace-qualified elsewhere in the statement. Re-pointing such columns
//! at an alias named identically to the table breaks the ambiguity without
//! changing semantics.

use docql_ir::{BinOp, Expr, TableRef};

/// One join between two from-items, with an optional explicit alias for the
/// right side.
#[derive(Debug, Clone)]
pub struct JoinClause {
    pub left: TableRef,
    pub right: TableRef,
    pub right_alias: Option<String>,
    pub on: Expr,
}

/// Rewrite a join condition in place.
///
/// Recurses through conjunctive (AND) trees; on every other binary node,
/// each directly referenced column whose owning table is a direct,
/// workspace-qualified collection is re-pointed at a same-named alias.
/// Columns owned by aliases or subqueries are left untouched.
pub fn rewrite_condition(condition: &mut Expr) {
    match condition {
        Expr::BinaryOp { op: BinOp::And, left, right } => {
            rewrite_condition(left);
            rewrite_condition(right);
        }
        Expr::BinaryOp { left, right, .. } => {
            realias_column(left);
            realias_column(right);
        }
        _ => {}
    }
}

fn realias_column(expr: &mut Expr) {
    let Expr::Column { col } = expr else {
        return;
    };
    let Some(TableRef::Collection { workspace: Some(workspace), name }) = &col.table else {
        return;
    };
    if workspace.is_empty() {
        return;
    }
    col.table = Some(TableRef::Alias { name: name.clone() });
}

#[cfg(test)]
mod tests {
    use super::*;
    use docql_ir::ColumnRef;

    fn col(table: Option<TableRef>, name: &str) -> Expr {
        Expr::Column { col: ColumnRef { table, name: name.to_string() } }
    }

    fn collection(workspace: Option<&str>, name: &str) -> TableRef {
        TableRef::Collection {
            workspace: workspace.map(str::to_string),
            name: name.to_string(),
        }
    }

    #[test]
    fn unqualified_tables_are_untouched() {
        let mut cond = Expr::binary(
            BinOp::Eq,
            col(None, "x"),
            col(Some(collection(None, "t2")), "y"),
        );
        let before = cond.clone();
        rewrite_condition(&mut cond);
        assert_eq!(cond, before);
    }

    #[test]
    fn workspace_qualified_columns_get_a_same_named_alias() {
        let mut cond = Expr::binary(
            BinOp::Eq,
            col(Some(collection(Some("s1"), "t1")), "x"),
            col(Some(collection(Some("s2"), "t2")), "y"),
        );
        rewrite_condition(&mut cond);

        let Expr::BinaryOp { left, right, .. } = &cond else { panic!("not binary") };
        let Expr::Column { col: l } = left.as_ref() else { panic!("not a column") };
        let Expr::Column { col: r } = right.as_ref() else { panic!("not a column") };
        assert_eq!(l.table, Some(TableRef::Alias { name: "t1".into() }));
        assert_eq!(r.table, Some(TableRef::Alias { name: "t2".into() }));
    }

    #[test]
    fn aliases_and_subqueries_are_left_alone() {
        let mut cond = Expr::binary(
            BinOp::Eq,
            col(Some(TableRef::Alias { name: "t3".into() }), "y"),
            col(Some(TableRef::Subquery { alias: Some("sq".into()) }), "z"),
        );
        let before = cond.clone();
        rewrite_condition(&mut cond);
        assert_eq!(cond, before);
    }

    #[test]
    fn and_trees_are_rewritten_conjunct_by_conjunct() {
        let qualified = || col(Some(collection(Some("s1"), "t1")), "x");
        let mut cond = Expr::binary(
            BinOp::And,
            Expr::binary(BinOp::Eq, qualified(), col(None, "a")),
            Expr::binary(BinOp::Eq, qualified(), col(None, "b")),
        );
        rewrite_condition(&mut cond);

        let Expr::BinaryOp { left, right, .. } = &cond else { panic!("not binary") };
        for side in [left, right] {
            let Expr::BinaryOp { left: inner, .. } = side.as_ref() else { panic!("not binary") };
            let Expr::Column { col } = inner.as_ref() else { panic!("not a column") };
            assert_eq!(col.table, Some(TableRef::Alias { name: "t1".into() }));
        }
    }
}
