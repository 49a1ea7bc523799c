use docql_dialect::Dialect;
use docql_ir::{BinOp, ColumnRef, Expr, Kind, TableRef};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let dialect = Dialect::new();
    let compiler = dialect.compiler();

    let samples = vec![
        (
            "single key",
            Expr::path(
                Expr::column(ColumnRef::bare("info")),
                Expr::literal("favorites"),
            ),
        ),
        (
            "nested path",
            Expr::path_keys(Expr::column(ColumnRef::bare("info")), ["favorites", "snack"]),
        ),
        (
            "cast to array",
            Expr::cast(Expr::column(ColumnRef::bare("tags")), Kind::Array),
        ),
        (
            "qualified comparison",
            Expr::binary(
                BinOp::Eq,
                Expr::column(ColumnRef::qualified(
                    TableRef::Collection { workspace: None, name: "people".to_string() },
                    "name",
                )),
                Expr::literal("Joe"),
            ),
        ),
    ];

    for (label, expr) in samples {
        match compiler.compile(&expr) {
            Ok(compiled) => {
                println!("{label}: {}", compiled.sql);
                for (name, value) in &compiled.params {
                    println!("  :{name} = {:?}", value);
                }
            }
            Err(e) => println!("{label}: error: {e}"),
        }
    }
}
