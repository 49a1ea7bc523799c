//! docql SQL dialect
//!
//! Rewrites abstract relational expressions into the document engine's SQL
//! dialect, infers relational schemas for schemaless collections, and
//! exposes the capability surface a generic relational layer expects.

mod compiler;
mod dialect;
pub mod join;
mod preparer;
mod schema;

pub use compiler::{CompileError, CompiledStatement, Compiler};
pub use dialect::{Capabilities, Dialect, ParamStyle, PrimaryKeyConstraint};
pub use join::JoinClause;
pub use preparer::IdentifierPreparer;
pub use schema::{DescribeOptions, SchemaDiscovery};
