//! Identifier quoting.

/// Quotes every identifier unconditionally.
///
/// The engine's reserved-word list is unbounded and changes between
/// releases, so the membership test always answers yes and no identifier is
/// ever emitted unquoted.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierPreparer;

impl IdentifierPreparer {
    pub fn new() -> Self {
        Self
    }

    pub fn is_reserved(&self, _identifier: &str) -> bool {
        true
    }

    pub fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    pub fn quote_qualified(&self, workspace: &str, name: &str) -> String {
        format!("{}.{}", self.quote(workspace), self.quote(name))
    }
}
