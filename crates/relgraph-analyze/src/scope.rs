use std::collections::BTreeSet;

use relgraph_introspect::SchemaProvider;

use crate::error::Result;

/// Tables an analysis run is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    /// Every table the schema provider lists.
    #[default]
    Global,
    /// Only these tables, typically the ones touched by a session. An empty
    /// set scopes to nothing; it is not read as global.
    Tables(BTreeSet<String>),
}

impl Scope {
    pub fn tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Scope::Tables(tables.into_iter().map(Into::into).collect())
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Scope::Global)
    }

    /// Turn the scope into a concrete table set.
    ///
    /// Only [`Scope::Global`] consults the schema provider.
    pub fn resolve(&self, schema: &dyn SchemaProvider) -> Result<ResolvedScope> {
        let tables = match self {
            Scope::Global => schema.list_tables()?.into_iter().collect(),
            Scope::Tables(tables) => tables.clone(),
        };
        Ok(ResolvedScope {
            tables,
            global: self.is_global(),
        })
    }
}

/// Concrete table set for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    tables: BTreeSet<String>,
    global: bool,
}

impl ResolvedScope {
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Both endpoints must be inside the scope.
    pub fn includes_pair(&self, from: &str, to: &str) -> bool {
        self.contains(from) && self.contains(to)
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn is_global(&self) -> bool {
        self.global
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_introspect::{SchemaSnapshot, SnapshotProvider, TableSnapshot};

    fn provider() -> SnapshotProvider {
        SnapshotProvider::new(SchemaSnapshot::new(
            vec![TableSnapshot::new("users"), TableSnapshot::new("orders")],
            Vec::new(),
        ))
    }

    #[test]
    fn global_scope_lists_every_table() {
        let resolved = Scope::Global.resolve(&provider()).expect("resolve");
        assert!(resolved.is_global());
        assert_eq!(resolved.tables().collect::<Vec<_>>(), vec!["orders", "users"]);
    }

    #[test]
    fn explicit_scope_is_kept_verbatim() {
        let resolved = Scope::tables(["users", "payments"])
            .resolve(&provider())
            .expect("resolve");
        assert!(!resolved.is_global());
        assert!(resolved.contains("payments"));
        assert!(!resolved.contains("orders"));
        assert!(resolved.includes_pair("users", "payments"));
        assert!(!resolved.includes_pair("users", "orders"));
    }

    #[test]
    fn empty_explicit_scope_is_not_global() {
        let resolved = Scope::tables(Vec::<String>::new())
            .resolve(&provider())
            .expect("resolve");
        assert!(!resolved.is_global());
        assert!(resolved.is_empty());
        assert!(!resolved.contains("users"));
    }
}
