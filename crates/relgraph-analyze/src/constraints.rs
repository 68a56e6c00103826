use std::collections::BTreeSet;

use tracing::{debug, warn};

use relgraph_core::{Dataset, Entity, Relationship, RelationshipType, keys, sources};
use relgraph_introspect::{FkAction, SchemaProvider};

use crate::analyzer::Analyzer;
use crate::config::{AnalysisConfig, SelfReferencePolicy};
use crate::error::Result;
use crate::scope::Scope;

/// Referenced column used when neither the constraint nor the referenced
/// table names one.
const IMPLICIT_KEY: &str = "id";

/// One declared foreign key inside the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRecord {
    pub from_table: String,
    pub to_table: String,
    pub kind: RelationshipType,
    pub from_column: String,
    pub to_column: String,
    pub constraint_name: Option<String>,
    pub on_delete: FkAction,
    pub on_update: FkAction,
}

/// Relationships from explicit schema foreign-key constraints.
pub struct ConstraintAnalyzer<'a> {
    schema: &'a dyn SchemaProvider,
    scope: Scope,
    self_reference: SelfReferencePolicy,
}

impl<'a> ConstraintAnalyzer<'a> {
    pub fn new(schema: &'a dyn SchemaProvider, scope: Scope) -> Self {
        Self {
            schema,
            scope,
            self_reference: SelfReferencePolicy::Drop,
        }
    }

    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.self_reference = config.self_reference.constraints;
        self
    }

    pub fn with_self_reference(mut self, policy: SelfReferencePolicy) -> Self {
        self.self_reference = policy;
        self
    }

    /// Primary key column of `table`, falling back to `id`.
    fn implicit_key(&self, table: &str) -> String {
        match self.schema.list_columns(table) {
            Ok(columns) => columns
                .into_iter()
                .find(|column| column.is_primary_key)
                .map(|column| column.name)
                .unwrap_or_else(|| IMPLICIT_KEY.to_string()),
            Err(err) => {
                debug!(table, error = %err, "primary key lookup failed, assuming id");
                IMPLICIT_KEY.to_string()
            }
        }
    }
}

impl Analyzer for ConstraintAnalyzer<'_> {
    type Raw = Vec<ConstraintRecord>;

    fn name(&self) -> &'static str {
        "constraints"
    }

    fn analyzer_type(&self) -> &'static str {
        sources::DATABASE_SCHEMA
    }

    fn analyze(&self) -> Result<Self::Raw> {
        let scope = self.scope.resolve(self.schema)?;
        let mut records = Vec::new();

        for table in scope.tables() {
            let foreign_keys = match self.schema.list_foreign_keys(table) {
                Ok(foreign_keys) => foreign_keys,
                Err(err) => {
                    warn!(
                        analyzer = self.name(),
                        table,
                        error = %err,
                        "skipping table with unreadable constraints"
                    );
                    continue;
                }
            };

            for fk in foreign_keys {
                if !scope.contains(&fk.to_table) {
                    debug!(
                        table,
                        to_table = %fk.to_table,
                        "constraint target outside scope"
                    );
                    continue;
                }
                let to_column = match fk.to_column {
                    Some(column) => column,
                    None => self.implicit_key(&fk.to_table),
                };
                records.push(ConstraintRecord {
                    from_table: table.to_string(),
                    to_table: fk.to_table,
                    kind: RelationshipType::ForeignKey,
                    from_column: fk.column,
                    to_column,
                    constraint_name: fk.constraint_name,
                    on_delete: fk.on_delete,
                    on_update: fk.on_update,
                });
            }
        }

        Ok(records)
    }

    fn transform_to_dataset(&self, raw: Self::Raw) -> Result<Dataset> {
        let mut dataset = Dataset::new();

        let tables: BTreeSet<&str> = raw
            .iter()
            .flat_map(|record| [record.from_table.as_str(), record.to_table.as_str()])
            .collect();
        for table in tables {
            dataset.add_entity(
                Entity::new(table, table)
                    .with_type("table")
                    .with_metadata(keys::TABLE_NAME, table)
                    .with_metadata(keys::SOURCE, sources::DATABASE_SCHEMA),
            )?;
        }

        for record in raw {
            let mut relationship =
                Relationship::new(&record.from_table, &record.to_table, record.kind)
                    .with_metadata(keys::FROM_COLUMN, record.from_column)
                    .with_metadata(keys::TO_COLUMN, record.to_column)
                    .with_metadata("on_delete", record.on_delete.as_str())
                    .with_metadata("on_update", record.on_update.as_str());
            if let Some(name) = record.constraint_name {
                relationship = relationship
                    .with_label(name.clone())
                    .with_metadata(keys::CONSTRAINT_NAME, name);
            }
            match self.self_reference.apply(relationship) {
                Some(relationship) => dataset.add_relationship(relationship)?,
                None => debug!(table = %record.from_table, "dropping self-referential constraint"),
            }
        }

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relgraph_introspect::{
        ColumnInfo, ForeignKeyInfo, SchemaSnapshot, SnapshotProvider, TableSnapshot,
    };

    fn provider() -> SnapshotProvider {
        SnapshotProvider::new(SchemaSnapshot::new(
            vec![
                TableSnapshot::new("accounts")
                    .with_columns(vec![ColumnInfo::new("uuid", "uuid").primary_key()]),
                TableSnapshot::new("users").with_foreign_keys(vec![
                    ForeignKeyInfo::new("account_uuid", "accounts").named("fk_users_account"),
                ]),
                TableSnapshot::new("employees").with_foreign_keys(vec![
                    ForeignKeyInfo::new("manager_id", "employees")
                        .to_column("id")
                        .named("fk_employees_manager"),
                ]),
            ],
            Vec::new(),
        ))
    }

    #[test]
    fn implicit_reference_uses_target_primary_key() {
        let provider = provider();
        let analyzer = ConstraintAnalyzer::new(&provider, Scope::Global);
        let records = analyzer.analyze().expect("analyze");
        let record = records
            .iter()
            .find(|record| record.from_table == "users")
            .expect("users record");
        assert_eq!(record.to_column, "uuid");
        assert_eq!(record.constraint_name.as_deref(), Some("fk_users_account"));
    }

    #[test]
    fn self_referential_constraints_are_dropped_by_default() {
        let provider = provider();
        let dataset = ConstraintAnalyzer::new(&provider, Scope::Global).run();
        assert!(
            dataset
                .relationships()
                .iter()
                .all(|rel| !rel.is_self_referential())
        );
        assert!(dataset.contains_entity("employees"));
        assert!(dataset.valid());
    }

    #[test]
    fn flag_policy_keeps_self_referential_constraints() {
        let provider = provider();
        let dataset = ConstraintAnalyzer::new(&provider, Scope::Global)
            .with_self_reference(SelfReferencePolicy::Flag)
            .run();
        let self_ref = dataset
            .relationships()
            .iter()
            .find(|rel| rel.is_self_referential())
            .expect("self reference kept");
        assert!(self_ref.is_flagged_self_referential());
        assert!(dataset.valid());
    }
}
