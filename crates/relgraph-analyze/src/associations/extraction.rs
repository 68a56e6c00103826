use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use relgraph_core::RelationshipType;
use relgraph_introspect::{
    AssociationInfo, AssociationKind, AssociationProvider, ColumnInfo, SchemaProvider,
};

use super::discovery::{DiscoveredTable, resolve_backing_table};
use crate::scope::ResolvedScope;

/// One declared association, or a `node_only` placeholder for a type with
/// no association inside the scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationRecord {
    pub source_table: String,
    pub source_type: String,
    pub target_table: String,
    pub target_type: String,
    pub kind: RelationshipType,
    pub through_table: Option<String>,
    pub join_table: Option<String>,
    pub foreign_key: Option<String>,
    pub association_name: Option<String>,
}

impl AssociationRecord {
    fn node_only(table: &str, model: &str) -> Self {
        Self {
            source_table: table.to_string(),
            source_type: model.to_string(),
            target_table: table.to_string(),
            target_type: model.to_string(),
            kind: RelationshipType::NodeOnly,
            through_table: None,
            join_table: None,
            foreign_key: None,
            association_name: None,
        }
    }

    pub fn is_node_only(&self) -> bool {
        self.kind == RelationshipType::NodeOnly
    }
}

/// Everything the dataset builder needs, gathered while the providers are
/// being read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationData {
    pub records: Vec<AssociationRecord>,
    /// Columns per table, taken from the first model type seen for it.
    pub columns: BTreeMap<String, Vec<ColumnInfo>>,
    /// Columns known to hold foreign keys, per table.
    pub foreign_key_columns: BTreeMap<String, BTreeSet<String>>,
}

/// Default join table: both table names sorted and joined with `_`.
pub fn default_join_table(left: &str, right: &str) -> String {
    let mut names = [left, right];
    names.sort_unstable();
    names.join("_")
}

pub struct Extractor<'a> {
    models: &'a dyn AssociationProvider,
    schema: &'a dyn SchemaProvider,
    scope: &'a ResolvedScope,
    data: AssociationData,
}

impl<'a> Extractor<'a> {
    pub fn new(
        models: &'a dyn AssociationProvider,
        schema: &'a dyn SchemaProvider,
        scope: &'a ResolvedScope,
    ) -> Self {
        Self {
            models,
            schema,
            scope,
            data: AssociationData::default(),
        }
    }

    pub fn extract(mut self, discovered: &[DiscoveredTable]) -> AssociationData {
        for group in discovered {
            self.record_declared_keys(&group.table);
            for model in &group.model_types {
                self.collect_columns(&group.table, model);
                self.extract_model(&group.table, model);
            }
        }
        self.data
    }

    fn extract_model(&mut self, table: &str, model: &str) {
        let associations = match self.models.associations_of(model) {
            Ok(associations) => associations,
            Err(err) => {
                warn!(model, error = %err, "skipping model with unreadable associations");
                return;
            }
        };

        let mut emitted = 0usize;
        for association in associations {
            if let Some(record) = self.extract_association(table, model, &association) {
                debug!(
                    model,
                    association = %association.name,
                    target = %record.target_table,
                    "association extracted"
                );
                self.data.records.push(record);
                emitted += 1;
            }
        }

        if emitted == 0 {
            debug!(model, table, "no associations in scope, keeping as isolated node");
            self.data.records.push(AssociationRecord::node_only(table, model));
        }
    }

    fn extract_association(
        &mut self,
        table: &str,
        model: &str,
        association: &AssociationInfo,
    ) -> Option<AssociationRecord> {
        let declared = match self.models.table_of(&association.target_type) {
            Ok(declared) => declared,
            Err(err) => {
                warn!(
                    model,
                    association = %association.name,
                    error = %err,
                    "skipping association with unknown target"
                );
                return None;
            }
        };
        let Some(target_table) = resolve_backing_table(&declared, self.schema) else {
            debug!(model, association = %association.name, "target table does not exist");
            return None;
        };
        if !self.scope.contains(&target_table) {
            return None;
        }

        if let Some(column) = association.owning_column() {
            self.mark_foreign_key(table, column);
        } else if let Some(column) = &association.foreign_key {
            if matches!(
                association.kind,
                AssociationKind::HasOne | AssociationKind::HasMany
            ) {
                self.mark_foreign_key(&target_table, column.clone());
            }
        }
        if !self.data.columns.contains_key(&target_table) {
            self.collect_columns(&target_table, &association.target_type);
        }

        let through_table = association.through_type.as_ref().and_then(|through| {
            match self.models.table_of(through) {
                Ok(declared) => resolve_backing_table(&declared, self.schema).or(Some(declared)),
                Err(err) => {
                    warn!(model, through = %through, error = %err, "through type has no table");
                    None
                }
            }
        });
        let join_table = match association.kind {
            AssociationKind::HasAndBelongsToMany => Some(
                association
                    .join_table
                    .clone()
                    .unwrap_or_else(|| default_join_table(table, &target_table)),
            ),
            _ => association.join_table.clone(),
        };

        Some(AssociationRecord {
            source_table: table.to_string(),
            source_type: model.to_string(),
            target_table,
            target_type: association.target_type.clone(),
            kind: association.relationship_type(),
            through_table,
            join_table,
            foreign_key: association
                .owning_column()
                .or_else(|| association.foreign_key.clone()),
            association_name: Some(association.name.clone()),
        })
    }

    fn collect_columns(&mut self, table: &str, model: &str) {
        if self.data.columns.contains_key(table) {
            return;
        }
        match self.models.columns_of(model) {
            Ok(columns) => {
                self.data.columns.insert(table.to_string(), columns);
            }
            Err(err) => warn!(model, error = %err, "columns unavailable"),
        }
    }

    /// Foreign keys declared in the schema itself, when it can be read.
    fn record_declared_keys(&mut self, table: &str) {
        if let Ok(foreign_keys) = self.schema.list_foreign_keys(table) {
            for fk in foreign_keys {
                self.mark_foreign_key(table, fk.column);
            }
        }
    }

    fn mark_foreign_key(&mut self, table: &str, column: String) {
        self.data
            .foreign_key_columns
            .entry(table.to_string())
            .or_default()
            .insert(column);
    }
}
