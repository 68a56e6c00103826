//! Relationships guessed from naming and structure when no explicit
//! evidence exists.
//!
//! Three independent passes run over the same column listing and their
//! records are concatenated. A table pair can receive several edges with
//! different confidences; nothing here ranks or merges them.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use relgraph_core::{Dataset, Entity, Relationship, RelationshipType, keys, sources};
use relgraph_introspect::{ColumnInfo, SchemaProvider};

use crate::analyzer::Analyzer;
use crate::config::{AnalysisConfig, InferenceConfig, SelfReferencePolicy};
use crate::error::Result;
use crate::inflect::pluralize;
use crate::scope::{ResolvedScope, Scope};

const ID_SUFFIX: &str = "_id";
const PRIMARY_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceType {
    NamingConvention,
    JunctionTable,
    AuditPattern,
}

impl InferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferenceType::NamingConvention => "naming_convention",
            InferenceType::JunctionTable => "junction_table",
            InferenceType::AuditPattern => "audit_pattern",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRecord {
    pub from_table: String,
    pub to_table: String,
    pub kind: RelationshipType,
    pub inference_type: InferenceType,
    pub confidence: f64,
    pub from_column: Option<String>,
    pub to_column: Option<String>,
    pub label: Option<String>,
    pub junction_table: Option<String>,
    /// The junction table's own key columns, left then right.
    pub junction_columns: Option<(String, String)>,
}

/// Column listings for every readable table in scope.
pub type TableColumns = BTreeMap<String, Vec<ColumnInfo>>;

fn is_reference_column(name: &str) -> bool {
    name != PRIMARY_KEY && name.ends_with(ID_SUFFIX)
}

/// Resolves column stems to in-scope tables.
pub struct TableResolver<'a> {
    schema: &'a dyn SchemaProvider,
    scope: &'a ResolvedScope,
}

impl<'a> TableResolver<'a> {
    pub fn new(schema: &'a dyn SchemaProvider, scope: &'a ResolvedScope) -> Self {
        Self { schema, scope }
    }

    pub fn is_available(&self, table: &str) -> bool {
        self.scope.contains(table) && self.schema.table_exists(table)
    }

    /// Table referenced by an `_id` column: pluralized stem first, then the
    /// literal stem.
    pub fn resolve_column(&self, column: &str) -> Option<String> {
        let stem = column.strip_suffix(ID_SUFFIX)?;
        if stem.is_empty() {
            return None;
        }
        [pluralize(stem), stem.to_string()]
            .into_iter()
            .find(|candidate| self.is_available(candidate))
    }
}

/// Every `<stem>_id` column pointing at an existing in-scope table.
pub fn naming_convention_pass(
    tables: &TableColumns,
    resolver: &TableResolver<'_>,
    config: &InferenceConfig,
) -> Vec<InferenceRecord> {
    let mut records = Vec::new();
    for (table, columns) in tables {
        for column in columns.iter().filter(|col| is_reference_column(&col.name)) {
            let Some(target) = resolver.resolve_column(&column.name) else {
                continue;
            };
            records.push(InferenceRecord {
                from_table: table.clone(),
                to_table: target,
                kind: RelationshipType::InferredBelongsTo,
                inference_type: InferenceType::NamingConvention,
                confidence: config.naming_confidence,
                from_column: Some(column.name.clone()),
                to_column: Some(PRIMARY_KEY.to_string()),
                label: Some(column.name.clone()),
                junction_table: None,
                junction_columns: None,
            });
        }
    }
    records
}

/// Whether a table looks like a many-to-many bridge.
pub fn is_junction_table(table: &str, columns: &[ColumnInfo], config: &InferenceConfig) -> bool {
    let id_columns = columns
        .iter()
        .filter(|col| is_reference_column(&col.name))
        .count();
    table.contains(config.junction_separator.as_str())
        || (id_columns >= 2 && columns.len() <= id_columns + config.junction_extra_columns)
}

/// Pairs of tables bridged by a junction table.
pub fn junction_table_pass(
    tables: &TableColumns,
    resolver: &TableResolver<'_>,
    config: &InferenceConfig,
) -> Vec<InferenceRecord> {
    let mut records = Vec::new();
    for (table, columns) in tables {
        if !is_junction_table(table, columns, config) {
            continue;
        }
        let id_columns: Vec<&ColumnInfo> = columns
            .iter()
            .filter(|col| is_reference_column(&col.name))
            .collect();

        for (idx, left) in id_columns.iter().enumerate() {
            for right in &id_columns[idx + 1..] {
                let (Some(left_table), Some(right_table)) = (
                    resolver.resolve_column(&left.name),
                    resolver.resolve_column(&right.name),
                ) else {
                    continue;
                };
                debug!(
                    junction = %table,
                    left = %left_table,
                    right = %right_table,
                    "junction pair resolved"
                );
                records.push(InferenceRecord {
                    from_table: left_table,
                    to_table: right_table,
                    kind: RelationshipType::InferredManyToMany,
                    inference_type: InferenceType::JunctionTable,
                    confidence: config.junction_confidence,
                    from_column: None,
                    to_column: None,
                    label: Some(format!("many-to-many via {table}")),
                    junction_table: Some(table.clone()),
                    junction_columns: Some((left.name.clone(), right.name.clone())),
                });
            }
        }
    }
    records
}

/// Audit columns pointing at the first user-like table in scope.
pub fn audit_pattern_pass(
    tables: &TableColumns,
    resolver: &TableResolver<'_>,
    config: &InferenceConfig,
) -> Vec<InferenceRecord> {
    let Some(user_table) = config
        .user_table_candidates
        .iter()
        .find(|candidate| resolver.is_available(candidate))
    else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for (table, columns) in tables {
        for column in columns
            .iter()
            .filter(|col| config.audit_columns.contains(&col.name))
        {
            records.push(InferenceRecord {
                from_table: table.clone(),
                to_table: user_table.clone(),
                kind: RelationshipType::InferredAudit,
                inference_type: InferenceType::AuditPattern,
                confidence: config.audit_confidence,
                from_column: Some(column.name.clone()),
                to_column: Some(PRIMARY_KEY.to_string()),
                label: Some(column.name.clone()),
                junction_table: None,
                junction_columns: None,
            });
        }
    }
    records
}

pub struct InferenceAnalyzer<'a> {
    schema: &'a dyn SchemaProvider,
    scope: Scope,
    config: InferenceConfig,
    self_reference: SelfReferencePolicy,
}

impl<'a> InferenceAnalyzer<'a> {
    pub fn new(schema: &'a dyn SchemaProvider, scope: Scope) -> Self {
        Self {
            schema,
            scope,
            config: InferenceConfig::default(),
            self_reference: SelfReferencePolicy::Drop,
        }
    }

    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.config = config.inference.clone();
        self.self_reference = config.self_reference.inference;
        self
    }

    pub fn with_self_reference(mut self, policy: SelfReferencePolicy) -> Self {
        self.self_reference = policy;
        self
    }

    fn read_columns(&self, scope: &ResolvedScope) -> TableColumns {
        let mut tables = TableColumns::new();
        for table in scope.tables() {
            match self.schema.list_columns(table) {
                Ok(columns) => {
                    tables.insert(table.to_string(), columns);
                }
                Err(err) => warn!(
                    analyzer = self.name(),
                    table,
                    error = %err,
                    "skipping table with unreadable columns"
                ),
            }
        }
        tables
    }
}

impl Analyzer for InferenceAnalyzer<'_> {
    type Raw = Vec<InferenceRecord>;

    fn name(&self) -> &'static str {
        "inference"
    }

    fn analyzer_type(&self) -> &'static str {
        sources::INFERRED_ANALYSIS
    }

    fn analyze(&self) -> Result<Self::Raw> {
        let scope = self.scope.resolve(self.schema)?;
        let tables = self.read_columns(&scope);
        let resolver = TableResolver::new(self.schema, &scope);

        let mut records = naming_convention_pass(&tables, &resolver, &self.config);
        records.extend(junction_table_pass(&tables, &resolver, &self.config));
        records.extend(audit_pattern_pass(&tables, &resolver, &self.config));
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
                    .with_metadata(keys::SOURCE, sources::INFERRED_ANALYSIS),
            )?;
        }

        for record in raw {
            let mut relationship =
                Relationship::new(&record.from_table, &record.to_table, record.kind)
                    .with_metadata(keys::CONFIDENCE, record.confidence)
                    .with_metadata(keys::INFERENCE_TYPE, record.inference_type.as_str());
            if let Some(label) = record.label {
                relationship = relationship.with_label(label);
            }
            if let Some(column) = record.from_column {
                relationship = relationship.with_metadata(keys::FROM_COLUMN, column);
            }
            if let Some(column) = record.to_column {
                relationship = relationship.with_metadata(keys::TO_COLUMN, column);
            }
            if let Some(junction) = record.junction_table {
                relationship = relationship.with_metadata(keys::JUNCTION_TABLE, junction);
            }
            if let Some((left, right)) = record.junction_columns {
                relationship = relationship
                    .with_metadata(keys::JUNCTION_FROM_COLUMN, left)
                    .with_metadata(keys::JUNCTION_TO_COLUMN, right);
            }
            match self.self_reference.apply(relationship) {
                Some(relationship) => dataset.add_relationship(relationship)?,
                None => debug!(table = %record.from_table, "dropping self-referential inference"),
            }
        }

        Ok(dataset)
    }
}
