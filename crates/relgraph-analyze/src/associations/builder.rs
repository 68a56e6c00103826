use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use relgraph_core::{Attribute, Dataset, Entity, Relationship, RelationshipType, keys, sources};
use relgraph_introspect::ColumnInfo;

use super::extraction::{AssociationData, AssociationRecord};
use crate::config::SelfReferencePolicy;
use crate::error::Result;

fn attribute_from_column(
    column: &ColumnInfo,
    foreign_keys: Option<&BTreeSet<String>>,
) -> Attribute {
    let is_foreign_key = foreign_keys.is_some_and(|columns| columns.contains(&column.name));
    Attribute::new(&column.name, &column.data_type)
        .with_nullable(column.nullable)
        .with_default(column.default.clone())
        .with_metadata(keys::PRIMARY_KEY, column.is_primary_key)
        .with_metadata(keys::FOREIGN_KEY, is_foreign_key)
}

fn model_entity(table: &str, model: &str, data: &AssociationData) -> Entity {
    let foreign_keys = data.foreign_key_columns.get(table);
    let attributes = data
        .columns
        .get(table)
        .map(|columns| {
            columns
                .iter()
                .map(|column| attribute_from_column(column, foreign_keys))
                .collect()
        })
        .unwrap_or_default();

    Entity::new(table, model)
        .with_type("model")
        .with_attributes(attributes)
        .with_metadata(keys::TABLE_NAME, table)
        .with_metadata(keys::SOURCE, sources::ORM_MODEL)
        .with_metadata("model_name", model)
}

fn relationship_from_record(record: &AssociationRecord) -> Relationship {
    let mut relationship = Relationship::new(
        &record.source_table,
        &record.target_table,
        record.kind.clone(),
    )
    .with_cardinality(record.kind.implied_cardinality())
    .with_metadata("source_type", record.source_type.as_str())
    .with_metadata("target_type", record.target_type.as_str());

    if let Some(name) = &record.association_name {
        relationship = relationship
            .with_label(name.clone())
            .with_metadata("association_name", name.as_str());
    }
    if let Some(through) = &record.through_table {
        relationship = relationship.with_metadata("through_table", through.as_str());
    }
    if let Some(join) = &record.join_table {
        relationship = relationship.with_metadata("join_table", join.as_str());
    }
    if let Some(column) = &record.foreign_key {
        relationship = relationship.with_metadata(foreign_key_side(&record.kind), column.as_str());
    }
    relationship
}

/// Metadata key naming the table that holds an association's key column.
fn foreign_key_side(kind: &RelationshipType) -> &'static str {
    match kind {
        RelationshipType::BelongsTo => keys::FROM_COLUMN,
        RelationshipType::HasOne | RelationshipType::HasMany => keys::TO_COLUMN,
        _ => keys::FOREIGN_KEY_COLUMN,
    }
}

/// Map association records onto entities and relationships.
///
/// Each table becomes one entity, named after the first model type that
/// owns records for it, else the first type targeting it. Placeholder
/// records contribute only their entity.
pub fn build_dataset(data: &AssociationData, policy: SelfReferencePolicy) -> Result<Dataset> {
    let mut entities: BTreeMap<&str, Entity> = BTreeMap::new();
    for record in &data.records {
        entities
            .entry(record.source_table.as_str())
            .or_insert_with(|| model_entity(&record.source_table, &record.source_type, data));
    }
    for record in data.records.iter().filter(|record| !record.is_node_only()) {
        entities
            .entry(record.target_table.as_str())
            .or_insert_with(|| model_entity(&record.target_table, &record.target_type, data));
    }

    let mut dataset = Dataset::new();
    for entity in entities.into_values() {
        dataset.add_entity(entity)?;
    }

    for record in data.records.iter().filter(|record| !record.is_node_only()) {
        match policy.apply(relationship_from_record(record)) {
            Some(relationship) => dataset.add_relationship(relationship)?,
            None => debug!(table = %record.source_table, "dropping self-referential association"),
        }
    }

    Ok(dataset)
}
