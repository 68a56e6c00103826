use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Summary of dataset structure, emitted alongside the plain form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DatasetStats {
    pub entity_count: usize,
    pub relationship_count: usize,
    pub entity_types: BTreeMap<String, usize>,
    pub relationship_types: BTreeMap<String, usize>,
    pub isolated_entities: usize,
    pub connected_entities: usize,
}

/// Build a deterministic structural summary for a dataset.
pub fn build_dataset_stats(dataset: &Dataset) -> DatasetStats {
    let mut entity_types: BTreeMap<String, usize> = BTreeMap::new();
    for entity in dataset.entities() {
        *entity_types.entry(entity.entity_type.clone()).or_default() += 1;
    }

    let mut relationship_types: BTreeMap<String, usize> = BTreeMap::new();
    for relationship in dataset.relationships() {
        *relationship_types
            .entry(relationship.kind.as_str().to_string())
            .or_default() += 1;
    }

    let adjacency = build_adjacency(dataset);
    let isolated_entities = dataset
        .entities()
        .filter(|entity| {
            adjacency
                .get(entity.id.as_str())
                .is_none_or(|neighbors| neighbors.is_empty())
        })
        .count();
    let entity_count = dataset.entity_count();

    DatasetStats {
        entity_count,
        relationship_count: dataset.relationship_count(),
        entity_types,
        relationship_types,
        isolated_entities,
        connected_entities: entity_count - isolated_entities,
    }
}

/// Undirected adjacency over the relationships whose endpoints both exist.
///
/// A flagged self-reference counts as a connection of its entity.
pub fn build_adjacency(dataset: &Dataset) -> BTreeMap<&str, BTreeSet<&str>> {
    let mut graph: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for entity in dataset.entities() {
        graph.entry(entity.id.as_str()).or_default();
    }

    for relationship in dataset.relationships() {
        let source = relationship.source_id.as_str();
        let target = relationship.target_id.as_str();
        if dataset.entity(source).is_none() || dataset.entity(target).is_none() {
            continue;
        }
        graph.entry(source).or_default().insert(target);
        graph.entry(target).or_default().insert(source);
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use crate::relationship::Relationship;
    use crate::types::{RelationshipType, keys};

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new();
        for (id, kind) in [
            ("users", "table"),
            ("orders", "table"),
            ("audit_logs", "table"),
            ("categories", "model"),
        ] {
            dataset
                .add_entity(Entity::new(id, id).with_type(kind))
                .expect("add entity");
        }
        dataset
            .add_relationship(Relationship::new("orders", "users", RelationshipType::ForeignKey))
            .expect("add relationship");
        dataset
            .add_relationship(
                Relationship::new("categories", "categories", RelationshipType::BelongsTo)
                    .with_metadata(keys::SELF_REFERENTIAL, true),
            )
            .expect("add relationship");
        dataset
            .add_relationship(Relationship::new("audit_logs", "ghosts", "foreign_key"))
            .expect("add dangling relationship");
        dataset
    }

    #[test]
    fn stats_count_types_and_isolation() {
        let stats = build_dataset_stats(&dataset());
        assert_eq!(stats.entity_count, 4);
        assert_eq!(stats.relationship_count, 3);
        assert_eq!(stats.entity_types.get("table"), Some(&3));
        assert_eq!(stats.entity_types.get("model"), Some(&1));
        assert_eq!(stats.relationship_types.get("foreign_key"), Some(&2));
        assert_eq!(stats.relationship_types.get("belongs_to"), Some(&1));
        assert_eq!(stats.isolated_entities, 1);
        assert_eq!(stats.connected_entities, 3);
    }

    #[test]
    fn adjacency_ignores_dangling_edges() {
        let dataset = dataset();
        let graph = build_adjacency(&dataset);
        assert!(graph["audit_logs"].is_empty());
        assert!(!graph.contains_key("ghosts"));
        assert!(graph["users"].contains("orders"));
        assert!(graph["categories"].contains("categories"));
    }

    #[test]
    fn empty_dataset_has_zero_stats() {
        assert_eq!(build_dataset_stats(&Dataset::new()), DatasetStats::default());
    }
}
