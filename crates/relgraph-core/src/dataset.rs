use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{Error, Result};
use crate::graph::{DatasetStats, build_adjacency, build_dataset_stats};
use crate::relationship::Relationship;
use crate::validation::{ValidationIssue, validate_dataset};
use crate::value::{MetaValue, Metadata};

/// Reason recorded on datasets returned after a failed analysis.
pub const FAILURE_REASON: &str = "no data found or analysis failed";
/// Reason recorded on datasets that came back empty without failing.
pub const EMPTY_REASON: &str = "no data found";

/// Graph container produced by one analyzer run.
///
/// Endpoints are not checked on insertion; [`Dataset::validate`] reports
/// relationships whose entities never arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlainDataset", into = "PlainDataset")]
pub struct Dataset {
    entities: BTreeMap<String, Entity>,
    relationships: Vec<Relationship>,
    metadata: Metadata,
}

/// Plain structure a dataset serializes through.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlainDataset {
    pub entities: BTreeMap<String, Entity>,
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Derived on output, ignored on input.
    #[serde(default, skip_deserializing)]
    pub stats: DatasetStats,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty dataset tagged as the outcome of a failed analysis.
    pub fn empty_for_failure(analyzer: &str, error: &str) -> Self {
        let mut dataset = Self::new();
        dataset.metadata.insert("analyzer", analyzer);
        dataset.metadata.insert("reason", FAILURE_REASON);
        dataset.metadata.insert("error", error);
        dataset.metadata.insert("failed", true);
        dataset
    }

    /// Record provenance and counts on the dataset metadata.
    pub fn annotate_summary(&mut self, analyzer: &str, analyzer_type: &str) {
        let entity_count = self.entity_count();
        let relationship_count = self.relationship_count();
        self.metadata.insert("analyzer", analyzer);
        self.metadata.insert("analyzer_type", analyzer_type);
        self.metadata.insert("entity_count", entity_count);
        self.metadata.insert("relationship_count", relationship_count);
        if self.is_empty() {
            self.metadata.insert("empty_reason", EMPTY_REASON);
        }
    }

    /// Insert an entity, replacing any entity with the same id.
    ///
    /// Returns the replaced entity. Attributes are not merged.
    pub fn add_entity(&mut self, entity: Entity) -> Result<Option<Entity>> {
        entity.validate()?;
        Ok(self.entities.insert(entity.id.clone(), entity))
    }

    /// Append a relationship. Duplicates are kept.
    pub fn add_relationship(&mut self, relationship: Relationship) -> Result<()> {
        relationship.validate()?;
        self.relationships.push(relationship);
        Ok(())
    }

    /// Remove an entity together with every relationship touching it.
    pub fn remove_entity(&mut self, id: &str) -> Option<Entity> {
        let removed = self.entities.remove(id)?;
        self.relationships.retain(|rel| !rel.touches(id));
        Some(removed)
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains_entity(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_map(&self) -> &BTreeMap<String, Entity> {
        &self.entities
    }

    pub fn entities_of_type<'a>(&'a self, entity_type: &'a str) -> impl Iterator<Item = &'a Entity> {
        self.entities
            .values()
            .filter(move |entity| entity.entity_type == entity_type)
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Relationships with `id` as either endpoint.
    pub fn relationships_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.relationships.iter().filter(move |rel| rel.touches(id))
    }

    /// Entities connected to `id` by any relationship.
    pub fn neighbors(&self, id: &str) -> BTreeSet<String> {
        build_adjacency(self)
            .get(id)
            .map(|ids| ids.iter().map(|id| id.to_string()).collect())
            .unwrap_or_default()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn validation_errors(&self) -> Vec<ValidationIssue> {
        validate_dataset(self)
    }

    pub fn valid(&self) -> bool {
        self.validation_errors().is_empty()
    }

    pub fn stats(&self) -> DatasetStats {
        build_dataset_stats(self)
    }

    pub fn to_plain(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Rebuild a dataset from its plain form.
    ///
    /// Entities and relationships are validated one by one; dangling
    /// relationships are accepted and left for [`Dataset::validate`].
    pub fn from_plain(value: serde_json::Value) -> Result<Self> {
        let plain: PlainDataset = serde_json::from_value(value)?;
        Dataset::try_from(plain)
    }

    /// Return an error carrying the first validation issue, if any.
    pub fn validate(&self) -> Result<()> {
        match self.validation_errors().into_iter().next() {
            Some(issue) => Err(Error::InvalidDataset(format!(
                "{}: {}",
                issue.path, issue.message
            ))),
            None => Ok(()),
        }
    }
}

impl From<Dataset> for PlainDataset {
    fn from(dataset: Dataset) -> Self {
        let stats = dataset.stats();
        PlainDataset {
            entities: dataset.entities,
            relationships: dataset.relationships,
            metadata: dataset.metadata,
            stats,
        }
    }
}

impl TryFrom<PlainDataset> for Dataset {
    type Error = Error;

    fn try_from(plain: PlainDataset) -> Result<Self> {
        let mut dataset = Dataset {
            metadata: plain.metadata,
            ..Dataset::default()
        };
        for (key, entity) in plain.entities {
            if key != entity.id {
                return Err(Error::InvalidPlain(format!(
                    "entity stored under '{key}' has id '{}'",
                    entity.id
                )));
            }
            dataset.add_entity(entity)?;
        }
        for relationship in plain.relationships {
            dataset.add_relationship(relationship)?;
        }
        Ok(dataset)
    }
}
