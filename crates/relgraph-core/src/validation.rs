use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Structured validation issue with the location that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validate internal consistency of a dataset.
///
/// This checks:
/// - every entity is individually valid and stored under its own id
/// - every relationship is individually valid
/// - both endpoints of every relationship name an entity in the dataset
pub fn validate_dataset(dataset: &Dataset) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for (key, entity) in dataset.entity_map() {
        let path = format!("entities.{key}");
        if let Err(err) = entity.validate() {
            issues.push(ValidationIssue::new("invalid_entity", &path, err.to_string()));
        }
        if key != &entity.id {
            issues.push(ValidationIssue::new(
                "entity_key_mismatch",
                &path,
                format!("entity stored under '{key}' has id '{}'", entity.id),
            ));
        }
    }

    for (idx, relationship) in dataset.relationships().iter().enumerate() {
        let path = format!("relationships[{idx}]");
        if let Err(err) = relationship.validate() {
            issues.push(ValidationIssue::new(
                "invalid_relationship",
                &path,
                err.to_string(),
            ));
        }
        if dataset.entity(&relationship.source_id).is_none() {
            issues.push(ValidationIssue::new(
                "dangling_source",
                &path,
                format!("source entity not found: {}", relationship.source_id),
            ));
        }
        if dataset.entity(&relationship.target_id).is_none() {
            issues.push(ValidationIssue::new(
                "dangling_target",
                &path,
                format!("target entity not found: {}", relationship.target_id),
            ));
        }
    }

    issues
}
