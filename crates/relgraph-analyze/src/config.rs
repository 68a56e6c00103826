use std::path::Path;

use serde::{Deserialize, Serialize};

use relgraph_core::{Relationship, keys};

use crate::error::{AnalyzeError, Result};

/// What an analyzer does with an edge whose source and target coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfReferencePolicy {
    /// Discard the edge.
    Drop,
    /// Keep the edge and mark it `self_referential`.
    Flag,
}

impl SelfReferencePolicy {
    /// Apply the policy; `None` means the relationship is dropped.
    pub fn apply(&self, relationship: Relationship) -> Option<Relationship> {
        if !relationship.is_self_referential() {
            return Some(relationship);
        }
        match self {
            SelfReferencePolicy::Drop => None,
            SelfReferencePolicy::Flag => {
                Some(relationship.with_metadata(keys::SELF_REFERENTIAL, true))
            }
        }
    }
}

/// Self-reference policy per analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfReferenceConfig {
    pub constraints: SelfReferencePolicy,
    pub associations: SelfReferencePolicy,
    pub inference: SelfReferencePolicy,
}

impl Default for SelfReferenceConfig {
    fn default() -> Self {
        Self {
            constraints: SelfReferencePolicy::Drop,
            associations: SelfReferencePolicy::Flag,
            inference: SelfReferencePolicy::Drop,
        }
    }
}

pub const DEFAULT_AUDIT_COLUMNS: &[&str] = &[
    "created_by_id",
    "updated_by_id",
    "deleted_by_id",
    "author_id",
    "modifier_id",
];

pub const DEFAULT_USER_TABLE_CANDIDATES: &[&str] =
    &["users", "user", "accounts", "account", "people", "person"];

/// Constants steering the heuristic passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub naming_confidence: f64,
    pub junction_confidence: f64,
    pub audit_confidence: f64,
    /// Non-key columns a junction table may carry beyond its `_id` columns.
    pub junction_extra_columns: usize,
    pub junction_separator: String,
    pub audit_columns: Vec<String>,
    /// Checked in order; the first in-scope table wins.
    pub user_table_candidates: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            naming_confidence: 0.8,
            junction_confidence: 0.9,
            audit_confidence: 0.6,
            junction_extra_columns: 3,
            junction_separator: "_".to_string(),
            audit_columns: DEFAULT_AUDIT_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            user_table_candidates: DEFAULT_USER_TABLE_CANDIDATES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

/// Analyzer settings, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub self_reference: SelfReferenceConfig,
    pub inference: InferenceConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let inference = &self.inference;
        for (name, value) in [
            ("naming_confidence", inference.naming_confidence),
            ("junction_confidence", inference.junction_confidence),
            ("audit_confidence", inference.audit_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalyzeError::Config(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        if inference.junction_separator.is_empty() {
            return Err(AnalyzeError::Config(
                "junction_separator cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
