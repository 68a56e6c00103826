use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entity::ensure_present;
use crate::error::{Error, Result};
use crate::types::{Cardinality, RelationshipType, keys};
use crate::value::{MetaValue, Metadata};

/// Directed, typed edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub cardinality: Option<Cardinality>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Relationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: impl Into<RelationshipType>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind: kind.into(),
            label: None,
            cardinality: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_cardinality(mut self, cardinality: Option<Cardinality>) -> Self {
        self.cardinality = cardinality;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    /// Explicit cardinality, else the one implied by the type.
    pub fn effective_cardinality(&self) -> Option<Cardinality> {
        self.cardinality.or_else(|| self.kind.implied_cardinality())
    }

    pub fn is_self_referential(&self) -> bool {
        self.source_id == self.target_id
    }

    pub fn is_flagged_self_referential(&self) -> bool {
        self.metadata.flag(keys::SELF_REFERENTIAL)
    }

    pub fn confidence(&self) -> Option<f64> {
        self.metadata.get_f64(keys::CONFIDENCE)
    }

    pub fn touches(&self, id: &str) -> bool {
        self.source_id == id || self.target_id == id
    }

    /// Self-loops are only allowed when flagged `self_referential`.
    pub fn validate(&self) -> Result<()> {
        ensure_present(&self.source_id, "relationship", "source_id")?;
        ensure_present(&self.target_id, "relationship", "target_id")?;
        ensure_present(self.kind.as_str(), "relationship", "type")?;
        if self.is_self_referential() && !self.is_flagged_self_referential() {
            return Err(Error::SelfReference {
                id: self.source_id.clone(),
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn from_plain(value: serde_json::Value) -> Result<Self> {
        let relationship: Relationship = serde_json::from_value(value)?;
        relationship.validate()?;
        Ok(relationship)
    }

    pub fn to_plain(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unflagged_self_loop_is_invalid() {
        let rel = Relationship::new("categories", "categories", RelationshipType::BelongsTo);
        assert!(matches!(rel.validate(), Err(Error::SelfReference { .. })));

        let flagged = rel.with_metadata(keys::SELF_REFERENTIAL, true);
        assert!(flagged.validate().is_ok());
    }

    #[test]
    fn false_flag_does_not_exempt_self_loop() {
        let rel = Relationship::new("nodes", "nodes", "foreign_key")
            .with_metadata(keys::SELF_REFERENTIAL, false);
        assert!(!rel.is_valid());
    }

    #[test]
    fn blank_endpoints_are_invalid() {
        assert!(matches!(
            Relationship::new("", "users", "foreign_key").validate(),
            Err(Error::BlankField {
                field: "source_id",
                ..
            })
        ));
        assert!(matches!(
            Relationship::new("orders", "users", "  ").validate(),
            Err(Error::BlankField { field: "type", .. })
        ));
    }

    #[test]
    fn explicit_cardinality_wins_over_type_mapping() {
        let rel = Relationship::new("users", "posts", RelationshipType::HasMany);
        assert_eq!(rel.effective_cardinality(), Some(Cardinality::OneToMany));
        let rel = rel.with_cardinality(Some(Cardinality::OneToOne));
        assert_eq!(rel.effective_cardinality(), Some(Cardinality::OneToOne));
    }

    #[test]
    fn invalid_cardinality_in_plain_form_is_rejected() {
        let result = Relationship::from_plain(serde_json::json!({
            "source_id": "orders",
            "target_id": "users",
            "type": "foreign_key",
            "cardinality": "some_to_few"
        }));
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn plain_form_round_trips() {
        let rel = Relationship::new("orders", "users", RelationshipType::ForeignKey)
            .with_label("fk_orders_user")
            .with_cardinality(Some(Cardinality::ManyToOne))
            .with_metadata(keys::FROM_COLUMN, "user_id")
            .with_metadata(keys::CONFIDENCE, 0.8);
        let plain = rel.to_plain().expect("to plain");
        assert_eq!(plain["type"], serde_json::json!("foreign_key"));
        assert_eq!(plain["cardinality"], serde_json::json!("many_to_one"));
        assert_eq!(Relationship::from_plain(plain).expect("from plain"), rel);
    }
}
