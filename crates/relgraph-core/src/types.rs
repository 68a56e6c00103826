use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Entity type used when none is given.
pub const DEFAULT_ENTITY_TYPE: &str = "default";

/// Provenance tags stored under the `source` metadata key.
pub mod sources {
    pub const DATABASE_SCHEMA: &str = "database_schema";
    pub const ORM_MODEL: &str = "orm_model";
    pub const INFERRED_ANALYSIS: &str = "inferred_analysis";
}

/// Conventional metadata keys.
pub mod keys {
    pub const PRIMARY_KEY: &str = "primary_key";
    pub const FOREIGN_KEY: &str = "foreign_key";
    pub const TABLE_NAME: &str = "table_name";
    pub const SOURCE: &str = "source";
    pub const CONFIDENCE: &str = "confidence";
    pub const INFERENCE_TYPE: &str = "inference_type";
    pub const SELF_REFERENTIAL: &str = "self_referential";
    pub const CONSTRAINT_NAME: &str = "constraint_name";
    pub const FROM_COLUMN: &str = "from_column";
    pub const TO_COLUMN: &str = "to_column";
    pub const JUNCTION_TABLE: &str = "junction_table";
    pub const JUNCTION_FROM_COLUMN: &str = "junction_from_column";
    pub const JUNCTION_TO_COLUMN: &str = "junction_to_column";
    pub const FOREIGN_KEY_COLUMN: &str = "foreign_key_column";
}

/// Multiplicity of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one_to_one",
            Cardinality::OneToMany => "one_to_many",
            Cardinality::ManyToOne => "many_to_one",
            Cardinality::ManyToMany => "many_to_many",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "one_to_one" => Ok(Cardinality::OneToOne),
            "one_to_many" => Ok(Cardinality::OneToMany),
            "many_to_one" => Ok(Cardinality::ManyToOne),
            "many_to_many" => Ok(Cardinality::ManyToMany),
            other => Err(Error::InvalidCardinality(other.to_string())),
        }
    }
}

/// Edge type. Known values get their own variant; anything else is kept
/// verbatim so analyzers outside this workspace can introduce their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationshipType {
    ForeignKey,
    BelongsTo,
    HasOne,
    HasMany,
    HasManyThrough,
    HasAndBelongsToMany,
    Attachment,
    InferredBelongsTo,
    InferredManyToMany,
    InferredAudit,
    NodeOnly,
    Other(String),
}

impl RelationshipType {
    pub fn as_str(&self) -> &str {
        match self {
            RelationshipType::ForeignKey => "foreign_key",
            RelationshipType::BelongsTo => "belongs_to",
            RelationshipType::HasOne => "has_one",
            RelationshipType::HasMany => "has_many",
            RelationshipType::HasManyThrough => "has_many_through",
            RelationshipType::HasAndBelongsToMany => "has_and_belongs_to_many",
            RelationshipType::Attachment => "attachment",
            RelationshipType::InferredBelongsTo => "inferred_belongs_to",
            RelationshipType::InferredManyToMany => "inferred_many_to_many",
            RelationshipType::InferredAudit => "inferred_audit",
            RelationshipType::NodeOnly => "node_only",
            RelationshipType::Other(value) => value.as_str(),
        }
    }

    /// Cardinality implied by an association-style type, if any.
    pub fn implied_cardinality(&self) -> Option<Cardinality> {
        match self {
            RelationshipType::HasMany => Some(Cardinality::OneToMany),
            RelationshipType::BelongsTo => Some(Cardinality::ManyToOne),
            RelationshipType::HasOne => Some(Cardinality::OneToOne),
            RelationshipType::HasAndBelongsToMany | RelationshipType::HasManyThrough => {
                Some(Cardinality::ManyToMany)
            }
            _ => None,
        }
    }
}

impl From<String> for RelationshipType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "foreign_key" => RelationshipType::ForeignKey,
            "belongs_to" => RelationshipType::BelongsTo,
            "has_one" => RelationshipType::HasOne,
            "has_many" => RelationshipType::HasMany,
            "has_many_through" => RelationshipType::HasManyThrough,
            "has_and_belongs_to_many" => RelationshipType::HasAndBelongsToMany,
            "attachment" => RelationshipType::Attachment,
            "inferred_belongs_to" => RelationshipType::InferredBelongsTo,
            "inferred_many_to_many" => RelationshipType::InferredManyToMany,
            "inferred_audit" => RelationshipType::InferredAudit,
            "node_only" => RelationshipType::NodeOnly,
            _ => RelationshipType::Other(value),
        }
    }
}

impl From<&str> for RelationshipType {
    fn from(value: &str) -> Self {
        RelationshipType::from(value.to_string())
    }
}

impl From<RelationshipType> for String {
    fn from(value: RelationshipType) -> Self {
        match value {
            RelationshipType::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl JsonSchema for RelationshipType {
    fn schema_name() -> String {
        "RelationshipType".to_string()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(generator)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
