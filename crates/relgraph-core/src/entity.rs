use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{DEFAULT_ENTITY_TYPE, keys};
use crate::value::{MetaValue, Metadata};

fn default_nullable() -> bool {
    true
}

fn default_entity_type() -> String {
    DEFAULT_ENTITY_TYPE.to_string()
}

pub(crate) fn ensure_present(value: &str, kind: &'static str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::BlankField { kind, field });
    }
    Ok(())
}

/// Named property of an entity, usually a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<MetaValue>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Attribute {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default: Option<MetaValue>) -> Self {
        self.default = default;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.metadata.flag(keys::PRIMARY_KEY)
    }

    /// Flagged explicitly, or named by the `_id` convention.
    pub fn is_foreign_key(&self) -> bool {
        self.metadata.flag(keys::FOREIGN_KEY) || self.name.ends_with("_id")
    }

    pub fn validate(&self) -> Result<()> {
        ensure_present(&self.name, "attribute", "name")
    }
}

/// Graph node: a table or a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default = "default_entity_type")]
    pub entity_type: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Entity {
    /// Create an entity of the default type.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: default_entity_type(),
            attributes: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = entity_type.into();
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn primary_key_attributes(&self) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|attr| attr.is_primary_key())
            .collect()
    }

    pub fn foreign_key_attributes(&self) -> Vec<&Attribute> {
        self.attributes
            .iter()
            .filter(|attr| attr.is_foreign_key())
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        ensure_present(&self.id, "entity", "id")?;
        ensure_present(&self.name, "entity", "name")?;
        ensure_present(&self.entity_type, "entity", "type")?;
        for attribute in &self.attributes {
            attribute.validate()?;
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Parse and validate an entity from its plain form.
    pub fn from_plain(value: serde_json::Value) -> Result<Self> {
        let entity: Entity = serde_json::from_value(value)?;
        entity.validate()?;
        Ok(entity)
    }

    pub fn to_plain(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
