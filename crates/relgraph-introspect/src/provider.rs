use serde::{Deserialize, Serialize};

use relgraph_core::{MetaValue, RelationshipType};

use crate::error::Result;

fn default_nullable() -> bool {
    true
}

/// Column descriptor shared by schema and association providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<MetaValue>,
    #[serde(default)]
    pub is_primary_key: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
            is_primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Foreign key action semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    Unknown,
}

impl FkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FkAction::NoAction => "no_action",
            FkAction::Restrict => "restrict",
            FkAction::Cascade => "cascade",
            FkAction::SetNull => "set_null",
            FkAction::SetDefault => "set_default",
            FkAction::Unknown => "unknown",
        }
    }
}

/// One referencing column of a declared foreign key.
///
/// Composite keys are reported as one descriptor per column pair sharing
/// the constraint name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    pub column: String,
    pub to_table: String,
    /// `None` means the referenced table's primary key.
    #[serde(default)]
    pub to_column: Option<String>,
    #[serde(default)]
    pub constraint_name: Option<String>,
    #[serde(default)]
    pub on_delete: FkAction,
    #[serde(default)]
    pub on_update: FkAction,
}

impl ForeignKeyInfo {
    pub fn new(column: impl Into<String>, to_table: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            to_table: to_table.into(),
            to_column: None,
            constraint_name: None,
            on_delete: FkAction::NoAction,
            on_update: FkAction::NoAction,
        }
    }

    pub fn to_column(mut self, column: impl Into<String>) -> Self {
        self.to_column = Some(column.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.constraint_name = Some(name.into());
        self
    }

    pub fn on_delete(mut self, action: FkAction) -> Self {
        self.on_delete = action;
        self
    }
}

/// A model/record type known to the association provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelType {
    pub name: String,
    #[serde(default)]
    pub is_abstract: bool,
}

impl ModelType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_abstract: false,
        }
    }
}

/// Kind of a declared object-relational association.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    HasManyThrough,
    HasAndBelongsToMany,
    Attachment,
}

impl AssociationKind {
    pub fn relationship_type(&self) -> RelationshipType {
        match self {
            AssociationKind::BelongsTo => RelationshipType::BelongsTo,
            AssociationKind::HasOne => RelationshipType::HasOne,
            AssociationKind::HasMany => RelationshipType::HasMany,
            AssociationKind::HasManyThrough => RelationshipType::HasManyThrough,
            AssociationKind::HasAndBelongsToMany => RelationshipType::HasAndBelongsToMany,
            AssociationKind::Attachment => RelationshipType::Attachment,
        }
    }
}

/// A declared association of a model type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationInfo {
    pub kind: AssociationKind,
    pub name: String,
    pub target_type: String,
    #[serde(default)]
    pub through_type: Option<String>,
    #[serde(default)]
    pub join_table: Option<String>,
    #[serde(default)]
    pub foreign_key: Option<String>,
}

impl AssociationInfo {
    pub fn new(
        kind: AssociationKind,
        name: impl Into<String>,
        target_type: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            target_type: target_type.into(),
            through_type: None,
            join_table: None,
            foreign_key: None,
        }
    }

    pub fn through(mut self, through_type: impl Into<String>) -> Self {
        self.through_type = Some(through_type.into());
        self
    }

    pub fn join_table(mut self, table: impl Into<String>) -> Self {
        self.join_table = Some(table.into());
        self
    }

    pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    /// Edge type for this association. A `has_many` declared with a
    /// through type is a `has_many_through`.
    pub fn relationship_type(&self) -> RelationshipType {
        match (self.kind, &self.through_type) {
            (AssociationKind::HasMany, Some(_)) => RelationshipType::HasManyThrough,
            (kind, _) => kind.relationship_type(),
        }
    }

    /// Column holding the key for a `belongs_to`, by convention `<name>_id`.
    pub fn owning_column(&self) -> Option<String> {
        match self.kind {
            AssociationKind::BelongsTo => Some(
                self.foreign_key
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", self.name)),
            ),
            _ => None,
        }
    }
}

/// Read access to table, column and constraint facts.
pub trait SchemaProvider {
    fn list_tables(&self) -> Result<Vec<String>>;

    fn table_exists(&self, name: &str) -> bool;

    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    fn list_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>>;
}

/// Read access to declared model types and their associations.
pub trait AssociationProvider {
    /// Model types backed by a table.
    fn list_model_types(&self) -> Result<Vec<ModelType>>;

    fn table_of(&self, model: &str) -> Result<String>;

    fn columns_of(&self, model: &str) -> Result<Vec<ColumnInfo>>;

    fn associations_of(&self, model: &str) -> Result<Vec<AssociationInfo>>;
}
