use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, Result};
use crate::provider::{
    AssociationInfo, AssociationProvider, ColumnInfo, ForeignKeyInfo, ModelType, SchemaProvider,
};

/// Read-only capture of schema and model facts.
///
/// Produced by an [`Adapter`](crate::Adapter) or exported by a host
/// application, then served through [`SnapshotProvider`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
    #[serde(default)]
    pub models: Vec<ModelSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyInfo>,
}

impl TableSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnInfo>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_foreign_keys(mut self, foreign_keys: Vec<ForeignKeyInfo>) -> Self {
        self.foreign_keys = foreign_keys;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub name: String,
    pub table: String,
    #[serde(default)]
    pub is_abstract: bool,
    /// Falls back to the backing table's columns when absent.
    #[serde(default)]
    pub columns: Option<Vec<ColumnInfo>>,
    #[serde(default)]
    pub associations: Vec<AssociationInfo>,
}

impl ModelSnapshot {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            is_abstract: false,
            columns: None,
            associations: Vec::new(),
        }
    }

    pub fn with_associations(mut self, associations: Vec<AssociationInfo>) -> Self {
        self.associations = associations;
        self
    }

    pub fn abstract_model(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}

impl SchemaSnapshot {
    pub fn new(tables: Vec<TableSnapshot>, models: Vec<ModelSnapshot>) -> Self {
        Self { tables, models }
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Load a snapshot, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ProviderError::Other(format!(
                "unsupported snapshot format: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

/// In-memory provider serving a [`SchemaSnapshot`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotProvider {
    tables: BTreeMap<String, TableSnapshot>,
    models: BTreeMap<String, ModelSnapshot>,
}

impl SnapshotProvider {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        let tables = snapshot
            .tables
            .into_iter()
            .map(|table| (table.name.clone(), table))
            .collect();
        let models = snapshot
            .models
            .into_iter()
            .map(|model| (model.name.clone(), model))
            .collect();
        Self { tables, models }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(SchemaSnapshot::load(path)?))
    }

    fn table(&self, name: &str) -> Result<&TableSnapshot> {
        self.tables
            .get(name)
            .ok_or_else(|| ProviderError::UnknownTable(name.to_string()))
    }

    fn model(&self, name: &str) -> Result<&ModelSnapshot> {
        self.models
            .get(name)
            .ok_or_else(|| ProviderError::UnknownModel(name.to_string()))
    }
}

impl SchemaProvider for SnapshotProvider {
    fn list_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        Ok(self.table(table)?.columns.clone())
    }

    fn list_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>> {
        Ok(self.table(table)?.foreign_keys.clone())
    }
}

impl AssociationProvider for SnapshotProvider {
    fn list_model_types(&self) -> Result<Vec<ModelType>> {
        Ok(self
            .models
            .values()
            .map(|model| ModelType {
                name: model.name.clone(),
                is_abstract: model.is_abstract,
            })
            .collect())
    }

    fn table_of(&self, model: &str) -> Result<String> {
        Ok(self.model(model)?.table.clone())
    }

    fn columns_of(&self, model: &str) -> Result<Vec<ColumnInfo>> {
        let model = self.model(model)?;
        match &model.columns {
            Some(columns) => Ok(columns.clone()),
            None => Ok(self
                .tables
                .get(&model.table)
                .map(|table| table.columns.clone())
                .unwrap_or_default()),
        }
    }

    fn associations_of(&self, model: &str) -> Result<Vec<AssociationInfo>> {
        Ok(self.model(model)?.associations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{AssociationKind, FkAction};

    const SNAPSHOT_TOML: &str = r#"
[[tables]]
name = "users"
columns = [{ name = "id", type = "integer", nullable = false, is_primary_key = true }]

[[tables]]
name = "orders"
columns = [
  { name = "id", type = "integer", nullable = false, is_primary_key = true },
  { name = "user_id", type = "integer" },
]
foreign_keys = [
  { column = "user_id", to_table = "users", constraint_name = "fk_orders_user", on_delete = "cascade" },
]

[[models]]
name = "Order"
table = "orders"
associations = [{ kind = "belongs_to", name = "user", target_type = "User" }]

[[models]]
name = "User"
table = "users"
"#;

    #[test]
    fn loads_toml_snapshot() {
        let snapshot = SchemaSnapshot::from_toml_str(SNAPSHOT_TOML).expect("parse toml");
        let provider = SnapshotProvider::new(snapshot);

        assert_eq!(
            provider.list_tables().expect("tables"),
            vec!["orders".to_string(), "users".to_string()]
        );
        assert!(provider.table_exists("users"));
        assert!(!provider.table_exists("payments"));

        let fks = provider.list_foreign_keys("orders").expect("fks");
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].on_delete, FkAction::Cascade);
        assert_eq!(fks[0].constraint_name.as_deref(), Some("fk_orders_user"));

        let assocs = provider.associations_of("Order").expect("associations");
        assert_eq!(assocs[0].kind, AssociationKind::BelongsTo);
        assert_eq!(provider.table_of("User").expect("table"), "users");
    }

    #[test]
    fn model_columns_fall_back_to_table() {
        let snapshot = SchemaSnapshot::from_toml_str(SNAPSHOT_TOML).expect("parse toml");
        let provider = SnapshotProvider::new(snapshot);
        let columns = provider.columns_of("Order").expect("columns");
        let names: Vec<&str> = columns.iter().map(|col| col.name.as_str()).collect();
        assert_eq!(names, vec!["id", "user_id"]);
    }

    #[test]
    fn unknown_items_are_errors() {
        let provider = SnapshotProvider::default();
        assert!(matches!(
            provider.list_columns("ghosts"),
            Err(ProviderError::UnknownTable(_))
        ));
        assert!(matches!(
            provider.table_of("Ghost"),
            Err(ProviderError::UnknownModel(_))
        ));
    }

    #[test]
    fn json_snapshot_round_trips() {
        let snapshot = SchemaSnapshot::from_toml_str(SNAPSHOT_TOML).expect("parse toml");
        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert_eq!(SchemaSnapshot::from_json_str(&json).expect("parse json"), snapshot);
    }
}
