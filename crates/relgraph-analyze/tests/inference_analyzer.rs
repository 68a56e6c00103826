use std::path::PathBuf;

use relgraph_analyze::{AnalysisConfig, Analyzer, InferenceAnalyzer, Scope};
use relgraph_core::{RelationshipType, keys};
use relgraph_introspect::{
    ColumnInfo, ForeignKeyInfo, ProviderError, SchemaProvider, SnapshotProvider,
};

fn load_fixture() -> SnapshotProvider {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop.snapshot.toml");
    SnapshotProvider::load(&path)
        .unwrap_or_else(|err| panic!("load fixture {}: {err}", path.display()))
}

/// Delegates to a snapshot but fails column lookups for one table.
struct FlakyColumns {
    inner: SnapshotProvider,
    failing: &'static str,
}

impl SchemaProvider for FlakyColumns {
    fn list_tables(&self) -> relgraph_introspect::Result<Vec<String>> {
        self.inner.list_tables()
    }

    fn table_exists(&self, name: &str) -> bool {
        self.inner.table_exists(name)
    }

    fn list_columns(&self, table: &str) -> relgraph_introspect::Result<Vec<ColumnInfo>> {
        if table == self.failing {
            return Err(ProviderError::Db(format!("relation {table} is locked")));
        }
        self.inner.list_columns(table)
    }

    fn list_foreign_keys(&self, table: &str) -> relgraph_introspect::Result<Vec<ForeignKeyInfo>> {
        self.inner.list_foreign_keys(table)
    }
}

#[test]
fn junction_table_bridges_its_referenced_tables() {
    let provider = load_fixture();
    let dataset = InferenceAnalyzer::new(
        &provider,
        Scope::tables(["orders", "products", "order_items"]),
    )
    .run();

    let junctions: Vec<_> = dataset
        .relationships()
        .iter()
        .filter(|edge| edge.metadata.get_str(keys::INFERENCE_TYPE) == Some("junction_table"))
        .collect();
    assert_eq!(junctions.len(), 1);
    let edge = junctions[0];
    assert_eq!((edge.source_id.as_str(), edge.target_id.as_str()), ("orders", "products"));
    assert_eq!(edge.kind, RelationshipType::InferredManyToMany);
    assert_eq!(edge.confidence(), Some(0.9));
    assert_eq!(edge.label.as_deref(), Some("many-to-many via order_items"));
    assert_eq!(edge.metadata.get_str(keys::JUNCTION_TABLE), Some("order_items"));
    assert_eq!(edge.metadata.get_str(keys::JUNCTION_FROM_COLUMN), Some("order_id"));
    assert_eq!(edge.metadata.get_str(keys::JUNCTION_TO_COLUMN), Some("product_id"));
    assert_eq!(edge.metadata.get_str(keys::FROM_COLUMN), None);
    assert_eq!(edge.metadata.get_str(keys::TO_COLUMN), None);
    assert!(dataset.valid());
}

#[test]
fn passes_are_concatenated_without_dedup() {
    let provider = load_fixture();
    let dataset = InferenceAnalyzer::new(&provider, Scope::Global).run();

    let order_to_user: Vec<_> = dataset
        .relationships()
        .iter()
        .filter(|edge| edge.source_id == "order_items" && edge.target_id == "orders")
        .collect();
    assert_eq!(order_to_user.len(), 1);
    assert_eq!(order_to_user[0].confidence(), Some(0.8));

    let audit = dataset
        .relationships()
        .iter()
        .find(|edge| edge.kind == RelationshipType::InferredAudit)
        .expect("audit edge");
    assert_eq!(audit.source_id, "documents");
    assert_eq!(audit.target_id, "users");
    assert_eq!(audit.confidence(), Some(0.6));

    assert!(
        dataset
            .entities()
            .all(|entity| entity.metadata.get_str(keys::SOURCE) == Some("inferred_analysis"))
    );
    assert!(!dataset.relationships().iter().any(|edge| edge.is_self_referential()));
    assert!(dataset.valid());
}

#[test]
fn configured_confidences_are_applied() {
    let config = AnalysisConfig::from_toml_str(
        r#"
[inference]
naming_confidence = 0.5
user_table_candidates = ["people"]
"#,
    )
    .expect("parse config");
    let provider = load_fixture();
    let dataset = InferenceAnalyzer::new(&provider, Scope::Global)
        .with_config(&config)
        .run();

    assert!(
        dataset
            .relationships()
            .iter()
            .filter(|edge| edge.kind == RelationshipType::InferredBelongsTo)
            .all(|edge| edge.confidence() == Some(0.5))
    );
    assert!(
        dataset
            .relationships()
            .iter()
            .all(|edge| edge.kind != RelationshipType::InferredAudit)
    );
}

#[test]
fn unreadable_columns_skip_only_that_table() {
    let provider = FlakyColumns {
        inner: load_fixture(),
        failing: "order_items",
    };
    let dataset = InferenceAnalyzer::new(&provider, Scope::Global).run();

    assert!(!dataset.metadata().flag("failed"));
    assert!(
        dataset
            .relationships()
            .iter()
            .all(|edge| edge.source_id != "order_items"
                && edge.metadata.get_str(keys::JUNCTION_TABLE).is_none())
    );
    let from_orders: Vec<&str> = dataset
        .relationships()
        .iter()
        .filter(|edge| edge.source_id == "orders")
        .map(|edge| edge.target_id.as_str())
        .collect();
    assert_eq!(from_orders, vec!["users"]);
    assert!(
        dataset
            .relationships()
            .iter()
            .any(|edge| edge.source_id == "documents" && edge.kind == RelationshipType::InferredAudit)
    );
    assert!(dataset.valid());
}
