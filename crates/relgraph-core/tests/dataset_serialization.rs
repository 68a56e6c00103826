use relgraph_core::{Dataset, Entity, keys, sources};

#[test]
fn serializes_dataset_deterministically() {
    let mut dataset = Dataset::new().with_metadata("analyzer", "constraints");
    dataset
        .add_entity(
            Entity::new("users", "users")
                .with_type("table")
                .with_metadata(keys::SOURCE, sources::DATABASE_SCHEMA),
        )
        .expect("add users");

    let json = serde_json::to_string_pretty(&dataset).expect("serialize dataset");
    let expected = r#"{
  "entities": {
    "users": {
      "id": "users",
      "name": "users",
      "type": "table",
      "attributes": [],
      "metadata": {
        "source": "database_schema"
      }
    }
  },
  "relationships": [],
  "metadata": {
    "analyzer": "constraints"
  },
  "stats": {
    "entity_count": 1,
    "relationship_count": 0,
    "entity_types": {
      "table": 1
    },
    "relationship_types": {},
    "isolated_entities": 1,
    "connected_entities": 0
  }
}"#;
    assert_eq!(json, expected);
}

#[test]
fn stats_in_input_are_ignored() {
    let dataset: Dataset = serde_json::from_value(serde_json::json!({
        "entities": {"users": {"id": "users", "name": "users", "type": "table"}},
        "relationships": [],
        "stats": {"entity_count": 99}
    }))
    .expect("deserialize dataset");
    assert_eq!(dataset.stats().entity_count, 1);
}
