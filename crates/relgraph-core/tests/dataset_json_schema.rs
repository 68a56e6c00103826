use jsonschema::JSONSchema;
use relgraph_core::{
    Attribute, Cardinality, Dataset, Entity, PlainDataset, Relationship, keys, sources,
};
use schemars::schema_for;

fn sample_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    dataset
        .add_entity(
            Entity::new("users", "User")
                .with_type("model")
                .with_attributes(vec![
                    Attribute::new("id", "integer")
                        .with_nullable(false)
                        .with_metadata(keys::PRIMARY_KEY, true),
                ])
                .with_metadata(keys::SOURCE, sources::ORM_MODEL),
        )
        .expect("add users");
    dataset
        .add_entity(Entity::new("orders", "Order").with_type("model"))
        .expect("add orders");
    dataset
        .add_relationship(
            Relationship::new("users", "orders", "has_many")
                .with_label("orders")
                .with_cardinality(Some(Cardinality::OneToMany))
                .with_metadata(keys::CONFIDENCE, 0.8),
        )
        .expect("add relationship");
    dataset.annotate_summary("associations", sources::ORM_MODEL);
    dataset
}

#[test]
fn serialized_dataset_matches_generated_schema() {
    let schema = serde_json::to_value(schema_for!(PlainDataset)).expect("serialize schema");
    let compiled = JSONSchema::compile(&schema).expect("compile schema");

    let instance = serde_json::to_value(sample_dataset()).expect("serialize dataset");
    if let Err(errors) = compiled.validate(&instance) {
        let messages: Vec<String> = errors.map(|err| err.to_string()).collect();
        panic!("dataset does not match schema: {messages:?}");
    }
}

#[test]
fn schema_rejects_missing_entities() {
    let schema = serde_json::to_value(schema_for!(PlainDataset)).expect("serialize schema");
    let compiled = JSONSchema::compile(&schema).expect("compile schema");

    let instance = serde_json::json!({ "relationships": [] });
    assert!(!compiled.is_valid(&instance));
}
