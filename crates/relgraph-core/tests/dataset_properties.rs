use relgraph_core::{
    Attribute, Cardinality, Dataset, Entity, MetaValue, Relationship, RelationshipType, keys,
};

fn sample_datasets() -> Vec<Dataset> {
    let mut empty = Dataset::new();
    empty.annotate_summary("constraints", "database_schema");

    let mut chain = Dataset::new();
    for id in ["a", "b", "c", "d"] {
        chain
            .add_entity(Entity::new(id, id.to_uppercase()).with_type("table"))
            .expect("add entity");
    }
    for (source, target) in [("a", "b"), ("b", "c"), ("c", "d"), ("a", "b")] {
        chain
            .add_relationship(
                Relationship::new(source, target, RelationshipType::InferredBelongsTo)
                    .with_metadata(keys::CONFIDENCE, 0.8)
                    .with_metadata(keys::INFERENCE_TYPE, "naming_convention"),
            )
            .expect("add relationship");
    }

    let mut rich = Dataset::new().with_metadata("analyzer", "associations");
    rich.add_entity(
        Entity::new("posts", "Post")
            .with_type("model")
            .with_attributes(vec![
                Attribute::new("id", "bigint")
                    .with_nullable(false)
                    .with_metadata(keys::PRIMARY_KEY, true),
                Attribute::new("title", "varchar").with_default(Some(MetaValue::from("untitled"))),
                Attribute::new("published", "boolean").with_default(Some(MetaValue::Bool(false))),
            ]),
    )
    .expect("add posts");
    rich.add_relationship(
        Relationship::new("posts", "posts", RelationshipType::HasMany)
            .with_label("replies")
            .with_cardinality(Some(Cardinality::OneToMany))
            .with_metadata(keys::SELF_REFERENTIAL, true),
    )
    .expect("add self reference");
    rich.add_relationship(Relationship::new("posts", "authors", "written_by"))
        .expect("add dangling");

    vec![empty, chain, rich]
}

#[test]
fn round_trip_is_field_wise_equal() {
    for dataset in sample_datasets() {
        let plain = dataset.to_plain().expect("to plain");
        let back = Dataset::from_plain(plain).expect("from plain");
        assert_eq!(back, dataset);
    }
}

#[test]
fn removing_any_entity_leaves_no_touching_relationship() {
    for dataset in sample_datasets() {
        let ids: Vec<String> = dataset.entities().map(|entity| entity.id.clone()).collect();
        for id in ids {
            let mut copy = dataset.clone();
            copy.remove_entity(&id);
            assert!(copy.entity(&id).is_none());
            assert!(
                copy.relationships()
                    .iter()
                    .all(|rel| rel.source_id != id && rel.target_id != id),
                "relationships still reference {id}"
            );
        }
    }
}

#[test]
fn duplicate_ids_leave_one_entity() {
    let mut dataset = Dataset::new();
    dataset
        .add_entity(Entity::new("orders", "Order"))
        .expect("add first");
    dataset
        .add_entity(Entity::new("orders", "LegacyOrder"))
        .expect("add second");
    assert_eq!(dataset.entity_count(), 1);
    assert_eq!(
        dataset.entity("orders").map(|entity| entity.name.as_str()),
        Some("LegacyOrder")
    );
}

#[test]
fn self_loop_policy_depends_on_flag() {
    let bare = Relationship::new("nodes", "nodes", RelationshipType::ForeignKey);
    assert!(!bare.is_valid());
    let flagged = bare.with_metadata(keys::SELF_REFERENTIAL, true);
    assert!(flagged.is_valid());
}
