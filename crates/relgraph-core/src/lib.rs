//! Graph data model shared by every relationship analyzer.
//!
//! Analyzers emit [`Entity`] nodes and [`Relationship`] edges into a
//! [`Dataset`], which validates endpoint consistency and round-trips through
//! a plain JSON-shaped form.

pub mod dataset;
pub mod entity;
pub mod error;
pub mod graph;
pub mod relationship;
pub mod types;
pub mod validation;
pub mod value;

pub use dataset::{Dataset, EMPTY_REASON, FAILURE_REASON, PlainDataset};
pub use entity::{Attribute, Entity};
pub use error::{Error, Result};
pub use graph::{DatasetStats, build_adjacency, build_dataset_stats};
pub use relationship::Relationship;
pub use types::{Cardinality, DEFAULT_ENTITY_TYPE, RelationshipType, keys, sources};
pub use validation::{ValidationIssue, validate_dataset};
pub use value::{MetaValue, Metadata};
