//! Providers of schema and association facts.
//!
//! Analyzers only ever see the [`SchemaProvider`] and
//! [`AssociationProvider`] traits. [`SnapshotProvider`] serves a captured
//! [`SchemaSnapshot`]; [`PostgresAdapter`] captures one from a live catalog.

pub mod adapter;
pub mod error;
pub mod options;
pub mod postgres;
pub mod provider;
pub mod snapshot;

pub use adapter::Adapter;
pub use error::{ProviderError, Result};
pub use options::IntrospectOptions;
pub use postgres::{PostgresAdapter, introspect_postgres};
pub use provider::{
    AssociationInfo, AssociationKind, AssociationProvider, ColumnInfo, FkAction, ForeignKeyInfo,
    ModelType, SchemaProvider,
};
pub use snapshot::{ModelSnapshot, SchemaSnapshot, SnapshotProvider, TableSnapshot};
