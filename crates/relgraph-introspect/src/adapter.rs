use async_trait::async_trait;

use crate::error::Result;
use crate::options::IntrospectOptions;
use crate::snapshot::SchemaSnapshot;

/// Trait implemented by database adapters that can capture a snapshot.
#[async_trait]
pub trait Adapter {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Capture tables, columns and foreign keys into a snapshot.
    async fn introspect(&self, opts: &IntrospectOptions) -> Result<SchemaSnapshot>;
}
