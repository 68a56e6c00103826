use sqlx::PgPool;
use tracing::{debug, info};

use crate::adapter::Adapter;
use crate::error::Result;
use crate::options::IntrospectOptions;
use crate::snapshot::{SchemaSnapshot, TableSnapshot};

mod mapper;
mod queries;

/// Adapter for PostgreSQL databases.
#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    /// Create a new adapter using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Adapter for PostgresAdapter {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn introspect(&self, opts: &IntrospectOptions) -> Result<SchemaSnapshot> {
        introspect(&self.pool, opts).await
    }
}

/// Capture a Postgres catalog with default options.
pub async fn introspect_postgres(pool: &PgPool) -> Result<SchemaSnapshot> {
    introspect(pool, &IntrospectOptions::default()).await
}

/// Capture a Postgres catalog into a snapshot.
///
/// Tables outside `public` are named `schema.table`. The snapshot carries
/// no model descriptors.
pub async fn introspect(pool: &PgPool, opts: &IntrospectOptions) -> Result<SchemaSnapshot> {
    let schemas = mapper::filter_schemas(queries::list_schemas(pool).await?, opts);
    let relkinds = mapper::relkinds(opts);
    let mut tables = Vec::new();

    info!(schemas = schemas.len(), "postgres introspection started");

    for schema_name in schemas {
        let table_names = queries::list_tables_in_schema(pool, &schema_name, &relkinds).await?;
        for table_name in table_names {
            let raw_columns = queries::list_columns(pool, &schema_name, &table_name).await?;
            let raw_fks = queries::list_foreign_keys(pool, &schema_name, &table_name).await?;
            let name = mapper::qualified_name(&schema_name, &table_name);
            debug!(
                table = %name,
                columns = raw_columns.len(),
                foreign_keys = raw_fks.len(),
                "captured table"
            );
            tables.push(
                TableSnapshot::new(name)
                    .with_columns(mapper::map_columns(raw_columns))
                    .with_foreign_keys(mapper::map_foreign_keys(raw_fks)),
            );
        }
    }

    tables.sort_by(|left, right| left.name.cmp(&right.name));
    info!(tables = tables.len(), "postgres introspection finished");

    Ok(SchemaSnapshot {
        tables,
        models: Vec::new(),
    })
}
