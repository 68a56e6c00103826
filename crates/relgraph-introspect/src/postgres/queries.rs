use sqlx::{PgPool, Row};

use crate::error::Result;

pub async fn list_schemas(pool: &PgPool) -> Result<Vec<String>> {
    let rows = sqlx::query("select nspname::text as name from pg_namespace order by nspname")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| Ok(row.try_get::<String, _>("name")?))
        .collect()
}

pub async fn list_tables_in_schema(
    pool: &PgPool,
    schema: &str,
    relkinds: &[String],
) -> Result<Vec<String>> {
    let rows = sqlx::query(
        r#"
        select c.relname::text as name
        from pg_class c
        join pg_namespace n on n.oid = c.relnamespace
        where n.nspname = $1
          and c.relkind::text = any($2)
        order by c.relname
        "#,
    )
    .bind(schema)
    .bind(relkinds)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| Ok(row.try_get::<String, _>("name")?))
        .collect()
}

pub struct RawColumn {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub is_primary_key: bool,
}

pub async fn list_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<RawColumn>> {
    let rows = sqlx::query(
        r#"
        select
          a.attname::text as name,
          pg_catalog.format_type(a.atttypid, a.atttypmod) as data_type,
          (not a.attnotnull) as is_nullable,
          pg_get_expr(ad.adbin, ad.adrelid) as column_default,
          exists (
            select 1
            from pg_index i
            where i.indrelid = c.oid
              and i.indisprimary
              and a.attnum = any(i.indkey)
          ) as is_primary_key
        from pg_attribute a
        join pg_class c on c.oid = a.attrelid
        join pg_namespace n on n.oid = c.relnamespace
        left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
        where n.nspname = $1
          and c.relname = $2
          and a.attnum > 0
          and not a.attisdropped
        order by a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(RawColumn {
                name: row.try_get("name")?,
                data_type: row.try_get("data_type")?,
                is_nullable: row.try_get("is_nullable")?,
                default: row.try_get("column_default")?,
                is_primary_key: row.try_get("is_primary_key")?,
            })
        })
        .collect()
}

pub struct RawForeignKey {
    pub name: String,
    pub column: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_update_code: String,
    pub on_delete_code: String,
}

/// One row per referencing column, ordered within each constraint.
pub async fn list_foreign_keys(
    pool: &PgPool,
    schema: &str,
    table: &str,
) -> Result<Vec<RawForeignKey>> {
    let rows = sqlx::query(
        r#"
        select
          con.conname::text as name,
          att.attname::text as column_name,
          rn.nspname::text as referenced_schema,
          rc.relname::text as referenced_table,
          ratt.attname::text as referenced_column,
          con.confupdtype::text as on_update_code,
          con.confdeltype::text as on_delete_code
        from pg_constraint con
        join pg_class c on c.oid = con.conrelid
        join pg_namespace n on n.oid = c.relnamespace
        join pg_class rc on rc.oid = con.confrelid
        join pg_namespace rn on rn.oid = rc.relnamespace
        cross join lateral unnest(con.conkey, con.confkey)
          with ordinality as k(attnum, refnum, ord)
        join pg_attribute att on att.attrelid = con.conrelid and att.attnum = k.attnum
        join pg_attribute ratt on ratt.attrelid = con.confrelid and ratt.attnum = k.refnum
        where con.contype = 'f'
          and n.nspname = $1
          and c.relname = $2
        order by con.conname, k.ord
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(RawForeignKey {
                name: row.try_get("name")?,
                column: row.try_get("column_name")?,
                referenced_schema: row.try_get("referenced_schema")?,
                referenced_table: row.try_get("referenced_table")?,
                referenced_column: row.try_get("referenced_column")?,
                on_update_code: row.try_get("on_update_code")?,
                on_delete_code: row.try_get("on_delete_code")?,
            })
        })
        .collect()
}
