use relgraph_core::MetaValue;

use crate::options::IntrospectOptions;
use crate::provider::{ColumnInfo, FkAction, ForeignKeyInfo};

use super::queries::{RawColumn, RawForeignKey};

pub fn filter_schemas(raw: Vec<String>, opts: &IntrospectOptions) -> Vec<String> {
    raw.into_iter()
        .filter(|schema| {
            let is_system = schema.starts_with("pg_") || schema == "information_schema";
            match &opts.schemas {
                Some(list) => list.iter().any(|item| item == schema),
                None => opts.include_system_schemas || !is_system,
            }
        })
        .collect()
}

/// `pg_class.relkind` codes to capture.
pub fn relkinds(opts: &IntrospectOptions) -> Vec<String> {
    let mut kinds = vec!["r".to_string(), "p".to_string()];
    if opts.include_views {
        kinds.push("v".to_string());
        kinds.push("m".to_string());
    }
    kinds
}

pub fn qualified_name(schema: &str, table: &str) -> String {
    if schema == "public" {
        table.to_string()
    } else {
        format!("{schema}.{table}")
    }
}

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnInfo> {
    raw.into_iter()
        .map(|col| ColumnInfo {
            name: col.name,
            data_type: col.data_type,
            nullable: col.is_nullable,
            default: col.default.map(MetaValue::Text),
            is_primary_key: col.is_primary_key,
        })
        .collect()
}

pub fn map_foreign_keys(raw: Vec<RawForeignKey>) -> Vec<ForeignKeyInfo> {
    raw.into_iter()
        .map(|fk| ForeignKeyInfo {
            column: fk.column,
            to_table: qualified_name(&fk.referenced_schema, &fk.referenced_table),
            to_column: Some(fk.referenced_column),
            constraint_name: Some(fk.name),
            on_delete: fk_action_from_code(&fk.on_delete_code),
            on_update: fk_action_from_code(&fk.on_update_code),
        })
        .collect()
}

pub fn fk_action_from_code(code: &str) -> FkAction {
    match code {
        "a" => FkAction::NoAction,
        "r" => FkAction::Restrict,
        "c" => FkAction::Cascade,
        "n" => FkAction::SetNull,
        "d" => FkAction::SetDefault,
        _ => FkAction::Unknown,
    }
}
