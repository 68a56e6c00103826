use std::collections::BTreeMap;

use tracing::{debug, warn};

use relgraph_introspect::{AssociationProvider, SchemaProvider};

use crate::error::Result;
use crate::inflect::{pluralize, singularize};
use crate::scope::ResolvedScope;

/// Model types sharing one backing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTable {
    pub table: String,
    /// Sorted by name; the first one names the entity.
    pub model_types: Vec<String>,
}

/// Find the existing table behind a declared table name.
///
/// The declared name is tried first, then its plural and singular forms.
pub fn resolve_backing_table(declared: &str, schema: &dyn SchemaProvider) -> Option<String> {
    let mut candidates = vec![declared.to_string()];
    for candidate in [pluralize(declared), singularize(declared)] {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
        .into_iter()
        .find(|candidate| schema.table_exists(candidate))
}

/// Enumerate concrete, table-backed model types inside the scope, grouped
/// by table.
pub fn discover(
    models: &dyn AssociationProvider,
    schema: &dyn SchemaProvider,
    scope: &ResolvedScope,
) -> Result<Vec<DiscoveredTable>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for model in models.list_model_types()? {
        if model.is_abstract {
            debug!(model = %model.name, "skipping abstract model type");
            continue;
        }
        let declared = match models.table_of(&model.name) {
            Ok(table) => table,
            Err(err) => {
                warn!(model = %model.name, error = %err, "skipping model without table");
                continue;
            }
        };
        let Some(table) = resolve_backing_table(&declared, schema) else {
            debug!(model = %model.name, table = %declared, "backing table does not exist");
            continue;
        };
        if !scope.contains(&table) {
            continue;
        }
        grouped.entry(table).or_default().push(model.name);
    }

    Ok(grouped
        .into_iter()
        .map(|(table, mut model_types)| {
            model_types.sort();
            model_types.dedup();
            DiscoveredTable { table, model_types }
        })
        .collect())
}
