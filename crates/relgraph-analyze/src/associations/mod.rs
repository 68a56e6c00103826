//! Relationships from declared object-relational associations.
//!
//! Runs in three stages: [`discovery`] finds table-backed model types,
//! [`extraction`] turns their associations into records, and [`builder`]
//! maps the records onto a dataset.

pub mod builder;
pub mod discovery;
pub mod extraction;

use tracing::info;

use relgraph_core::{Dataset, sources};
use relgraph_introspect::{AssociationProvider, SchemaProvider};

use crate::analyzer::Analyzer;
use crate::config::{AnalysisConfig, SelfReferencePolicy};
use crate::error::Result;
use crate::scope::Scope;

pub use builder::build_dataset;
pub use discovery::{DiscoveredTable, discover, resolve_backing_table};
pub use extraction::{AssociationData, AssociationRecord, Extractor, default_join_table};

pub struct AssociationAnalyzer<'a> {
    schema: &'a dyn SchemaProvider,
    models: &'a dyn AssociationProvider,
    scope: Scope,
    self_reference: SelfReferencePolicy,
}

impl<'a> AssociationAnalyzer<'a> {
    pub fn new(
        schema: &'a dyn SchemaProvider,
        models: &'a dyn AssociationProvider,
        scope: Scope,
    ) -> Self {
        Self {
            schema,
            models,
            scope,
            self_reference: SelfReferencePolicy::Flag,
        }
    }

    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.self_reference = config.self_reference.associations;
        self
    }

    pub fn with_self_reference(mut self, policy: SelfReferencePolicy) -> Self {
        self.self_reference = policy;
        self
    }
}

impl Analyzer for AssociationAnalyzer<'_> {
    type Raw = AssociationData;

    fn name(&self) -> &'static str {
        "associations"
    }

    fn analyzer_type(&self) -> &'static str {
        sources::ORM_MODEL
    }

    fn analyze(&self) -> Result<Self::Raw> {
        let scope = self.scope.resolve(self.schema)?;
        let discovered = discover(self.models, self.schema, &scope)?;
        info!(
            analyzer = self.name(),
            tables = discovered.len(),
            "model types discovered"
        );
        Ok(Extractor::new(self.models, self.schema, &scope).extract(&discovered))
    }

    fn transform_to_dataset(&self, raw: Self::Raw) -> Result<Dataset> {
        build_dataset(&raw, self.self_reference)
    }
}
