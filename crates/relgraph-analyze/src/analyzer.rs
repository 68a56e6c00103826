use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{info, warn};

use relgraph_core::Dataset;

use crate::error::{AnalyzeError, Result};

/// Uniform lifecycle shared by every relationship analyzer.
///
/// Implementors pull facts in [`Analyzer::analyze`] and map them onto the
/// graph model in [`Analyzer::transform_to_dataset`]. Callers only use
/// [`Analyzer::run`], which never fails.
pub trait Analyzer {
    /// Intermediate records produced by `analyze`.
    type Raw;

    /// Short analyzer name recorded in dataset metadata.
    fn name(&self) -> &'static str;

    /// Provenance tag of the evidence the analyzer reads.
    fn analyzer_type(&self) -> &'static str;

    /// Pull facts from the providers. An empty result is not an error.
    fn analyze(&self) -> Result<Self::Raw>;

    /// Deterministic mapping of raw records onto a dataset.
    fn transform_to_dataset(&self, raw: Self::Raw) -> Result<Dataset>;

    /// Analyze, transform and validate.
    ///
    /// An invalid dataset is logged and returned as is. Any error or panic
    /// yields an empty dataset tagged with the failure.
    fn run(&self) -> Dataset {
        let name = self.name();
        info!(analyzer = name, "analysis started");

        let outcome = catch_unwind(AssertUnwindSafe(|| -> Result<Dataset> {
            let raw = self.analyze()?;
            self.transform_to_dataset(raw)
        }));

        match outcome {
            Ok(Ok(mut dataset)) => {
                dataset.annotate_summary(name, self.analyzer_type());
                let issues = dataset.validation_errors();
                if let Some(first) = issues.first() {
                    warn!(
                        analyzer = name,
                        issues = issues.len(),
                        code = %first.code,
                        path = %first.path,
                        message = %first.message,
                        "analysis produced an invalid dataset"
                    );
                }
                info!(
                    analyzer = name,
                    entities = dataset.entity_count(),
                    relationships = dataset.relationship_count(),
                    "analysis finished"
                );
                dataset
            }
            Ok(Err(err)) => {
                warn!(analyzer = name, error = %err, "analysis failed");
                Dataset::empty_for_failure(name, &err.to_string())
            }
            Err(panic) => {
                let err = AnalyzeError::Panicked(panic_message(panic));
                warn!(analyzer = name, error = %err, "analysis panicked");
                Dataset::empty_for_failure(name, &err.to_string())
            }
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during analysis".to_string()
    }
}
