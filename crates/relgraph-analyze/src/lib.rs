//! Relationship analyzers.
//!
//! Each analyzer reads one kind of evidence and produces a
//! [`relgraph_core::Dataset`]:
//!
//! - [`ConstraintAnalyzer`]: declared foreign-key constraints.
//! - [`AssociationAnalyzer`]: object-relational model associations.
//! - [`InferenceAnalyzer`]: naming and structural heuristics.
//!
//! Analyzers are independent. Combining their datasets is left to callers.

pub mod analyzer;
pub mod associations;
pub mod config;
pub mod constraints;
pub mod error;
pub mod inference;
pub mod inflect;
pub mod scope;

pub use analyzer::Analyzer;
pub use associations::AssociationAnalyzer;
pub use config::{AnalysisConfig, InferenceConfig, SelfReferenceConfig, SelfReferencePolicy};
pub use constraints::ConstraintAnalyzer;
pub use error::{AnalyzeError, Result};
pub use inference::{InferenceAnalyzer, InferenceRecord, InferenceType};
pub use scope::{ResolvedScope, Scope};
