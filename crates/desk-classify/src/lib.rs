//! OpenDesk Classify - deterministic keyword-weighted triage
//!
//! Four dimension classifiers (type, category, urgency, impact) driven by
//! data rule tables, a 16-entry urgency×impact priority matrix, and the
//! orchestrator that combines them into a reviewed classification.
//!
//! Rules are plain data: updating a keyword list is a config change, not a
//! code change, and every class is unit-testable in isolation.

pub mod dimension;
pub mod orchestrator;
pub mod priority;
pub mod rules;

pub use dimension::{DimensionClassifier, DimensionOutcome};
pub use orchestrator::{ClassificationOrchestrator, ClassificationResult, Validation};
pub use priority::PriorityMatrix;
pub use rules::{ClassRule, DimensionRules, MatrixEntry, TriageRules};
