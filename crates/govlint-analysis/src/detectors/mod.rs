//! Rule engine: one detector per issue kind, run through a registry.

pub mod bulkification;
pub mod hardcoded_ids;
pub mod loops;
pub mod nesting;
pub mod queries;
pub mod registry;
pub mod traits;
pub mod triggers;
pub mod types;
pub mod untested_fields;

pub use registry::{create_registry, DetectorRegistry, RegistryOutput};
pub use traits::{DetectionContext, Detector, DetectorCategory};
pub use types::{Issue, IssueKind, RelatedInfo, Severity};
pub use untested_fields::analyze_untested_fields;
