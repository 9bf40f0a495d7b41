//! DetectorRegistry: register, enable/disable, run with panic isolation.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use govlint_core::errors::DetectionError;
use govlint_core::types::collections::FxHashSet;
use govlint_core::AnalysisConfig;

use super::traits::{DetectionContext, Detector, DetectorCategory};
use super::types::{Issue, IssueKind};

/// Ordered set of detectors. Output order follows registration order.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
    disabled: FxHashSet<String>,
}

/// Issues from every detector that completed, plus one error per panic.
#[derive(Debug, Default)]
pub struct RegistryOutput {
    pub issues: Vec<Issue>,
    pub errors: Vec<DetectionError>,
}

impl DetectorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
            disabled: FxHashSet::default(),
        }
    }

    /// Register a detector.
    pub fn register(&mut self, detector: Box<dyn Detector>) {
        self.detectors.push(detector);
    }

    /// Disable a specific detector by ID.
    pub fn disable(&mut self, id: &str) {
        self.disabled.insert(id.to_string());
    }

    /// Enable a previously disabled detector.
    pub fn enable(&mut self, id: &str) {
        self.disabled.remove(id);
    }

    /// Disable all detectors in a category.
    pub fn disable_category(&mut self, category: DetectorCategory) {
        for detector in &self.detectors {
            if detector.category() == category {
                self.disabled.insert(detector.id().to_string());
            }
        }
    }

    /// Run every enabled detector. A panicking detector is logged and
    /// recorded; the rest still run.
    pub fn run_all(&self, ctx: &DetectionContext) -> RegistryOutput {
        let mut output = RegistryOutput::default();
        for detector in self.detectors.iter().filter(|d| self.should_run(d.as_ref())) {
            match catch_unwind(AssertUnwindSafe(|| detector.detect(ctx))) {
                Ok(issues) => output.issues.extend(issues),
                Err(payload) => {
                    tracing::error!(
                        detector_id = detector.id(),
                        "detector panicked during detection"
                    );
                    output.errors.push(DetectionError::DetectorPanic {
                        id: detector.id().to_string(),
                        message: panic_message(payload.as_ref()),
                    });
                }
            }
        }
        output
    }

    /// Total number of registered detectors.
    pub fn count(&self) -> usize {
        self.detectors.len()
    }

    /// Number of enabled detectors.
    pub fn enabled_count(&self) -> usize {
        self.detectors
            .iter()
            .filter(|d| self.should_run(d.as_ref()))
            .count()
    }

    /// Whether a detector with this ID is registered and enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.detectors
            .iter()
            .any(|d| d.id() == id && self.should_run(d.as_ref()))
    }

    fn should_run(&self, detector: &dyn Detector) -> bool {
        !self.disabled.contains(detector.id())
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// All eleven single-file detectors, with those switched off by `config`
/// disabled. The via-call detectors also need `follow_method_calls`.
pub fn create_registry(config: &AnalysisConfig) -> DetectorRegistry {
    use super::bulkification::{NonBulkInvocableDetector, SingleRecordDmlDetector};
    use super::hardcoded_ids::HardcodedIdDetector;
    use super::loops::{
        DataOpInLoopDetector, DataOpInLoopViaCallDetector, QueryInLoopDetector,
        QueryInLoopViaCallDetector,
    };
    use super::nesting::DeepNestingDetector;
    use super::queries::{MissingLimitDetector, RecordTypeQueryDetector};
    use super::triggers::TriggerRecursionDetector;

    let mut registry = DetectorRegistry::new();
    registry.register(Box::new(QueryInLoopDetector));
    registry.register(Box::new(QueryInLoopViaCallDetector));
    registry.register(Box::new(DataOpInLoopDetector));
    registry.register(Box::new(DataOpInLoopViaCallDetector));
    registry.register(Box::new(HardcodedIdDetector));
    registry.register(Box::new(MissingLimitDetector));
    registry.register(Box::new(RecordTypeQueryDetector));
    registry.register(Box::new(SingleRecordDmlDetector));
    registry.register(Box::new(NonBulkInvocableDetector));
    registry.register(Box::new(TriggerRecursionDetector));
    registry.register(Box::new(DeepNestingDetector));

    let follow = config.effective_follow_method_calls();
    let switches = [
        (IssueKind::QueryInLoop, config.effective_detect_query_in_loop()),
        (
            IssueKind::QueryInLoopViaCall,
            follow && config.effective_detect_query_in_loop(),
        ),
        (IssueKind::DataOpInLoop, config.effective_detect_data_op_in_loop()),
        (
            IssueKind::DataOpInLoopViaCall,
            follow && config.effective_detect_data_op_in_loop(),
        ),
        (IssueKind::HardcodedId, config.effective_detect_hardcoded_ids()),
        (IssueKind::MissingLimit, config.effective_detect_missing_limit()),
        (
            IssueKind::RecordTypeQuery,
            config.effective_detect_record_type_queries(),
        ),
        (
            IssueKind::SingleRecordDml,
            config.effective_detect_non_bulkified_methods(),
        ),
        (
            IssueKind::NonBulkifiedInvocable,
            config.effective_detect_non_bulkified_methods(),
        ),
        (
            IssueKind::TriggerWithoutRecursionGuard,
            config.effective_detect_trigger_recursion(),
        ),
        (IssueKind::DeepNesting, config.effective_detect_deeply_nested_code()),
    ];
    for (kind, enabled) in switches {
        if !enabled {
            registry.disable(kind.code());
        }
    }
    registry
}
