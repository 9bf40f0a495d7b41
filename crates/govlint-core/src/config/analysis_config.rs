//! Rule engine configuration.

use serde::{Deserialize, Serialize};

/// Default nesting threshold for the deep-nesting rule.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 3;

/// Per-rule switches for the rule engine.
///
/// Every field is optional so that partial config layers merge cleanly;
/// read values through the `effective_*` accessors. Keys are snake_case
/// in TOML and also accept the camelCase spelling editor hosts use.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// SOQL inside loops. Default: true.
    #[serde(alias = "detectQueryInLoop")]
    pub detect_query_in_loop: Option<bool>,
    /// DML inside loops. Default: true.
    #[serde(alias = "detectDataOpInLoop")]
    pub detect_data_op_in_loop: Option<bool>,
    /// Hardcoded record ids. Default: true.
    #[serde(alias = "detectHardcodedIds")]
    pub detect_hardcoded_ids: Option<bool>,
    /// Queries without LIMIT. Default: false.
    #[serde(alias = "detectMissingLimit")]
    pub detect_missing_limit: Option<bool>,
    /// Follow same-file method calls from loops. Default: true.
    #[serde(alias = "followMethodCalls")]
    pub follow_method_calls: Option<bool>,
    /// Custom fields the companion test class never references. Default: true.
    #[serde(alias = "detectUntestedFields")]
    pub detect_untested_fields: Option<bool>,
    /// Queries against RecordType. Default: true.
    #[serde(alias = "detectRecordTypeQueries")]
    pub detect_record_type_queries: Option<bool>,
    /// Single-record DML and non-bulk invocable methods. Default: true.
    #[serde(alias = "detectNonBulkifiedMethods")]
    pub detect_non_bulkified_methods: Option<bool>,
    /// Triggers without a recursion guard. Default: true.
    #[serde(alias = "detectTriggerRecursion")]
    pub detect_trigger_recursion: Option<bool>,
    /// Deeply nested control blocks. Default: true.
    #[serde(alias = "detectDeeplyNestedCode")]
    pub detect_deeply_nested_code: Option<bool>,
    /// Nesting depth above which code is reported. Default: 3.
    #[serde(alias = "maxNestingDepth")]
    pub max_nesting_depth: Option<u32>,
}

impl AnalysisConfig {
    pub fn effective_detect_query_in_loop(&self) -> bool {
        self.detect_query_in_loop.unwrap_or(true)
    }

    pub fn effective_detect_data_op_in_loop(&self) -> bool {
        self.detect_data_op_in_loop.unwrap_or(true)
    }

    pub fn effective_detect_hardcoded_ids(&self) -> bool {
        self.detect_hardcoded_ids.unwrap_or(true)
    }

    /// Off by default: most selective queries legitimately omit LIMIT.
    pub fn effective_detect_missing_limit(&self) -> bool {
        self.detect_missing_limit.unwrap_or(false)
    }

    pub fn effective_follow_method_calls(&self) -> bool {
        self.follow_method_calls.unwrap_or(true)
    }

    pub fn effective_detect_untested_fields(&self) -> bool {
        self.detect_untested_fields.unwrap_or(true)
    }

    pub fn effective_detect_record_type_queries(&self) -> bool {
        self.detect_record_type_queries.unwrap_or(true)
    }

    pub fn effective_detect_non_bulkified_methods(&self) -> bool {
        self.detect_non_bulkified_methods.unwrap_or(true)
    }

    pub fn effective_detect_trigger_recursion(&self) -> bool {
        self.detect_trigger_recursion.unwrap_or(true)
    }

    pub fn effective_detect_deeply_nested_code(&self) -> bool {
        self.detect_deeply_nested_code.unwrap_or(true)
    }

    /// Returns the effective nesting threshold, defaulting to 3.
    pub fn effective_max_nesting_depth(&self) -> u32 {
        self.max_nesting_depth.unwrap_or(DEFAULT_MAX_NESTING_DEPTH)
    }

    /// Overlay `other` onto `self`, keeping `self` where `other` is unset.
    pub fn merge_from(&mut self, other: &AnalysisConfig) {
        pick(&mut self.detect_query_in_loop, other.detect_query_in_loop);
        pick(&mut self.detect_data_op_in_loop, other.detect_data_op_in_loop);
        pick(&mut self.detect_hardcoded_ids, other.detect_hardcoded_ids);
        pick(&mut self.detect_missing_limit, other.detect_missing_limit);
        pick(&mut self.follow_method_calls, other.follow_method_calls);
        pick(&mut self.detect_untested_fields, other.detect_untested_fields);
        pick(&mut self.detect_record_type_queries, other.detect_record_type_queries);
        pick(&mut self.detect_non_bulkified_methods, other.detect_non_bulkified_methods);
        pick(&mut self.detect_trigger_recursion, other.detect_trigger_recursion);
        pick(&mut self.detect_deeply_nested_code, other.detect_deeply_nested_code);
        pick(&mut self.max_nesting_depth, other.max_nesting_depth);
    }
}

fn pick<T: Copy>(base: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *base = other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert!(config.effective_detect_query_in_loop());
        assert!(config.effective_follow_method_calls());
        assert!(!config.effective_detect_missing_limit());
        assert_eq!(config.effective_max_nesting_depth(), 3);
    }

    #[test]
    fn merge_keeps_unset_fields() {
        let mut base = AnalysisConfig {
            detect_hardcoded_ids: Some(false),
            max_nesting_depth: Some(5),
            ..Default::default()
        };
        let overlay = AnalysisConfig {
            max_nesting_depth: Some(4),
            ..Default::default()
        };
        base.merge_from(&overlay);
        assert_eq!(base.detect_hardcoded_ids, Some(false));
        assert_eq!(base.max_nesting_depth, Some(4));
    }
}
