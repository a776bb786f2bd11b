//! JSON report generation

use rollout_core::RolloutResult;

use super::EvalReport;

/// JSON report generator
pub struct JsonReporter;

impl JsonReporter {
    /// Generate a JSON report
    pub fn generate(report: &EvalReport) -> RolloutResult<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    /// Generate a compact JSON report (no pretty printing)
    pub fn generate_compact(report: &EvalReport) -> RolloutResult<String> {
        Ok(serde_json::to_string(report)?)
    }
}
