//! Markdown report generation

use super::EvalReport;

/// Markdown report generator
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// Generate a Markdown report
    pub fn generate(report: &EvalReport) -> String {
        let mut md = String::new();

        md.push_str("# Rollout Evaluation Report\n\n");

        md.push_str("## Overview\n\n");
        md.push_str(&format!("- **Benchmark**: {}\n", report.benchmark));
        md.push_str(&format!("- **Run ID**: {}\n", report.run_id));
        md.push_str(&format!(
            "- **Timestamp**: {}\n",
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        md.push_str(&format!("- **Rollouts per task**: {}\n", report.config.n_rollouts));
        md.push_str(&format!(
            "- **Reward threshold**: {}\n",
            report.config.reward_threshold
        ));
        if let Some(ref stats) = report.stats {
            md.push_str(&format!(
                "- **Samples**: {} executed, {} recovered, {} failed in {:.1}s\n",
                stats.executed, stats.recovered, stats.failed, stats.elapsed_secs
            ));
        }
        md.push('\n');

        md.push_str("## Metrics\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        for (label, score) in &report.metrics {
            md.push_str(&format!("| {} | {:.4} |\n", label, score));
        }
        md.push('\n');

        let summary = &report.summary;
        md.push_str("## Summary\n\n");
        md.push_str("| Metric | Value |\n|--------|-------|\n");
        md.push_str(&format!("| Problems | {} |\n", summary.problems));
        md.push_str(&format!("| Samples | {} |\n", summary.total_samples));
        md.push_str(&format!(
            "| Correct | {} ({:.1}%) |\n",
            summary.correct_samples,
            summary.accuracy() * 100.0
        ));
        md.push_str(&format!("| Mean Reward | {:.4} |\n", summary.mean_reward));
        md.push_str(&format!("| Total Tokens | {} |\n", summary.total_tokens));
        for (reason, count) in &summary.termination_reasons {
            md.push_str(&format!("| Terminated: {} | {} |\n", reason, count));
        }
        md.push('\n');

        md.push_str("## Problems\n\n");
        md.push_str("| Problem | Samples | Correct | Pass@1 |\n");
        md.push_str("|---------|---------|---------|--------|\n");
        for problem in &report.problems {
            md.push_str(&format!(
                "| {} | {} | {} | {:.1}% |\n",
                problem.problem_id,
                problem.samples,
                problem.correct,
                problem.pass_at_1 * 100.0
            ));
        }
        md.push('\n');

        if !report.failures.is_empty() {
            md.push_str("## Failed Samples\n\n");
            md.push_str("Not checkpointed; they run again on resume.\n\n");
            for failure in &report.failures {
                md.push_str(&format!(
                    "- **{}** ({}): {}\n",
                    failure.sample_id, failure.problem_id, failure.error
                ));
            }
            md.push('\n');
        }

        md
    }
}
