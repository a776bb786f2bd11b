//! Report generation for evaluation results
//!
//! Renders an [`EvalReport`] as JSON, Markdown or a plain terminal table.

mod json;
mod markdown;

pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rollout_core::{RolloutError, RolloutResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metrics::{EvalSummary, GroupedResults, pass_at_k_single};
use crate::runner::{EvalConfig, EvalRun, RunStats};
use crate::sample::SampleFailure;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Markdown,
    Table,
}

impl FromStr for ReportFormat {
    type Err = RolloutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "table" => Ok(ReportFormat::Table),
            other => Err(RolloutError::config(format!(
                "Unknown report format '{}'. Expected json, markdown or table",
                other
            ))),
        }
    }
}

/// Per-problem line of a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemSummary {
    pub problem_id: String,
    pub samples: usize,
    pub correct: usize,
    /// pass@1 for this problem alone
    pub pass_at_1: f64,
}

/// Everything a report renders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub run_id: Uuid,
    pub benchmark: String,
    pub timestamp: DateTime<Utc>,
    pub config: EvalConfig,

    /// Metric label (e.g. `pass@1`) → score
    pub metrics: BTreeMap<String, f64>,

    pub summary: EvalSummary,

    /// Absent when the report was built from a log rather than a run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunStats>,

    #[serde(default)]
    pub problems: Vec<ProblemSummary>,

    #[serde(default)]
    pub failures: Vec<SampleFailure>,
}

impl EvalReport {
    /// Build a report over grouped results
    pub fn new(
        benchmark: impl Into<String>,
        config: EvalConfig,
        results: &GroupedResults,
        metrics: BTreeMap<String, f64>,
    ) -> Self {
        let threshold = config.reward_threshold;
        let problems = results
            .iter()
            .map(|(problem_id, group)| {
                let correct = group.iter().filter(|s| s.is_correct(threshold)).count();
                ProblemSummary {
                    problem_id: problem_id.to_string(),
                    samples: group.len(),
                    correct,
                    pass_at_1: pass_at_k_single(group.len(), correct, 1),
                }
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            benchmark: benchmark.into(),
            timestamp: Utc::now(),
            summary: EvalSummary::from_results(results, threshold),
            config,
            metrics,
            stats: None,
            problems,
            failures: Vec::new(),
        }
    }

    /// Build a report for a finished run, including its counters and failures
    pub fn from_run(
        benchmark: impl Into<String>,
        config: EvalConfig,
        run: &EvalRun,
        metrics: BTreeMap<String, f64>,
    ) -> Self {
        let mut report = Self::new(benchmark, config, &run.results, metrics);
        report.stats = Some(run.stats.clone());
        report.failures = run.failures.clone();
        report
    }
}

/// Generate a report in the specified format
pub fn generate_report(report: &EvalReport, format: ReportFormat) -> RolloutResult<String> {
    match format {
        ReportFormat::Json => JsonReporter::generate(report),
        ReportFormat::Markdown => Ok(MarkdownReporter::generate(report)),
        ReportFormat::Table => Ok(generate_table(report)),
    }
}

/// Generate a simple table report for terminal output
fn generate_table(report: &EvalReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{:=<70}\n", "= Rollout Evaluation Results "));
    output.push_str(&format!(
        "Benchmark: {} | Rollouts: {} | Threshold: {}\n",
        report.benchmark, report.config.n_rollouts, report.config.reward_threshold
    ));
    output.push_str(&format!(
        "Timestamp: {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("{:=<70}\n\n", ""));

    output.push_str("METRICS\n");
    output.push_str(&format!("{:-<70}\n", ""));
    for (label, score) in &report.metrics {
        output.push_str(&format!("{:<20} {:>8.4}\n", label, score));
    }
    output.push('\n');

    let summary = &report.summary;
    output.push_str("SUMMARY\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!("Problems:      {}\n", summary.problems));
    output.push_str(&format!(
        "Samples:       {} ({} correct, {:.1}%)\n",
        summary.total_samples,
        summary.correct_samples,
        summary.accuracy() * 100.0
    ));
    output.push_str(&format!(
        "Mean Reward:   {:.4} over {} rewarded\n",
        summary.mean_reward, summary.rewarded_samples
    ));
    output.push_str(&format!("Total Tokens:  {}\n", summary.total_tokens));
    if let Some(ref stats) = report.stats {
        output.push_str(&format!(
            "Executed:      {} | Recovered: {} | Failed: {} | Time: {:.1}s\n",
            stats.executed, stats.recovered, stats.failed, stats.elapsed_secs
        ));
    }
    output.push('\n');

    if !summary.termination_reasons.is_empty() {
        output.push_str("TERMINATION\n");
        output.push_str(&format!("{:-<70}\n", ""));
        for (reason, count) in &summary.termination_reasons {
            output.push_str(&format!("{:<24} {:>8}\n", reason, count));
        }
        output.push('\n');
    }

    output.push_str("PROBLEMS\n");
    output.push_str(&format!("{:-<70}\n", ""));
    output.push_str(&format!(
        "{:<40} {:>8} {:>8} {:>10}\n",
        "Problem", "Samples", "Correct", "Pass@1"
    ));
    output.push_str(&format!("{:-<70}\n", ""));
    for problem in &report.problems {
        output.push_str(&format!(
            "{:<40} {:>8} {:>8} {:>9.1}%\n",
            truncate(&problem.problem_id, 38),
            problem.samples,
            problem.correct,
            problem.pass_at_1 * 100.0
        ));
    }

    if !report.failures.is_empty() {
        output.push_str(&format!("\nFAILED SAMPLES ({})\n", report.failures.len()));
        output.push_str(&format!("{:-<70}\n", ""));
        for failure in &report.failures {
            output.push_str(&format!(
                "{:<30} {}\n",
                truncate(&failure.sample_id, 28),
                failure.error
            ));
        }
    }

    output.push_str(&format!("{:=<70}\n", ""));
    output
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}
