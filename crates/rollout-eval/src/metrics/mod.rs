//! Grouping and metrics over completed samples

mod grouped;
mod pass_at_k;
mod summary;

pub use grouped::{GroupedResults, ResultAggregator};
pub use pass_at_k::{
    MetricFn, compute_pass_at_k, compute_pass_at_k_labeled, pass_at_k_label, pass_at_k_metric,
    pass_at_k_single,
};
pub use summary::EvalSummary;
