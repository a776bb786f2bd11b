//! Benchmark registry
//!
//! Maps benchmark names to loaders. A [`BenchmarkRegistry`] can be built and
//! passed around explicitly; [`global_registry`] is the process-wide instance,
//! populated with the built-in benchmarks on first use.

use std::collections::BTreeMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rollout_core::{RolloutError, RolloutResult};
use tracing::debug;

use crate::benchmarks::{AimeBenchmark, Benchmark, JsonlBenchmark, SyntheticBenchmark};

/// Name → benchmark table. Entries are never replaced or removed.
#[derive(Default)]
pub struct BenchmarkRegistry {
    benchmarks: RwLock<BTreeMap<String, Arc<dyn Benchmark>>>,
}

impl BenchmarkRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in benchmarks
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        register_builtin_benchmarks(&registry);
        registry
    }

    /// Register a benchmark under its own name
    pub fn register(&self, benchmark: Arc<dyn Benchmark>) -> RolloutResult<()> {
        let name = benchmark.name().to_string();
        self.register_as(name, benchmark)
    }

    /// Register a benchmark under `name`; fails if the name is taken
    pub fn register_as(
        &self,
        name: impl Into<String>,
        benchmark: Arc<dyn Benchmark>,
    ) -> RolloutResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RolloutError::config("Benchmark name must not be empty"));
        }

        let mut benchmarks = self.benchmarks.write();
        if benchmarks.contains_key(&name) {
            return Err(RolloutError::conflict(format!(
                "Benchmark '{}' is already registered",
                name
            )));
        }

        debug!(benchmark = %name, "Registered benchmark");
        benchmarks.insert(name, benchmark);
        Ok(())
    }

    /// Look up a benchmark; the error lists every known name
    pub fn get(&self, name: &str) -> RolloutResult<Arc<dyn Benchmark>> {
        let benchmarks = self.benchmarks.read();
        benchmarks.get(name).cloned().ok_or_else(|| {
            let available = if benchmarks.is_empty() {
                "(none)".to_string()
            } else {
                benchmarks.keys().cloned().collect::<Vec<_>>().join(", ")
            };
            RolloutError::not_found_resource(
                format!("Unknown benchmark '{}'. Available: {}", name, available),
                "benchmark",
            )
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.benchmarks.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn list(&self) -> Vec<String> {
        self.benchmarks.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.benchmarks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.benchmarks.read().is_empty()
    }
}

impl std::fmt::Debug for BenchmarkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkRegistry")
            .field("benchmarks", &self.list())
            .finish()
    }
}

/// Add `aime`, `synthetic` and `jsonl` to a registry.
///
/// Names already present are left alone.
pub fn register_builtin_benchmarks(registry: &BenchmarkRegistry) {
    let builtins: [Arc<dyn Benchmark>; 3] = [
        Arc::new(AimeBenchmark),
        Arc::new(SyntheticBenchmark),
        Arc::new(JsonlBenchmark),
    ];
    for benchmark in builtins {
        if !registry.contains(benchmark.name()) {
            let _ = registry.register(benchmark);
        }
    }
}

static GLOBAL_REGISTRY: Lazy<BenchmarkRegistry> = Lazy::new(BenchmarkRegistry::with_builtins);

/// The process-wide registry
pub fn global_registry() -> &'static BenchmarkRegistry {
    &GLOBAL_REGISTRY
}

/// Register a benchmark in the process-wide registry
pub fn register_benchmark(benchmark: Arc<dyn Benchmark>) -> RolloutResult<()> {
    global_registry().register(benchmark)
}

/// Look up a benchmark in the process-wide registry
pub fn get_benchmark(name: &str) -> RolloutResult<Arc<dyn Benchmark>> {
    global_registry().get(name)
}

/// Names in the process-wide registry, sorted
pub fn list_benchmarks() -> Vec<String> {
    global_registry().list()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::BenchmarkOptions;
    use rollout_core::Task;

    struct Named(&'static str);

    impl Benchmark for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn load_dataset(&self, _options: &BenchmarkOptions) -> RolloutResult<Vec<Task>> {
            Ok(vec![Task::new(self.0)])
        }
    }

    #[test]
    fn test_duplicate_registration_conflicts() {
        let registry = BenchmarkRegistry::new();
        registry.register(Arc::new(Named("math"))).unwrap();

        let err = registry.register(Arc::new(Named("math"))).unwrap_err();
        assert_eq!(err.error_code(), "ROLLOUT_CONFLICT");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_name_lists_available() {
        let registry = BenchmarkRegistry::new();
        let err = registry.get("aime").err().unwrap();
        assert_eq!(err.error_code(), "ROLLOUT_NOT_FOUND");
        assert!(err.message().contains("(none)"));

        registry.register(Arc::new(Named("zeta"))).unwrap();
        registry.register(Arc::new(Named("alpha"))).unwrap();
        let err = registry.get("aime").err().unwrap();
        assert!(err.message().contains("Available: alpha, zeta"));
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = BenchmarkRegistry::new();
        for name in ["gsm8k", "aime", "math"] {
            registry.register(Arc::new(Named(name))).unwrap();
        }
        assert_eq!(registry.list(), vec!["aime", "gsm8k", "math"]);
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = BenchmarkRegistry::new();
        let err = registry.register(Arc::new(Named(" "))).unwrap_err();
        assert_eq!(err.error_code(), "ROLLOUT_CONFIG");
    }

    #[test]
    fn test_builtins() {
        let registry = BenchmarkRegistry::with_builtins();
        assert_eq!(registry.list(), vec!["aime", "jsonl", "synthetic"]);
        assert_eq!(registry.get("aime").unwrap().name(), "aime");

        // Idempotent on an already-populated registry
        register_builtin_benchmarks(&registry);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_global_registry_has_builtins() {
        assert!(list_benchmarks().contains(&"aime".to_string()));
        assert!(get_benchmark("synthetic").is_ok());
    }
}
