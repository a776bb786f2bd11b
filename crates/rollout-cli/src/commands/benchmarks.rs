//! List registered benchmarks

use anyhow::Result;
use rollout_eval::registry::BenchmarkRegistry;

/// Print every registered benchmark with its description
pub fn list(registry: &BenchmarkRegistry) -> Result<()> {
    let names = registry.list();
    if names.is_empty() {
        println!("No benchmarks registered.");
        return Ok(());
    }

    println!("Available benchmarks:\n");
    println!("{:<16} {}", "Name", "Description");
    println!("{:-<70}", "");
    for name in &names {
        let benchmark = registry.get(name)?;
        println!("{:<16} {}", name, benchmark.description());
    }
    println!("\nTotal: {} benchmarks", names.len());

    Ok(())
}
