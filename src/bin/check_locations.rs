//! Inspect the cached hiking-forecast dataset for matching location names.
//!
//! Prints the total entry count, then each name containing one of the
//! configured substrings, in source order. Failures are reported as a single
//! `Error: ...` line on stdout and the process still exits zero, matching
//! the behavior tooling around these utilities expects.

use anyhow::Result;
use cwa_tools::{dataset, CwaConfig};

fn run() -> Result<()> {
    let config = CwaConfig::load()?;
    cwa_tools::init_tracing(&config.logging);

    let report = dataset::run_lookup(&config.lookup)?;

    println!("Total Locations: {}", report.total);
    for name in &report.matches {
        println!("Found: {name}");
    }

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        println!("Error: {e:#}");
    }
}
