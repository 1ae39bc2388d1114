//! Fetch the configured township forecast from the CWA open-data datastore
//! and write the response body, pretty-printed, to the output file.
//!
//! Prints exactly `Done` on success. Failures are reported as a single
//! `Error: ...` line on stdout and the process still exits zero.

use anyhow::Result;
use cwa_tools::{api, CwaConfig};

fn run() -> Result<()> {
    let config = CwaConfig::load()?;
    cwa_tools::init_tracing(&config.logging);

    api::run_fetch(&config.fetch)?;

    println!("Done");
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        println!("Error: {e:#}");
    }
}
