//! Query mode: export every existing delegation edge to CSV.

use std::path::Path;

use anyhow::{Context, Result};

use maildelegate_core::Settings;
use maildelegate_directory::DirectoryClient;
use maildelegate_sync::Driver;

pub fn run(settings: &Settings, output: &Path) -> Result<()> {
    let client = DirectoryClient::from_settings(settings);
    let report = Driver::new(&client)
        .run_query(output)
        .with_context(|| format!("delegation query failed for '{}'", output.display()))?;

    println!(
        "✓ Wrote {} delegation records ({} users scanned) to {}",
        report.records.len(),
        report.user_count,
        report.output.display()
    );
    Ok(())
}
