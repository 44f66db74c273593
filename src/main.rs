//! ismip-hom - Resample and compare ISMIP-HOM benchmark results
//!
//! This is the main entry point for the ismip-hom application.

use tracing::{error, info, warn};

use ismip_hom::{init_tracing, Config, Pipeline, Result};

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;

    init_tracing(&config.log_level);

    info!("Starting ismip-hom v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration and resolve the pipeline stages
    let pipeline = Pipeline::new(config).map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        "Reading data files from {:?}",
        pipeline.config().paths.data_dir
    );

    let report = pipeline.run().map_err(|e| {
        error!("Pipeline failed: {}", e);
        e
    })?;

    for (class, count) in &report.records_per_class {
        info!("{} records: {}", class, count);
    }
    if !report.failures.is_empty() {
        warn!(
            "{} of {} files were excluded, see {:?}",
            report.failures.len(),
            report.files_discovered,
            report.summary_path
        );
    }

    info!(
        "Wrote {} tables to {:?}",
        report.export.exported.len(),
        pipeline.config().paths.output_dir
    );
    Ok(())
}
