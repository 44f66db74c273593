//! Writing comparison tables and the run summary.
//!
//! Each table is named after the benchmark figure it reproduces and
//! holds one row per point of the comparison slice:
//!
//! ```text
//! # x_hat,full-stokes min,full-stokes max,full-stokes mean,higher-order min,higher-order max,higher-order mean
//! 0,1,1,1,0.98,1.02,1
//! ```
//!
//! Undefined values are written as `nan`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

use crate::aggregate::{Comparison, Envelope, Quantity};
use crate::classify::MethodClass;
use crate::config::Config;
use crate::error::{IsmipError, Result};
use crate::experiment::Experiment;

/// Method classes written to comparison tables, in column order.
pub const EXPORTED_CLASSES: [MethodClass; 2] = [MethodClass::FullStokes, MethodClass::HigherOrder];

/// Name of the run summary written next to the tables.
pub const SUMMARY_FILE: &str = "summary.json";

/// Figure prefix of the table for an experiment and quantity.
pub fn figure_name(experiment: Experiment, quantity: Quantity) -> Option<&'static str> {
    match (experiment, quantity) {
        (Experiment::A, Quantity::SurfaceVelocity) => Some("ExpA_Fig5"),
        (Experiment::C, Quantity::SurfaceVelocity) => Some("ExpC_Fig8"),
        (Experiment::F, Quantity::SurfaceElevation) => Some("ExpF_Fig12"),
        (Experiment::F, Quantity::SurfaceVelocity) => Some("ExpF_Fig13"),
        _ => None,
    }
}

/// File name of the table for an experiment, quantity and scenario.
pub fn table_file_name(
    experiment: Experiment,
    quantity: Quantity,
    scenario: &str,
) -> Option<String> {
    figure_name(experiment, quantity).map(|figure| format!("{}_{}.txt", figure, scenario))
}

/// Create the output directory and its parents if missing.
pub fn ensure_output_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| IsmipError::Export {
        message: format!("Failed to create output directory {}: {}", path.display(), e),
    })
}

fn header(axis_name: &str) -> String {
    let mut columns = vec![axis_name.to_string()];
    for class in EXPORTED_CLASSES {
        for stat in ["min", "max", "mean"] {
            columns.push(format!("{} {}", class.label(), stat));
        }
    }
    format!("# {}", columns.join(","))
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => "nan".to_string(),
    }
}

fn envelope_cells(envelope: Option<&Envelope>, i: usize) -> [String; 3] {
    let pick = |values: Option<&Vec<Option<f64>>>| {
        format_value(values.and_then(|v| v.get(i).copied().flatten()))
    };
    [
        pick(envelope.map(|e| &e.min)),
        pick(envelope.map(|e| &e.max)),
        pick(envelope.map(|e| &e.mean)),
    ]
}

/// Write one comparison table into `dir`.
pub fn write_comparison(dir: &Path, comparison: &Comparison) -> Result<PathBuf> {
    let name = table_file_name(comparison.experiment, comparison.quantity, &comparison.scenario)
        .ok_or_else(|| IsmipError::Export {
            message: format!(
                "No table is defined for experiment {} {}",
                comparison.experiment, comparison.quantity
            ),
        })?;
    let path = dir.join(name);

    let mut file = File::create(&path)?;
    writeln!(file, "{}", header(comparison.axis_name))?;

    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    for (i, coordinate) in comparison.axis.iter().enumerate() {
        let mut record = vec![coordinate.to_string()];
        for class in EXPORTED_CLASSES {
            record.extend(envelope_cells(comparison.envelope(class), i));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(path)
}

/// A table written during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedTable {
    pub path: PathBuf,
    pub experiment: Experiment,
    pub scenario: String,
    pub quantity: Quantity,
    /// Contributing records per method class
    pub members: BTreeMap<MethodClass, usize>,
}

/// A table that was not written because no full-Stokes or higher-order
/// record contributed to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbsentGroup {
    pub experiment: Experiment,
    pub scenario: String,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub exported: Vec<ExportedTable>,
    pub absent: Vec<AbsentGroup>,
}

/// Write every comparison table of the gridded experiments.
///
/// Every expected scenario of an experiment is visited, plus any other
/// scenario found in `comparisons`. Scenarios without full-Stokes and
/// higher-order data are reported as absent rather than written.
pub fn export_all(dir: &Path, comparisons: &[Comparison]) -> Result<ExportOutcome> {
    ensure_output_dir(dir)?;
    let mut outcome = ExportOutcome::default();

    for experiment in Experiment::ALL.into_iter().filter(|e| e.has_query_grid()) {
        for &quantity in Quantity::for_experiment(experiment) {
            let mut scenarios: BTreeSet<&str> =
                experiment.expected_scenarios().iter().copied().collect();
            scenarios.extend(
                comparisons
                    .iter()
                    .filter(|c| c.experiment == experiment && c.quantity == quantity)
                    .map(|c| c.scenario.as_str()),
            );

            for scenario in scenarios {
                let comparison = comparisons.iter().find(|c| {
                    c.experiment == experiment && c.quantity == quantity && c.scenario == scenario
                });
                let exported_classes = comparison
                    .map(|c| {
                        EXPORTED_CLASSES
                            .iter()
                            .filter(|class| c.envelope(**class).is_some())
                            .count()
                    })
                    .unwrap_or(0);

                let Some(comparison) = comparison.filter(|_| exported_classes > 0) else {
                    warn!(
                        experiment = %experiment,
                        scenario = scenario,
                        quantity = %quantity,
                        "No full-Stokes or higher-order data, table not written"
                    );
                    outcome.absent.push(AbsentGroup {
                        experiment,
                        scenario: scenario.to_string(),
                        quantity,
                    });
                    continue;
                };

                for class in EXPORTED_CLASSES {
                    if comparison.envelope(class).is_none() {
                        warn!(
                            experiment = %experiment,
                            scenario = scenario,
                            quantity = %quantity,
                            class = %class,
                            "No data for method class, its columns are written as nan"
                        );
                    }
                }

                let path = write_comparison(dir, comparison)?;
                info!(
                    file = %path.display(),
                    rows = comparison.axis.len(),
                    "Exported comparison table"
                );
                outcome.exported.push(ExportedTable {
                    path,
                    experiment,
                    scenario: scenario.to_string(),
                    quantity,
                    members: comparison
                        .envelopes
                        .iter()
                        .map(|(class, envelope)| (*class, envelope.members))
                        .collect(),
                });
            }
        }
    }

    Ok(outcome)
}

/// A per-record failure as recorded in the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureSummary {
    pub path: PathBuf,
    pub kind: String,
    pub message: String,
}

/// Machine-readable account of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub config: Config,
    pub files_discovered: usize,
    pub records_per_class: BTreeMap<MethodClass, usize>,
    pub records_interpolated: usize,
    pub failures: Vec<FailureSummary>,
    pub exported: Vec<ExportedTable>,
    pub absent: Vec<AbsentGroup>,
}

/// Write `summary.json` into `dir`.
pub fn write_summary(dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    ensure_output_dir(dir)?;
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(&path, json)?;
    Ok(path)
}
