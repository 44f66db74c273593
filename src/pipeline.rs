//! The batch pipeline.
//!
//! Every discovered file is classified, loaded and interpolated on its
//! own; files that fail are set aside as [`RecordFailure`]s and the run
//! carries on. The surviving fields are then aggregated and exported.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span};
use uuid::Uuid;

use crate::aggregate::{aggregate, Comparison};
use crate::classify::{MethodClass, RecordId};
use crate::config::Config;
use crate::coordinates::{get_detector, ConventionDetector};
use crate::data_loader::{discover_files, load_record};
use crate::error::{IsmipError, Result};
use crate::experiment::Experiment;
use crate::export::{export_all, write_summary, ExportOutcome, FailureSummary, RunSummary};
use crate::grid::QueryGrid;
use crate::interpolation::{get_interpolator, Interpolator};
use crate::logging::{
    generate_run_id, log_operation_end, log_operation_start, log_record_failure,
    log_timed_operation,
};
use crate::record::{interpolate_record, InterpolatedField};

/// A data file excluded from the run.
#[derive(Debug)]
pub struct RecordFailure {
    pub path: PathBuf,
    pub error: IsmipError,
}

impl RecordFailure {
    pub fn summary(&self) -> FailureSummary {
        FailureSummary {
            path: self.path.clone(),
            kind: self.error.kind().to_string(),
            message: self.error.to_string(),
        }
    }
}

/// What became of one successfully classified file.
#[derive(Debug)]
pub struct ProcessedRecord {
    pub path: PathBuf,
    pub id: RecordId,
    pub method_class: MethodClass,
    /// Present for records of gridded experiments with known models
    pub field: Option<InterpolatedField>,
}

/// Everything a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub files_discovered: usize,
    pub records_per_class: BTreeMap<MethodClass, usize>,
    pub fields: Vec<InterpolatedField>,
    pub failures: Vec<RecordFailure>,
    pub comparisons: Vec<Comparison>,
    pub export: ExportOutcome,
    pub summary_path: PathBuf,
}

/// A configured pipeline, ready to run.
pub struct Pipeline {
    config: Config,
    interpolator: Box<dyn Interpolator>,
    detector: Box<dyn ConventionDetector>,
    grids: BTreeMap<Experiment, Arc<QueryGrid>>,
}

impl Pipeline {
    /// Validate `config` and resolve the interpolation method, the
    /// coordinate convention detector and the query grids.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let interpolator = get_interpolator(&config.processing.interpolation_method)?;
        let detector = get_detector(&config.processing.coordinate_convention)?;
        let k = config.processing.points_per_quarter;
        let grids = Experiment::ALL
            .into_iter()
            .map(|e| (e, Arc::new(QueryGrid::for_experiment(e, k))))
            .collect();

        Ok(Self {
            config,
            interpolator,
            detector,
            grids,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The query grid shared by every record of `experiment`.
    pub fn grid(&self, experiment: Experiment) -> Arc<QueryGrid> {
        self.grids
            .get(&experiment)
            .cloned()
            .unwrap_or_else(|| Arc::new(QueryGrid::empty()))
    }

    /// Classify, load and interpolate one file.
    pub fn process_file(&self, path: &Path) -> std::result::Result<ProcessedRecord, RecordFailure> {
        let fail = |error: IsmipError| RecordFailure {
            path: path.to_path_buf(),
            error,
        };
        let record = load_record(path).map_err(fail)?;
        let grid = self.grid(record.id.experiment);
        let field = interpolate_record(
            &record,
            grid,
            self.interpolator.as_ref(),
            self.detector.as_ref(),
        )
        .map_err(fail)?;

        Ok(ProcessedRecord {
            path: record.path,
            id: record.id,
            method_class: record.method_class,
            field,
        })
    }

    /// Process files, in parallel unless a single worker is configured.
    /// Results keep the order of `files`.
    #[cfg(feature = "parallel")]
    pub fn process_files(
        &self,
        files: &[PathBuf],
    ) -> Result<Vec<std::result::Result<ProcessedRecord, RecordFailure>>> {
        use rayon::prelude::*;

        match self.config.processing.workers {
            Some(1) => Ok(files.iter().map(|p| self.process_file(p)).collect()),
            workers => {
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(n) = workers {
                    builder = builder.num_threads(n);
                }
                let pool = builder.build().map_err(|e| IsmipError::Config {
                    message: format!("Cannot start worker pool: {}", e),
                })?;
                Ok(pool.install(|| files.par_iter().map(|p| self.process_file(p)).collect()))
            }
        }
    }

    /// Process files one after another.
    #[cfg(not(feature = "parallel"))]
    pub fn process_files(
        &self,
        files: &[PathBuf],
    ) -> Result<Vec<std::result::Result<ProcessedRecord, RecordFailure>>> {
        Ok(files.iter().map(|p| self.process_file(p)).collect())
    }

    /// Run the whole pipeline and write tables plus `summary.json`.
    pub fn run(&self) -> Result<RunReport> {
        let run_id = generate_run_id();
        let span = info_span!("run", run_id = %run_id);
        let _guard = span.enter();

        let started_at = Utc::now();
        let start = Instant::now();
        let paths = &self.config.paths;
        log_operation_start(
            "pipeline",
            Some(&format!(
                "data_dir={} method={} k={}",
                paths.data_dir.display(),
                self.interpolator.name(),
                self.config.processing.points_per_quarter
            )),
        );

        let files = log_timed_operation("discover", || {
            discover_files(&paths.data_dir, &paths.extension)
        })?;
        info!(count = files.len(), "Found data files");

        let outcomes = log_timed_operation("load_and_interpolate", || self.process_files(&files))?;

        let mut records_per_class: BTreeMap<MethodClass, usize> = BTreeMap::new();
        let mut fields = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(processed) => {
                    *records_per_class.entry(processed.method_class).or_default() += 1;
                    fields.extend(processed.field);
                }
                Err(failure) => {
                    log_record_failure(&failure.error, &failure.path);
                    failures.push(failure);
                }
            }
        }
        info!(
            interpolated = fields.len(),
            failed = failures.len(),
            "Records processed"
        );

        let comparisons = log_timed_operation("aggregate", || aggregate(&fields));
        let export = export_all(&paths.output_dir, &comparisons)?;

        let finished_at = Utc::now();
        let summary = RunSummary {
            run_id,
            started_at,
            finished_at,
            config: self.config.clone(),
            files_discovered: files.len(),
            records_per_class: records_per_class.clone(),
            records_interpolated: fields.len(),
            failures: failures.iter().map(RecordFailure::summary).collect(),
            exported: export.exported.clone(),
            absent: export.absent.clone(),
        };
        let summary_path = write_summary(&paths.output_dir, &summary)?;

        info!(
            tables = export.exported.len(),
            absent = export.absent.len(),
            summary = %summary_path.display(),
            "Export finished"
        );
        log_operation_end("pipeline", start, failures.is_empty());

        Ok(RunReport {
            run_id,
            started_at,
            finished_at,
            files_discovered: files.len(),
            records_per_class,
            fields,
            failures,
            comparisons,
            export,
            summary_path,
        })
    }
}
