//! # ismip-hom
//!
//! Resample and compare ISMIP-HOM benchmark results across ice-sheet models.
//!
//! This library provides the core functionality for classifying benchmark
//! result files by model and experiment, interpolating each model's scattered
//! samples onto a common regular grid, and reducing the resampled fields to
//! mean/min/max envelopes per class of ice-flow approximation.
//!
//! ## Key Features
//!
//! - **Schema-checked loading**: every experiment's columns are decoded into named fields
//! - **Scattered interpolation**: Delaunay-based linear interpolation, or nearest sample
//! - **Cross-model envelopes**: full-Stokes vs. higher-order comparison along fixed slices
//! - **Figure-named exports**: tables named after the benchmark paper's figures
//!
//! ## Architecture
//!
//! - **Classification**: file names map to model, experiment and scenario
//! - **Data Layer**: whitespace-separated tables loaded into `ndarray` arrays
//! - **Processing**: per-file gridding and interpolation, then a reduction across files
//! - **Output**: delimited tables plus a JSON run summary

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod coordinates;
pub mod data_loader;
pub mod error;
pub mod experiment;
pub mod export;
pub mod grid;
pub mod interpolation;
pub mod logging;
pub mod pipeline;
pub mod record;

pub use aggregate::{aggregate, Comparison, Envelope, Quantity};
pub use classify::{classify, MethodClass, RecordId};
pub use config::Config;
pub use coordinates::{ConventionDetector, CoordinateConvention};
pub use error::{IsmipError, Result};
pub use experiment::{Experiment, SampleTable};
pub use grid::QueryGrid;
pub use logging::{
    init_tracing, log_load_stats, log_operation_end, log_operation_start, log_record_failure,
    log_timed_operation,
};
pub use pipeline::{Pipeline, RecordFailure, RunReport};
pub use record::{interpolate_record, Field, InputRecord, InterpolatedField};
