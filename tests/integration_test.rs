//! Integration tests for the ismip-hom pipeline
//!
//! These tests write synthetic result files into a temporary directory,
//! run the whole pipeline over them and check the envelopes and the files
//! it leaves behind.

mod common;

use common::assertions::{
    assert_approx_eq, assert_defined_approx_eq, assert_in_range, assert_slice_approx_eq,
};
use common::test_data::{self, UNIT_SQUARE};
use ismip_hom::{Config, Experiment, MethodClass, Pipeline, Quantity, RunReport};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn test_config(data: &Path, out: &Path) -> Config {
    let mut config = Config::default();
    config.paths.data_dir = data.to_path_buf();
    config.paths.output_dir = out.to_path_buf();
    config
}

fn run(config: Config) -> RunReport {
    Pipeline::new(config)
        .expect("valid configuration")
        .run()
        .expect("pipeline run")
}

fn find<'a>(
    report: &'a RunReport,
    experiment: Experiment,
    scenario: &str,
    quantity: Quantity,
) -> &'a ismip_hom::Comparison {
    report
        .comparisons
        .iter()
        .find(|c| c.experiment == experiment && c.scenario == scenario && c.quantity == quantity)
        .unwrap_or_else(|| panic!("no comparison for {} {} {}", experiment, scenario, quantity))
}

#[test]
fn test_end_to_end_constant_velocity() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    test_data::write_experiment_a(data.path(), "oga1a005.txt", &UNIT_SQUARE, 1.0, 0.0).unwrap();
    test_data::write_experiment_a(data.path(), "ahu1a005.txt", &UNIT_SQUARE, 1.0, 0.0).unwrap();
    test_data::write_experiment_a(data.path(), "zzz1a005.txt", &UNIT_SQUARE, 1.0, 0.0).unwrap();

    let report = run(test_config(data.path(), out.path()));

    assert_eq!(report.files_discovered, 3);
    assert!(report.failures.is_empty());
    assert_eq!(report.records_per_class[&MethodClass::FullStokes], 1);
    assert_eq!(report.records_per_class[&MethodClass::HigherOrder], 1);
    assert_eq!(report.records_per_class[&MethodClass::Unknown], 1);
    assert_eq!(report.fields.len(), 2);
    assert!(report.fields.iter().all(|f| f.id.model_code != "zzz1"));

    let comparison = find(&report, Experiment::A, "005", Quantity::SurfaceVelocity);
    assert_eq!(comparison.axis.len(), 101);
    assert_eq!(comparison.envelopes.len(), 2);
    for class in [MethodClass::FullStokes, MethodClass::HigherOrder] {
        let envelope = comparison.envelope(class).unwrap();
        assert_eq!(envelope.members, 1);
        for i in 0..envelope.len() {
            assert_defined_approx_eq(envelope.mean[i], 1.0, None);
            assert_defined_approx_eq(envelope.min[i], 1.0, None);
            assert_defined_approx_eq(envelope.max[i], 1.0, None);
        }
    }
    assert!(comparison.envelope(MethodClass::Unknown).is_none());

    let table = fs::read_to_string(out.path().join("ExpA_Fig5_005.txt")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 102);
    assert!(lines[0].starts_with("# x_hat,full-stokes min"));
    let cells: Vec<f64> = lines[26].split(',').map(|c| c.parse().unwrap()).collect();
    assert_eq!(cells.len(), 7);
    assert_approx_eq(cells[0], 0.25, None);
    for value in &cells[1..] {
        assert_approx_eq(*value, 1.0, Some(1e-9));
    }
}

#[test]
fn test_summary_is_written() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    test_data::write_experiment_a(data.path(), "oga1a010.txt", &UNIT_SQUARE, 2.0, 0.0).unwrap();
    test_data::write_experiment_a(data.path(), "zzz1a010.txt", &UNIT_SQUARE, 2.0, 0.0).unwrap();

    let report = run(test_config(data.path(), out.path()));
    assert_eq!(report.summary_path, out.path().join("summary.json"));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report.summary_path).unwrap()).unwrap();
    assert_eq!(summary["run_id"], report.run_id.to_string());
    assert_eq!(summary["files_discovered"], 2);
    assert_eq!(summary["records_interpolated"], 1);
    assert_eq!(summary["records_per_class"]["unknown"], 1);
    assert_eq!(summary["config"]["processing"]["interpolation_method"], "linear");
    assert_eq!(summary["exported"].as_array().unwrap().len(), 1);
    assert!(summary["started_at"].as_str().unwrap().contains('T'));
}

#[test]
fn test_experiment_c_norm_envelope() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    // Linear components are reproduced exactly, so the slice norm is known.
    let velocity = |x: f64, y: f64| [10.0 * x, 5.0 + y, 2.0];
    test_data::write_experiment_c(data.path(), "cma1c020.txt", 5, velocity).unwrap();
    test_data::write_experiment_c(data.path(), "fpa1c020.txt", 3, velocity).unwrap();

    let mut config = test_config(data.path(), out.path());
    config.processing.points_per_quarter = 4;
    let report = run(config);

    let comparison = find(&report, Experiment::C, "020", Quantity::SurfaceVelocity);
    assert_eq!(comparison.axis.len(), 17);
    for class in [MethodClass::FullStokes, MethodClass::HigherOrder] {
        let envelope = comparison.envelope(class).unwrap();
        for (i, y) in comparison.axis.iter().enumerate() {
            let [vx, vy, vz] = velocity(0.25, *y);
            let expected = (vx * vx + vy * vy + vz * vz).sqrt();
            assert_defined_approx_eq(envelope.mean[i], expected, Some(1e-8));
        }
    }
    assert!(out.path().join("ExpC_Fig8_020.txt").exists());
}

#[test]
fn test_experiment_f_conventions_agree() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let surface = |x: f64, _y: f64| 1000.0 + 10.0 * x;
    test_data::write_experiment_f(data.path(), "oga1f000.txt", 5, true, surface).unwrap();
    test_data::write_experiment_f(data.path(), "ghg1f000.txt", 5, false, surface).unwrap();

    let mut config = test_config(data.path(), out.path());
    config.processing.points_per_quarter = 5;
    let report = run(config);

    let elevation = find(&report, Experiment::F, "000", Quantity::SurfaceElevation);
    assert_eq!(elevation.axis_name, "y_hat");
    let fs = elevation.envelope(MethodClass::FullStokes).unwrap();
    assert_eq!(fs.members, 2);
    // Both members agree, so the envelope collapses onto the surface.
    let expected: Vec<Option<f64>> =
        elevation.axis.iter().map(|x| Some(surface(*x, 0.5))).collect();
    assert_slice_approx_eq(&fs.min, &expected, Some(1e-6));
    assert_slice_approx_eq(&fs.max, &expected, Some(1e-6));
    assert_slice_approx_eq(&fs.mean, &expected, Some(1e-6));

    let velocity = find(&report, Experiment::F, "000", Quantity::SurfaceVelocity);
    for v in &velocity.envelope(MethodClass::FullStokes).unwrap().mean {
        assert_defined_approx_eq(*v, 5.0, Some(1e-9));
    }

    assert!(out.path().join("ExpF_Fig12_000.txt").exists());
    assert!(out.path().join("ExpF_Fig13_000.txt").exists());
    let table = fs::read_to_string(out.path().join("ExpF_Fig12_000.txt")).unwrap();
    assert!(table.starts_with("# y_hat,"));
    // No higher-order data for f.
    assert!(table.lines().nth(1).unwrap().ends_with("nan,nan,nan"));
}

#[test]
fn test_bad_files_are_isolated() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    test_data::write_experiment_a(data.path(), "oga1a040.txt", &UNIT_SQUARE, 1.0, 1.0).unwrap();
    fs::write(data.path().join("rhi1a040.txt"), "0.0 0.0 abc 0 0 0 0\n").unwrap();
    test_data::write_flowline(data.path(), "oga1b040.txt", 4, 10).unwrap();
    test_data::write_flowline(data.path(), "oga1d040.txt", 6, 10).unwrap();
    fs::write(data.path().join("readme.txt"), "not data\n").unwrap();
    test_data::write_experiment_a(
        data.path(),
        "ahu1a040.txt",
        &[[0.0, 0.0], [0.5, 0.5], [1.0, 1.0]],
        1.0,
        0.0,
    )
    .unwrap();

    let report = run(test_config(data.path(), out.path()));

    let mut failed: Vec<String> = report
        .failures
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    failed.sort();
    assert_eq!(
        failed,
        vec!["ahu1a040.txt", "oga1b040.txt", "readme.txt", "rhi1a040.txt"]
    );
    let kinds: Vec<&str> = report.failures.iter().map(|f| f.error.kind()).collect();
    assert!(kinds.contains(&"parse"));
    assert!(kinds.contains(&"load"));
    assert!(kinds.contains(&"interpolation"));

    // The flowline d file loads but is never gridded.
    assert_eq!(report.records_per_class[&MethodClass::FullStokes], 2);
    assert_eq!(report.fields.len(), 1);

    let comparison = find(&report, Experiment::A, "040", Quantity::SurfaceVelocity);
    let fs = comparison.envelope(MethodClass::FullStokes).unwrap();
    assert_defined_approx_eq(fs.mean[0], 2f64.sqrt(), None);
    assert!(comparison.envelope(MethodClass::HigherOrder).is_none());
}

#[test]
fn test_sia_only_group_is_absent() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    test_data::write_experiment_a(data.path(), "oso1a080.txt", &UNIT_SQUARE, 1.0, 0.0).unwrap();

    let report = run(test_config(data.path(), out.path()));

    let comparison = find(&report, Experiment::A, "080", Quantity::SurfaceVelocity);
    assert!(comparison.envelope(MethodClass::Sia).is_some());
    assert!(report.export.exported.is_empty());
    assert!(report
        .export
        .absent
        .iter()
        .any(|g| g.experiment == Experiment::A && g.scenario == "080"));
    assert!(!out.path().join("ExpA_Fig5_080.txt").exists());
}

#[test]
fn test_nearest_method_fills_outside_hull() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    // Samples only cover the left half of the domain.
    let left_half = [[0.0, 0.0], [0.5, 0.0], [0.5, 1.0], [0.0, 1.0]];
    test_data::write_experiment_a(data.path(), "oga1a160.txt", &left_half, 3.0, 4.0).unwrap();

    let mut config = test_config(data.path(), out.path());
    config.processing.points_per_quarter = 2;

    let linear = run(config.clone());
    let field = &linear.fields[0];
    let v_norm = field.field(ismip_hom::Field::VNormSurf).unwrap();
    assert_eq!(v_norm[[0, 8]], None);

    config.processing.interpolation_method = "nearest".to_string();
    config.processing.workers = Some(2);
    let nearest = run(config);
    let v_norm = nearest.fields[0].field(ismip_hom::Field::VNormSurf).unwrap();
    for v in v_norm.iter() {
        assert_in_range(v.unwrap(), 5.0 - 1e-12, 5.0 + 1e-12);
    }
}
