//! Test data generation utilities.
//!
//! This module writes synthetic ISMIP-HOM result files with known field
//! patterns into a directory, in the whitespace-separated layout the
//! benchmark prescribes.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The four corners of the unit square.
pub const UNIT_SQUARE: [[f64; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Write rows of numbers to `dir/name`, one whitespace-separated line per row.
pub fn write_table(dir: &Path, name: &str, rows: &[Vec<f64>]) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let content: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| format!("{:.10e}", v))
                .collect::<Vec<_>>()
                .join("  ")
        })
        .collect();
    fs::write(&path, content.join("\n") + "\n")?;
    Ok(path)
}

/// Experiment a file with constant surface velocity at `positions`.
pub fn write_experiment_a(
    dir: &Path,
    name: &str,
    positions: &[[f64; 2]],
    vx: f64,
    vy: f64,
) -> io::Result<PathBuf> {
    let rows: Vec<Vec<f64>> = positions
        .iter()
        .map(|p| vec![p[0], p[1], vx, vy, 0.0, 0.0, 0.0])
        .collect();
    write_table(dir, name, &rows)
}

/// Experiment c file whose velocity components are given by `velocity(x, y)`.
pub fn write_experiment_c<F>(dir: &Path, name: &str, n: usize, velocity: F) -> io::Result<PathBuf>
where
    F: Fn(f64, f64) -> [f64; 3],
{
    let mut rows = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let x = i as f64 / (n - 1) as f64;
            let y = j as f64 / (n - 1) as f64;
            let [vx, vy, vz] = velocity(x, y);
            rows.push(vec![x, y, vx, vy, vz, 0.0, 0.0, 0.0, 0.0, 0.0]);
        }
    }
    write_table(dir, name, &rows)
}

/// Experiment f file on an `n x n` lattice covering the domain, either in
/// normalized coordinates or in km from the domain centre.
pub fn write_experiment_f<F>(
    dir: &Path,
    name: &str,
    n: usize,
    physical: bool,
    surface: F,
) -> io::Result<PathBuf>
where
    F: Fn(f64, f64) -> f64,
{
    let mut rows = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let x_hat = i as f64 / (n - 1) as f64;
            let y_hat = j as f64 / (n - 1) as f64;
            let (x, y) = if physical {
                ((x_hat - 0.5) * 100.0, (y_hat - 0.5) * 100.0)
            } else {
                (x_hat, y_hat)
            };
            rows.push(vec![x, y, surface(x_hat, y_hat), 3.0, 4.0, 0.0]);
        }
    }
    write_table(dir, name, &rows)
}

/// Flowline (b, d, e) file with `columns` columns.
pub fn write_flowline(dir: &Path, name: &str, columns: usize, n: usize) -> io::Result<PathBuf> {
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            let mut row = vec![0.0; columns];
            row[0] = i as f64 / (n - 1).max(1) as f64;
            row
        })
        .collect();
    write_table(dir, name, &rows)
}
