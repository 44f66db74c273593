//! Regular query grids in normalized (`x_hat`, `y_hat`) coordinates.
//!
//! Experiments A and C are compared along the `1/4` line and experiment F
//! along the `1/2` line, so each axis holds `4k + 1` points: index `k`
//! then sits exactly on `1/4` and index `2k` exactly on `1/2`.

use ndarray::{Array1, Array2};

use crate::experiment::Experiment;

/// Subdivisions per quarter of the unit interval used by default.
pub const DEFAULT_POINTS_PER_QUARTER: usize = 25;

/// The evaluation grid shared by every record of one experiment.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryGrid {
    /// `k`, the number of intervals per quarter of each axis
    pub points_per_quarter: usize,
    /// Normalized x coordinates
    pub axis_x: Array1<f64>,
    /// Normalized y coordinates
    pub axis_y: Array1<f64>,
    /// `grid_x[[i, j]] == axis_x[j]`
    pub grid_x: Array2<f64>,
    /// `grid_y[[i, j]] == axis_y[i]`
    pub grid_y: Array2<f64>,
}

fn unit_axis(n: usize) -> Array1<f64> {
    // i / (n - 1) rather than i * step keeps 1/4, 1/2 and 1 exact.
    let last = (n - 1) as f64;
    Array1::from_shape_fn(n, |i| i as f64 / last)
}

impl QueryGrid {
    /// Build the query grid for an experiment. Experiments without a
    /// slice convention (b, d, e) get an empty grid.
    pub fn for_experiment(experiment: Experiment, points_per_quarter: usize) -> Self {
        if experiment.has_query_grid() && points_per_quarter > 0 {
            Self::regular(points_per_quarter)
        } else {
            Self::empty()
        }
    }

    /// A `(4k + 1) x (4k + 1)` grid over the unit square.
    pub fn regular(points_per_quarter: usize) -> Self {
        let n = 4 * points_per_quarter + 1;
        let axis_x = unit_axis(n);
        let axis_y = unit_axis(n);
        let grid_x = Array2::from_shape_fn((n, n), |(_, j)| axis_x[j]);
        let grid_y = Array2::from_shape_fn((n, n), |(i, _)| axis_y[i]);

        Self {
            points_per_quarter,
            axis_x,
            axis_y,
            grid_x,
            grid_y,
        }
    }

    /// A grid with no points.
    pub fn empty() -> Self {
        Self {
            points_per_quarter: 0,
            axis_x: Array1::zeros(0),
            axis_y: Array1::zeros(0),
            grid_x: Array2::zeros((0, 0)),
            grid_y: Array2::zeros((0, 0)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grid_x.is_empty()
    }

    /// `(rows, columns)`, i.e. `(len(axis_y), len(axis_x))`.
    pub fn shape(&self) -> (usize, usize) {
        self.grid_x.dim()
    }

    /// Index of the `1/4` line on either axis.
    pub fn quarter_index(&self) -> usize {
        self.points_per_quarter
    }

    /// Index of the `1/2` line on either axis.
    pub fn half_index(&self) -> usize {
        2 * self.points_per_quarter
    }

    /// Query points in row-major order, matching `Array2::from_shape_vec(self.shape(), ..)`.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.grid_x
            .iter()
            .zip(self.grid_y.iter())
            .map(|(&x, &y)| [x, y])
            .collect()
    }
}
