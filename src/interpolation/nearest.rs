//! Nearest neighbor interpolation.
//!
//! This method copies the value of the closest sample. It is defined
//! everywhere, including outside the convex hull of the samples.

use super::common::{dist_sq, is_finite_point, Bounds, BucketGrid, Stencil};
use super::Interpolator;
use crate::error::{IsmipError, Result};

/// Nearest neighbor interpolator
pub struct NearestInterpolator;

impl Interpolator for NearestInterpolator {
    fn stencils(&self, samples: &[[f64; 2]], queries: &[[f64; 2]]) -> Result<Vec<Option<Stencil>>> {
        let bounds = Bounds::from_points(samples.iter()).ok_or_else(|| IsmipError::Interpolation {
            message: "no finite sample positions".to_string(),
        })?;

        let mut grid = BucketGrid::new(bounds, samples.len());
        for (i, &p) in samples.iter().enumerate() {
            if is_finite_point(p) {
                grid.insert_box(i, p, p);
            }
        }

        Ok(queries
            .iter()
            .map(|&q| nearest(&grid, samples, q).map(Stencil::single))
            .collect())
    }

    fn name(&self) -> &str {
        "nearest"
    }
}

/// Search rings of buckets outward from the query's bucket until no
/// unvisited bucket can hold a closer sample.
fn nearest(grid: &BucketGrid, samples: &[[f64; 2]], q: [f64; 2]) -> Option<usize> {
    if !is_finite_point(q) {
        return None;
    }
    let (nx, ny) = grid.dims();
    let (ci, cj) = grid.cell_of(q);
    let cell = grid.cell_size();
    let mut best: Option<(usize, f64)> = None;

    for ring in 0..nx.max(ny) {
        let r = ring as isize;
        for dj in -r..=r {
            for di in -r..=r {
                if di.abs() != r && dj.abs() != r {
                    continue;
                }
                let i = ci as isize + di;
                let j = cj as isize + dj;
                if i < 0 || j < 0 || i >= nx as isize || j >= ny as isize {
                    continue;
                }
                for &s in grid.bucket(i as usize, j as usize) {
                    let d = dist_sq(samples[s], q);
                    if best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((s, d));
                    }
                }
            }
        }
        if let Some((_, bd)) = best {
            let reach = ring as f64 * cell;
            if bd <= reach * reach {
                break;
            }
        }
    }

    best.map(|(s, _)| s)
}
