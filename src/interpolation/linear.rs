//! Piecewise-linear interpolation over a Delaunay triangulation.
//!
//! Each query point takes the barycentric blend of the three samples at
//! the corners of its enclosing triangle. Points outside the convex hull
//! of the samples have no value.

use super::common::Stencil;
use super::delaunay::{TriangleLocator, Triangulation};
use super::Interpolator;
use crate::error::Result;

/// Triangulation-based linear interpolator
pub struct LinearInterpolator;

impl Interpolator for LinearInterpolator {
    fn stencils(&self, samples: &[[f64; 2]], queries: &[[f64; 2]]) -> Result<Vec<Option<Stencil>>> {
        let triangulation = Triangulation::new(samples)?;
        let locator = TriangleLocator::new(&triangulation);
        let triangles = triangulation.triangles();

        Ok(queries
            .iter()
            .map(|&q| {
                locator.locate(q).map(|(t, weights)| Stencil {
                    vertices: triangles[t],
                    weights,
                })
            })
            .collect())
    }

    fn name(&self) -> &str {
        "linear"
    }
}
