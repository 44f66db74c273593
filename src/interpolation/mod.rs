//! Scattered-data interpolation.
//!
//! An interpolator turns a set of sample positions and a set of query
//! positions into one [`Stencil`] per query. Stencils depend only on
//! positions, so the same stencils serve every field of a record.

pub mod common;
pub mod delaunay;
pub mod linear;
pub mod nearest;

pub use common::Stencil;

use crate::error::Result;

/// Trait for interpolation methods
pub trait Interpolator: Send + Sync {
    /// Compute a stencil for each query; `None` where the method has no value.
    fn stencils(&self, samples: &[[f64; 2]], queries: &[[f64; 2]]) -> Result<Vec<Option<Stencil>>>;

    /// Get the name of this interpolation method
    fn name(&self) -> &str;
}

/// Evaluate stencils against one field of sample values.
pub fn apply_stencils(stencils: &[Option<Stencil>], values: &[f64]) -> Vec<Option<f64>> {
    stencils
        .iter()
        .map(|s| s.as_ref().and_then(|s| s.apply(values)))
        .collect()
}

/// Get an interpolator by name
pub fn get_interpolator(name: &str) -> Result<Box<dyn Interpolator>> {
    match name.to_lowercase().as_str() {
        "linear" => Ok(Box::new(linear::LinearInterpolator)),
        "nearest" => Ok(Box::new(nearest::NearestInterpolator)),
        _ => Err(crate::error::IsmipError::InvalidParameter {
            param: "interpolation_method".to_string(),
            message: format!("Unknown interpolation method: {}", name),
        }),
    }
}
