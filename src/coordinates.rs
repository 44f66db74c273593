//! Horizontal coordinate conventions of experiment F submissions.
//!
//! Most models report experiment F positions as normalized `x_hat`/`y_hat`
//! in `[0, 1]`; some report physical positions in km centred on the
//! domain, spanning `[-50, 50]`. Physical positions are mapped back with
//! `hat = coord / 100 + 0.5` before interpolation.
//!
//! Which convention a file uses is not recorded anywhere. The default
//! detector looks at the first sample only: an x below `-1` cannot be a
//! normalized coordinate. Callers that know the convention can bypass the
//! heuristic with [`FixedConvention`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IsmipError, Result};

/// First-sample x below this value marks a physical-frame file.
pub const PHYSICAL_X_THRESHOLD: f64 = -1.0;

/// Physical domain length in km for experiment F.
pub const PHYSICAL_DOMAIN_LENGTH: f64 = 100.0;

/// Slack allowed when checking that normalized points lie in the unit square.
const UNIT_SQUARE_TOLERANCE: f64 = 1e-6;

/// Frame in which a file reports horizontal positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateConvention {
    /// `x_hat`, `y_hat` in `[0, 1]`
    Normalized,
    /// km from the domain centre
    Physical,
}

impl fmt::Display for CoordinateConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateConvention::Normalized => f.write_str("normalized"),
            CoordinateConvention::Physical => f.write_str("physical"),
        }
    }
}

/// Strategy deciding which convention a set of sample positions uses.
pub trait ConventionDetector: Send + Sync {
    fn detect(&self, points: &[[f64; 2]]) -> CoordinateConvention;

    /// Name of this detector, as accepted by [`get_detector`]
    fn name(&self) -> &str;
}

/// Decide from the first sample's x coordinate alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSampleHeuristic;

impl ConventionDetector for FirstSampleHeuristic {
    fn detect(&self, points: &[[f64; 2]]) -> CoordinateConvention {
        match points.first() {
            Some(p) if p[0] < PHYSICAL_X_THRESHOLD => CoordinateConvention::Physical,
            _ => CoordinateConvention::Normalized,
        }
    }

    fn name(&self) -> &str {
        "auto"
    }
}

/// Always report the configured convention.
#[derive(Debug, Clone, Copy)]
pub struct FixedConvention(pub CoordinateConvention);

impl ConventionDetector for FixedConvention {
    fn detect(&self, _points: &[[f64; 2]]) -> CoordinateConvention {
        self.0
    }

    fn name(&self) -> &str {
        match self.0 {
            CoordinateConvention::Normalized => "normalized",
            CoordinateConvention::Physical => "physical",
        }
    }
}

/// Get a detector by configuration name: `auto`, `normalized` or `physical`.
pub fn get_detector(name: &str) -> Result<Box<dyn ConventionDetector>> {
    match name.to_lowercase().as_str() {
        "auto" => Ok(Box::new(FirstSampleHeuristic)),
        "normalized" => Ok(Box::new(FixedConvention(CoordinateConvention::Normalized))),
        "physical" => Ok(Box::new(FixedConvention(CoordinateConvention::Physical))),
        _ => Err(IsmipError::InvalidParameter {
            param: "coordinate_convention".to_string(),
            message: format!("Unknown coordinate convention: {}", name),
        }),
    }
}

/// Map positions into the normalized frame in place.
pub fn normalize(points: &mut [[f64; 2]], convention: CoordinateConvention) {
    if convention == CoordinateConvention::Physical {
        for p in points.iter_mut() {
            p[0] = p[0] / PHYSICAL_DOMAIN_LENGTH + 0.5;
            p[1] = p[1] / PHYSICAL_DOMAIN_LENGTH + 0.5;
        }
    }
}

/// Number of (already normalized) points outside the unit square.
///
/// A non-zero count after [`normalize`] means the first-sample decision
/// did not hold for the whole file.
pub fn count_outside_unit_square(points: &[[f64; 2]]) -> usize {
    let lo = -UNIT_SQUARE_TOLERANCE;
    let hi = 1.0 + UNIT_SQUARE_TOLERANCE;
    points
        .iter()
        .filter(|p| p[0] < lo || p[0] > hi || p[1] < lo || p[1] > hi)
        .count()
}
