//! Cross-model envelopes along the comparison slices.
//!
//! Interpolated records are grouped by experiment, scenario and method
//! class. Each group is reduced to a pointwise mean/min/max along the
//! slice its experiment is compared on: the column at `x_hat = 1/4` of
//! the surface velocity norm for experiments A and C, and the row at
//! `y_hat = 1/2` of the surface elevation and velocity norm for F.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::classify::MethodClass;
use crate::experiment::Experiment;
use crate::record::{Field, InterpolatedField};

/// Pointwise statistics of a group of slices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub mean: Vec<Option<f64>>,
    pub min: Vec<Option<f64>>,
    pub max: Vec<Option<f64>>,
    /// Number of contributing records
    pub members: usize,
}

impl Envelope {
    /// Reduce slices pointwise, skipping undefined values.
    ///
    /// Returns `None` for an empty group. A point where every member is
    /// undefined stays undefined.
    pub fn from_slices(slices: &[Vec<Option<f64>>]) -> Option<Self> {
        if slices.is_empty() {
            return None;
        }
        let len = slices.iter().map(Vec::len).max().unwrap_or(0);
        let mut mean = Vec::with_capacity(len);
        let mut min = Vec::with_capacity(len);
        let mut max = Vec::with_capacity(len);

        for i in 0..len {
            let mut count = 0usize;
            let mut sum = 0.0;
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for v in slices.iter().filter_map(|s| s.get(i).copied().flatten()) {
                count += 1;
                sum += v;
                lo = lo.min(v);
                hi = hi.max(v);
            }
            if count == 0 {
                mean.push(None);
                min.push(None);
                max.push(None);
            } else {
                // min <= mean <= max must survive rounding in the sum.
                mean.push(Some((sum / count as f64).clamp(lo, hi)));
                min.push(Some(lo));
                max.push(Some(hi));
            }
        }

        Some(Self {
            mean,
            min,
            max,
            members: slices.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// The physical quantity a comparison is made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    SurfaceVelocity,
    SurfaceElevation,
}

impl Quantity {
    /// The grid field this quantity is read from.
    pub fn field(self) -> Field {
        match self {
            Quantity::SurfaceVelocity => Field::VNormSurf,
            Quantity::SurfaceElevation => Field::ZSurf,
        }
    }

    /// Quantities compared for an experiment.
    pub fn for_experiment(experiment: Experiment) -> &'static [Quantity] {
        match experiment {
            Experiment::A | Experiment::C => &[Quantity::SurfaceVelocity],
            Experiment::F => &[Quantity::SurfaceElevation, Quantity::SurfaceVelocity],
            Experiment::B | Experiment::D | Experiment::E => &[],
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::SurfaceVelocity => f.write_str("surface_velocity"),
            Quantity::SurfaceElevation => f.write_str("surface_elevation"),
        }
    }
}

/// Name of the coordinate a slice runs along.
pub fn slice_axis_name(experiment: Experiment) -> &'static str {
    match experiment {
        Experiment::F => "y_hat",
        _ => "x_hat",
    }
}

/// Values of `field` along its experiment's comparison slice, with the
/// coordinates of the slice.
pub fn comparison_slice(
    field: &InterpolatedField,
    quantity: Quantity,
) -> Option<(Vec<f64>, Vec<Option<f64>>)> {
    let grid = &field.grid;
    match field.id.experiment {
        Experiment::A | Experiment::C => {
            let values = field.column(quantity.field(), grid.quarter_index())?;
            Some((grid.axis_y.to_vec(), values))
        }
        Experiment::F => {
            let values = field.row(quantity.field(), grid.half_index())?;
            Some((grid.axis_x.to_vec(), values))
        }
        Experiment::B | Experiment::D | Experiment::E => None,
    }
}

/// Envelopes of every method class for one (experiment, scenario, quantity).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub experiment: Experiment,
    pub scenario: String,
    pub quantity: Quantity,
    pub axis_name: &'static str,
    pub axis: Vec<f64>,
    pub envelopes: BTreeMap<MethodClass, Envelope>,
}

impl Comparison {
    pub fn envelope(&self, class: MethodClass) -> Option<&Envelope> {
        self.envelopes.get(&class)
    }
}

/// Group interpolated records and reduce each group along its slice.
///
/// Comparisons come out ordered by experiment, scenario and quantity.
/// Records of unknown models never contribute.
pub fn aggregate(fields: &[InterpolatedField]) -> Vec<Comparison> {
    let mut groups: BTreeMap<(Experiment, &str), BTreeMap<MethodClass, Vec<&InterpolatedField>>> =
        BTreeMap::new();
    for field in fields.iter().filter(|f| f.method_class.is_known()) {
        groups
            .entry((field.id.experiment, field.id.scenario_code.as_str()))
            .or_default()
            .entry(field.method_class)
            .or_default()
            .push(field);
    }

    let mut comparisons = Vec::new();
    for ((experiment, scenario), classes) in groups {
        for &quantity in Quantity::for_experiment(experiment) {
            let mut axis: Option<Vec<f64>> = None;
            let mut envelopes = BTreeMap::new();
            for (class, members) in &classes {
                let mut slices = Vec::with_capacity(members.len());
                for member in members {
                    if let Some((member_axis, values)) = comparison_slice(member, quantity) {
                        axis.get_or_insert(member_axis);
                        slices.push(values);
                    }
                }
                if let Some(envelope) = Envelope::from_slices(&slices) {
                    debug!(
                        experiment = %experiment,
                        scenario = scenario,
                        quantity = %quantity,
                        class = %class,
                        members = envelope.members,
                        "Aggregated group"
                    );
                    envelopes.insert(*class, envelope);
                }
            }
            if let Some(axis) = axis {
                comparisons.push(Comparison {
                    experiment,
                    scenario: scenario.to_string(),
                    quantity,
                    axis_name: slice_axis_name(experiment),
                    axis,
                    envelopes,
                });
            }
        }
    }
    comparisons
}
