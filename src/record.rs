//! Input records and their fields resampled onto a query grid.

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classify::{higher_order_family, MethodClass, RecordId};
use crate::coordinates::{
    count_outside_unit_square, normalize, ConventionDetector, CoordinateConvention,
};
use crate::error::{IsmipError, Result};
use crate::experiment::SampleTable;
use crate::grid::QueryGrid;
use crate::interpolation::{apply_stencils, Interpolator};

/// One data file: its identity, method class and decoded samples.
///
/// Records of unknown models carry no samples.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub path: PathBuf,
    pub id: RecordId,
    pub method_class: MethodClass,
    pub samples: Option<SampleTable>,
}

impl InputRecord {
    pub fn new(path: PathBuf, id: RecordId, samples: Option<SampleTable>) -> Self {
        let method_class = id.method_class();
        let samples = if method_class.is_known() { samples } else { None };
        Self {
            path,
            id,
            method_class,
            samples,
        }
    }

    /// Number of sample rows (zero for unloaded records).
    pub fn len(&self) -> usize {
        self.samples.as_ref().map_or(0, SampleTable::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for InputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Data file:  {}", self.path.display())?;
        writeln!(f, "Order:      {}", self.method_class)?;
        if let Some(family) = higher_order_family(&self.id.model_code) {
            writeln!(f, "Family:     {}", family)?;
        }
        writeln!(f, "Model:      {}", self.id.model_code)?;
        writeln!(f, "Experiment: {}", self.id.experiment)?;
        write!(f, "Length:     {}", self.id.scenario_code)
    }
}

/// Named scalar fields that can be resampled onto a query grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    VxSurf,
    VySurf,
    VzSurf,
    ZSurf,
    /// Euclidean norm of the surface velocity components
    VNormSurf,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::VxSurf => "vx_surf",
            Field::VySurf => "vy_surf",
            Field::VzSurf => "vz_surf",
            Field::ZSurf => "z_surf",
            Field::VNormSurf => "v_norm_surf",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field on a query grid. `None` marks cells with no value.
pub type GridField = Array2<Option<f64>>;

/// One record's samples resampled onto its experiment's query grid.
#[derive(Debug, Clone)]
pub struct InterpolatedField {
    pub id: RecordId,
    pub method_class: MethodClass,
    pub grid: Arc<QueryGrid>,
    /// Convention the sample positions were read in (experiment F only)
    pub convention: Option<CoordinateConvention>,
    pub fields: BTreeMap<Field, GridField>,
}

impl InterpolatedField {
    pub fn field(&self, field: Field) -> Option<&GridField> {
        self.fields.get(&field)
    }

    /// Column `index` of a field, i.e. the values along y at `axis_x[index]`.
    pub fn column(&self, field: Field, index: usize) -> Option<Vec<Option<f64>>> {
        let values = self.field(field)?;
        (index < values.ncols()).then(|| values.column(index).to_vec())
    }

    /// Row `index` of a field, i.e. the values along x at `axis_y[index]`.
    pub fn row(&self, field: Field, index: usize) -> Option<Vec<Option<f64>>> {
        let values = self.field(field)?;
        (index < values.nrows()).then(|| values.row(index).to_vec())
    }
}

/// Positions and named value columns pulled out of a sample table.
struct Scattered {
    positions: Vec<[f64; 2]>,
    columns: Vec<(Field, Vec<f64>)>,
}

fn scattered(samples: &SampleTable) -> Option<Scattered> {
    let out = match samples {
        SampleTable::A(rows) => Scattered {
            positions: rows.iter().map(|r| [r.x_hat, r.y_hat]).collect(),
            columns: vec![
                (Field::VxSurf, rows.iter().map(|r| r.vx_surf).collect()),
                (Field::VySurf, rows.iter().map(|r| r.vy_surf).collect()),
            ],
        },
        SampleTable::C(rows) => Scattered {
            positions: rows.iter().map(|r| [r.x_hat, r.y_hat]).collect(),
            columns: vec![
                (Field::VxSurf, rows.iter().map(|r| r.vx_surf).collect()),
                (Field::VySurf, rows.iter().map(|r| r.vy_surf).collect()),
                (Field::VzSurf, rows.iter().map(|r| r.vz_surf).collect()),
            ],
        },
        SampleTable::F(rows) => Scattered {
            positions: rows.iter().map(|r| [r.x, r.y]).collect(),
            columns: vec![
                (Field::ZSurf, rows.iter().map(|r| r.z_surf).collect()),
                (Field::VxSurf, rows.iter().map(|r| r.vx).collect()),
                (Field::VySurf, rows.iter().map(|r| r.vy).collect()),
                (Field::VzSurf, rows.iter().map(|r| r.vz).collect()),
            ],
        },
        SampleTable::B(_) | SampleTable::D(_) | SampleTable::E(_) => return None,
    };
    Some(out)
}

/// Pointwise Euclidean norm; `None` wherever any component is undefined.
fn norm(components: &[&GridField], shape: (usize, usize)) -> GridField {
    let mut sum_sq: Array2<Option<f64>> = Array2::from_elem(shape, Some(0.0));
    for component in components {
        Zip::from(&mut sum_sq).and(*component).for_each(|acc, &v| {
            *acc = match (*acc, v) {
                (Some(a), Some(v)) => Some(a + v * v),
                _ => None,
            };
        });
    }
    sum_sq.mapv(|v| v.map(f64::sqrt))
}

/// Resample a record onto `grid`.
///
/// Returns `Ok(None)` for records that are not interpolated: unknown
/// models, experiments without a query grid, and empty grids.
pub fn interpolate_record(
    record: &InputRecord,
    grid: Arc<QueryGrid>,
    interpolator: &dyn Interpolator,
    detector: &dyn ConventionDetector,
) -> Result<Option<InterpolatedField>> {
    let Some(samples) = record.samples.as_ref() else {
        return Ok(None);
    };
    if grid.is_empty() {
        return Ok(None);
    }
    let Some(Scattered {
        mut positions,
        columns,
    }) = scattered(samples)
    else {
        return Ok(None);
    };

    let convention = if matches!(samples, SampleTable::F(_)) {
        let convention = detector.detect(&positions);
        normalize(&mut positions, convention);
        let outside = count_outside_unit_square(&positions);
        if outside > 0 {
            warn!(
                record = %record.id,
                convention = %convention,
                detector = detector.name(),
                outside = outside,
                rows = positions.len(),
                "Sample positions disagree with the detected coordinate convention"
            );
        }
        Some(convention)
    } else {
        None
    };

    let stencils = interpolator
        .stencils(&positions, &grid.points())
        .map_err(|e| match e {
            IsmipError::Interpolation { message } => IsmipError::Interpolation {
                message: format!("{}: {}", record.id, message),
            },
            other => other,
        })?;
    let shape = grid.shape();

    let mut fields = BTreeMap::new();
    for (field, values) in columns {
        let resampled = Array2::from_shape_vec(shape, apply_stencils(&stencils, &values))
            .map_err(|e| IsmipError::Interpolation {
                message: format!("{}: cannot reshape {} onto the grid: {}", record.id, field, e),
            })?;
        fields.insert(field, resampled);
    }

    let components: Vec<&GridField> = [Field::VxSurf, Field::VySurf, Field::VzSurf]
        .iter()
        .filter_map(|f| fields.get(f))
        .collect();
    let v_norm = norm(&components, shape);
    fields.insert(Field::VNormSurf, v_norm);

    debug!(
        record = %record.id,
        method = interpolator.name(),
        defined = stencils.iter().filter(|s| s.is_some()).count(),
        cells = stencils.len(),
        "Interpolated record"
    );

    Ok(Some(InterpolatedField {
        id: record.id.clone(),
        method_class: record.method_class,
        grid,
        convention,
        fields,
    }))
}
