//! ISMIP-HOM experiments and their data-file schemas.
//!
//! Each experiment reports a fixed, positional set of columns. Rows are
//! decoded into one named struct per experiment so downstream code reads
//! `row.vx_surf` rather than `row[2]`.

use ndarray::{ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IsmipError;

/// One of the six ISMIP-HOM benchmark experiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Experiment {
    /// Flow over a bumpy bed
    A,
    /// Flow over a rippled bed (flowline)
    B,
    /// Ice stream flow with variable basal friction
    C,
    /// Ice stream flow (flowline)
    D,
    /// Haut Glacier d'Arolla
    E,
    /// Prognostic surface relaxation
    F,
}

impl Experiment {
    /// All experiments, in benchmark order.
    pub const ALL: [Experiment; 6] = [
        Experiment::A,
        Experiment::B,
        Experiment::C,
        Experiment::D,
        Experiment::E,
        Experiment::F,
    ];

    /// Parse the experiment letter used in data file names (case-insensitive).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'a' => Some(Experiment::A),
            'b' => Some(Experiment::B),
            'c' => Some(Experiment::C),
            'd' => Some(Experiment::D),
            'e' => Some(Experiment::E),
            'f' => Some(Experiment::F),
            _ => None,
        }
    }

    /// The lowercase letter of this experiment.
    pub fn letter(self) -> char {
        match self {
            Experiment::A => 'a',
            Experiment::B => 'b',
            Experiment::C => 'c',
            Experiment::D => 'd',
            Experiment::E => 'e',
            Experiment::F => 'f',
        }
    }

    /// Column names of this experiment's data files, in file order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Experiment::A => ExpASample::COLUMNS,
            Experiment::B => ExpBSample::COLUMNS,
            Experiment::C => ExpCSample::COLUMNS,
            Experiment::D => ExpDSample::COLUMNS,
            Experiment::E => ExpESample::COLUMNS,
            Experiment::F => ExpFSample::COLUMNS,
        }
    }

    /// Number of columns a data file of this experiment must have.
    pub fn column_count(self) -> usize {
        self.columns().len()
    }

    /// Whether results of this experiment are compared along a fixed slice
    /// of a regular query grid.
    pub fn has_query_grid(self) -> bool {
        matches!(self, Experiment::A | Experiment::C | Experiment::F)
    }

    /// Length (a-d) or slip (f) codes the benchmark defines for this experiment.
    pub fn expected_scenarios(self) -> &'static [&'static str] {
        match self {
            Experiment::A | Experiment::B | Experiment::C | Experiment::D => {
                &["005", "010", "020", "040", "080", "160"]
            }
            Experiment::E => &[],
            Experiment::F => &["000", "001"],
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Experiment {
    type Err = IsmipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => {
                Experiment::from_letter(letter).ok_or_else(|| IsmipError::InvalidParameter {
                    param: "experiment".to_string(),
                    message: format!("Unknown experiment: {}", s),
                })
            }
            _ => Err(IsmipError::InvalidParameter {
                param: "experiment".to_string(),
                message: format!("Experiment must be a single letter, got: {}", s),
            }),
        }
    }
}

/// A row type decoded from one line of an experiment's data file.
pub trait SampleRow: Sized {
    /// Column names in file order.
    const COLUMNS: &'static [&'static str];

    /// Decode a row. The caller guarantees `row.len() == COLUMNS.len()`.
    fn from_row(row: ArrayView1<'_, f64>) -> Self;
}

macro_rules! sample_row {
    ($(#[$meta:meta])* $name:ident { $($field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl SampleRow for $name {
            const COLUMNS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn from_row(row: ArrayView1<'_, f64>) -> Self {
                let mut values = row.iter().copied();
                Self {
                    $($field: values.next().unwrap_or(f64::NAN),)+
                }
            }
        }
    };
}

sample_row!(
    /// Experiment A: bumpy bed, full 3-D domain.
    ExpASample { x_hat, y_hat, vx_surf, vy_surf, tau_xz, tau_yz, del_p }
);

sample_row!(
    /// Experiment B: rippled bed flowline.
    ExpBSample { x_hat, vx_surf, vz_surf, tau_xz, del_p }
);

sample_row!(
    /// Experiment C: ice stream with variable basal friction, full 3-D domain.
    ExpCSample { x_hat, y_hat, vx_surf, vy_surf, vz_surf, vx_base, vy_base, tau_xz, tau_yz, del_p }
);

sample_row!(
    /// Experiment D: ice stream flowline.
    ExpDSample { x_hat, vx_surf, vz_surf, vx_base, tau_xz, del_p }
);

sample_row!(
    /// Experiment E: Haut Glacier d'Arolla flowline.
    ExpESample { x_hat, vx_surf, vz_surf, tau_xz, del_p }
);

sample_row!(
    /// Experiment F: steady-state surface. `x`/`y` are normalized or physical
    /// depending on the contributing model.
    ExpFSample { x, y, z_surf, vx, vy, vz }
);

/// The decoded rows of one data file.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleTable {
    A(Vec<ExpASample>),
    B(Vec<ExpBSample>),
    C(Vec<ExpCSample>),
    D(Vec<ExpDSample>),
    E(Vec<ExpESample>),
    F(Vec<ExpFSample>),
}

fn decode<R: SampleRow>(table: ArrayView2<'_, f64>) -> Vec<R> {
    table.axis_iter(Axis(0)).map(R::from_row).collect()
}

impl SampleTable {
    /// Decode a numeric table whose column count has already been checked
    /// against `experiment.column_count()`.
    pub fn decode(experiment: Experiment, table: ArrayView2<'_, f64>) -> Self {
        match experiment {
            Experiment::A => SampleTable::A(decode(table)),
            Experiment::B => SampleTable::B(decode(table)),
            Experiment::C => SampleTable::C(decode(table)),
            Experiment::D => SampleTable::D(decode(table)),
            Experiment::E => SampleTable::E(decode(table)),
            Experiment::F => SampleTable::F(decode(table)),
        }
    }

    pub fn experiment(&self) -> Experiment {
        match self {
            SampleTable::A(_) => Experiment::A,
            SampleTable::B(_) => Experiment::B,
            SampleTable::C(_) => Experiment::C,
            SampleTable::D(_) => Experiment::D,
            SampleTable::E(_) => Experiment::E,
            SampleTable::F(_) => Experiment::F,
        }
    }

    /// Number of sample rows.
    pub fn len(&self) -> usize {
        match self {
            SampleTable::A(rows) => rows.len(),
            SampleTable::B(rows) => rows.len(),
            SampleTable::C(rows) => rows.len(),
            SampleTable::D(rows) => rows.len(),
            SampleTable::E(rows) => rows.len(),
            SampleTable::F(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
