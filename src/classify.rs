//! Data file identification and model classification.
//!
//! ISMIP-HOM result files are named `MMMMELLL.txt`: a four character
//! model code, the experiment letter and a scenario code (the domain
//! length in km for experiments a-d, the bed type for e and the slip
//! ratio for f). The model code is looked up in static membership tables
//! to find the class of ice-flow approximation the model solves.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::error::{IsmipError, Result};
use crate::experiment::Experiment;

/// Full-Stokes models.
pub const FULL_STOKES: &[&str] = &[
    "aas2", "cma1", "fpa2", "ghg1", "jvj1", "mmr1", "oga1", "rhi1", "rhi3", "spr1", "ssu1",
    "yko1",
];

/// Higher-order models using the LMLA approximation.
pub const LMLA: &[&str] = &[
    "ahu1", "ahu2", "bds1", "cma2", "fpa1", "fsa1", "mbr1", "rhi2", "tpa1",
];

/// Higher-order models using the L1L2 approximation.
pub const L1L2: &[&str] = &["dpo1", "rhi4"];

/// Higher-order models using the L1L1 approximation.
pub const L1L1: &[&str] = &["lpe1", "rhi5"];

/// Higher-order models using the LTSML approximation.
pub const LTSML: &[&str] = &["mtk1"];

/// Shallow-ice models.
pub const SIA: &[&str] = &["oso1"];

// `aas1` is deliberately absent: its files do not conform to the data standard.

/// Class of numerical approximation a model solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodClass {
    FullStokes,
    HigherOrder,
    Sia,
    Unknown,
}

impl MethodClass {
    /// Label used in exported column headers and logs.
    pub fn label(self) -> &'static str {
        match self {
            MethodClass::FullStokes => "full-stokes",
            MethodClass::HigherOrder => "higher-order",
            MethodClass::Sia => "sia",
            MethodClass::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != MethodClass::Unknown
    }
}

impl fmt::Display for MethodClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named family within the higher-order class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HigherOrderFamily {
    Lmla,
    L1l2,
    L1l1,
    Ltsml,
}

impl HigherOrderFamily {
    pub fn label(self) -> &'static str {
        match self {
            HigherOrderFamily::Lmla => "LMLA",
            HigherOrderFamily::L1l2 => "L1L2",
            HigherOrderFamily::L1l1 => "L1L1",
            HigherOrderFamily::Ltsml => "LTSML",
        }
    }
}

impl fmt::Display for HigherOrderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static CLASS_TABLE: Lazy<HashMap<&'static str, (MethodClass, Option<HigherOrderFamily>)>> =
    Lazy::new(|| {
        let mut table = HashMap::new();
        for code in FULL_STOKES {
            table.insert(*code, (MethodClass::FullStokes, None));
        }
        let families = [
            (LMLA, HigherOrderFamily::Lmla),
            (L1L2, HigherOrderFamily::L1l2),
            (L1L1, HigherOrderFamily::L1l1),
            (LTSML, HigherOrderFamily::Ltsml),
        ];
        for (codes, family) in families {
            for code in codes {
                table.insert(*code, (MethodClass::HigherOrder, Some(family)));
            }
        }
        for code in SIA {
            table.insert(*code, (MethodClass::Sia, None));
        }
        table
    });

/// Classify a (lowercase) model code. Codes in no table are `Unknown`.
pub fn classify(model_code: &str) -> MethodClass {
    CLASS_TABLE
        .get(model_code)
        .map(|(class, _)| *class)
        .unwrap_or(MethodClass::Unknown)
}

/// Higher-order family of a model code, if it is a higher-order model.
pub fn higher_order_family(model_code: &str) -> Option<HigherOrderFamily> {
    CLASS_TABLE.get(model_code).and_then(|(_, family)| *family)
}

/// Identity of a data file parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    pub model_code: String,
    pub experiment: Experiment,
    pub scenario_code: String,
}

impl RecordId {
    /// Parse a data file path. The base name without extension is
    /// lowercased and sliced as `[0:4]` model, `[4]` experiment, `[5:]`
    /// scenario.
    pub fn from_path(path: &Path) -> Result<Self> {
        let parse_error = |message: String| IsmipError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| parse_error("file name is not valid UTF-8".to_string()))?
            .to_lowercase();

        if !stem.is_ascii() {
            return Err(parse_error(format!("non-ASCII characters in {:?}", stem)));
        }
        if stem.len() < 8 {
            return Err(parse_error(format!(
                "expected at least 8 characters (MMMMELLL), found {}",
                stem.len()
            )));
        }

        let model_code = stem[0..4].to_string();
        let letter = stem.as_bytes()[4] as char;
        let experiment = Experiment::from_letter(letter)
            .ok_or_else(|| parse_error(format!("unknown experiment letter '{}'", letter)))?;
        let scenario_code = stem[5..].to_string();

        Ok(Self {
            model_code,
            experiment,
            scenario_code,
        })
    }

    /// Method class of this record's model.
    pub fn method_class(&self) -> MethodClass {
        classify(&self.model_code)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.model_code, self.experiment, self.scenario_code
        )
    }
}
