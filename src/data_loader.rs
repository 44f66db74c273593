//! Benchmark data file discovery and loading.
//!
//! This module finds ISMIP-HOM result files under a data directory and
//! reads their whitespace-separated numeric tables into memory, checking
//! each table against the column layout of its experiment.

use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::classify::RecordId;
use crate::error::{IsmipError, Result};
use crate::experiment::{Experiment, SampleTable};
use crate::logging::log_load_stats;
use crate::record::InputRecord;

/// Recursively find data files with the given extension (case-insensitive)
/// below `root`, sorted by path so runs are deterministic.
pub fn discover_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(IsmipError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Data directory not found: {}", root.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!(
        root = %root.display(),
        count = files.len(),
        "Discovered data files"
    );
    Ok(files)
}

/// Read a whitespace-separated numeric table.
///
/// Blank lines and lines starting with `#` are skipped. Every remaining
/// line must hold the same number of parseable floats.
pub fn load_table(path: &Path) -> Result<Array2<f64>> {
    let content = std::fs::read_to_string(path)?;
    parse_table(path, &content)
}

fn parse_table(path: &Path, content: &str) -> Result<Array2<f64>> {
    let load_error = |line: usize, message: String| IsmipError::Load {
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut values = Vec::new();
    let mut ncols: Option<usize> = None;
    let mut nrows = 0;

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let start = values.len();
        for token in trimmed.split_whitespace() {
            let value: f64 = token
                .parse()
                .map_err(|_| load_error(line_no, format!("not a number: {:?}", token)))?;
            values.push(value);
        }

        let width = values.len() - start;
        match ncols {
            None => ncols = Some(width),
            Some(expected) if expected != width => {
                return Err(load_error(
                    line_no,
                    format!("expected {} columns, found {}", expected, width),
                ));
            }
            Some(_) => {}
        }
        nrows += 1;
    }

    let ncols = ncols.ok_or_else(|| load_error(0, "file contains no numeric rows".to_string()))?;
    Array2::from_shape_vec((nrows, ncols), values)
        .map_err(|e| load_error(0, format!("inconsistent table shape: {}", e)))
}

/// Check a table's width against its experiment and decode it.
pub fn decode_table(
    path: &Path,
    experiment: Experiment,
    table: &Array2<f64>,
) -> Result<SampleTable> {
    let expected = experiment.column_count();
    if table.ncols() != expected {
        return Err(IsmipError::Load {
            path: path.to_path_buf(),
            line: 1,
            message: format!(
                "experiment {} expects {} columns ({}), found {}",
                experiment,
                expected,
                experiment.columns().join(", "),
                table.ncols()
            ),
        });
    }
    Ok(SampleTable::decode(experiment, table.view()))
}

/// Identify, classify and (for known models) load one data file.
///
/// Files of unknown models are kept without samples and are never read.
pub fn load_record(path: &Path) -> Result<InputRecord> {
    let id = RecordId::from_path(path)?;
    let method_class = id.method_class();

    if !method_class.is_known() {
        warn!(
            file = %path.display(),
            model = %id.model_code,
            "Model is not in any classification table, skipping its data"
        );
        return Ok(InputRecord::new(path.to_path_buf(), id, None));
    }

    let table = load_table(path)?;
    let samples = decode_table(path, id.experiment, &table)?;

    log_load_stats(
        &path.display().to_string(),
        &id.model_code,
        id.experiment.letter(),
        &id.scenario_code,
        method_class.label(),
        table.nrows(),
        table.ncols(),
    );

    Ok(InputRecord::new(path.to_path_buf(), id, Some(samples)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::MethodClass;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_not_found() {
        let result = load_table(Path::new("/nonexistent/oga1a005.txt"));
        assert!(result.is_err());
        match result.unwrap_err() {
            IsmipError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("Expected IO error, got {}", other),
        }
    }

    #[test]
    fn test_parse_table() {
        let content = "0.0  0.0 1.0e1\n\n# comment\n 0.5 0.25 -3.5\n";
        let table = parse_table(Path::new("t.txt"), content).unwrap();
        assert_eq!(table.shape(), &[2, 3]);
        assert_eq!(table[[0, 2]], 10.0);
        assert_eq!(table[[1, 1]], 0.25);
        assert_eq!(table[[1, 2]], -3.5);
    }

    #[test]
    fn test_parse_table_rejects_ragged_rows() {
        let err = parse_table(Path::new("t.txt"), "1 2 3\n4 5\n").unwrap_err();
        match err {
            IsmipError::Load { line, .. } => assert_eq!(line, 2),
            other => panic!("Expected load error, got {}", other),
        }
    }

    #[test]
    fn test_parse_table_rejects_non_numeric() {
        let err = parse_table(Path::new("t.txt"), "1 2 3\n4 five 6\n").unwrap_err();
        assert!(matches!(err, IsmipError::Load { line: 2, .. }));
        assert!(parse_table(Path::new("t.txt"), "\n# only a comment\n").is_err());
    }

    #[test]
    fn test_decode_table_checks_width() {
        let table = Array2::<f64>::zeros((3, 6));
        assert!(decode_table(Path::new("x.txt"), Experiment::F, &table).is_ok());
        assert!(matches!(
            decode_table(Path::new("x.txt"), Experiment::A, &table),
            Err(IsmipError::Load { .. })
        ));
    }

    #[test]
    fn test_load_record_skips_unknown_models() -> Result<()> {
        let dir = tempdir()?;
        // Unreadable content: an unknown model must never be parsed.
        let path = dir.path().join("zzz1a005.txt");
        fs::write(&path, "not numbers at all")?;

        let record = load_record(&path)?;
        assert_eq!(record.method_class, MethodClass::Unknown);
        assert!(record.samples.is_none());
        Ok(())
    }

    #[test]
    fn test_load_record_known_model() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("OGA1B010.txt");
        fs::write(&path, "0.0 1 2 3 4\n0.5 1 2 3 4\n1.0 1 2 3 4\n")?;

        let record = load_record(&path)?;
        assert_eq!(record.method_class, MethodClass::FullStokes);
        assert_eq!(record.id.experiment, Experiment::B);
        assert_eq!(record.samples.as_ref().map(|s| s.len()), Some(3));
        Ok(())
    }

    #[test]
    fn test_discover_files() -> Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("oga1"))?;
        fs::create_dir_all(dir.path().join("ahu1/nested"))?;
        fs::write(dir.path().join("oga1/oga1a005.txt"), "")?;
        fs::write(dir.path().join("ahu1/nested/ahu1a005.TXT"), "")?;
        fs::write(dir.path().join("ahu1/readme.md"), "")?;

        let files = discover_files(dir.path(), "txt")?;
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some()));

        assert!(discover_files(&dir.path().join("missing"), "txt").is_err());
        Ok(())
    }
}
