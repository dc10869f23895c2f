//! Reading altimetry observations from structured or delimited files.
//!
//! The format is chosen explicitly by the caller; file extensions are never
//! inspected.

use std::path::Path;

use ibe_common::ObservationSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{open, read_f64};

/// Variable names of x, y, t and height in a structured file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableNames {
    pub x: String,
    pub y: String,
    pub t: String,
    pub z: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            x: "lon".to_string(),
            y: "lat".to_string(),
            t: "t_sec".to_string(),
            z: "h_cor".to_string(),
        }
    }
}

/// Zero-based column positions of x, y, t and height in a delimited file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnIndices {
    pub x: usize,
    pub y: usize,
    pub t: usize,
    pub z: usize,
}

impl Default for ColumnIndices {
    fn default() -> Self {
        Self { x: 0, y: 1, t: 2, z: 3 }
    }
}

/// Input file format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    /// NetCDF-4/HDF5 with named variables.
    Structured(VariableNames),
    /// Text columns; `delimiter` of `None` splits on runs of whitespace.
    Delimited {
        columns: ColumnIndices,
        delimiter: Option<u8>,
    },
}

impl InputFormat {
    pub fn is_structured(&self) -> bool {
        matches!(self, InputFormat::Structured(_))
    }

    /// Read x, y, t and, when `with_height`, the height.
    pub fn read(&self, path: &Path, with_height: bool) -> NetCdfResult<ObservationSet> {
        match self {
            InputFormat::Structured(names) => read_structured(path, names, with_height),
            InputFormat::Delimited { columns, delimiter } => {
                read_delimited(path, columns, *delimiter, with_height)
            }
        }
    }
}

/// Read observations from a NetCDF-4/HDF5 file.
///
/// Variables may have any shape; values are flattened row-major and the
/// shape of the x variable is kept on the set.
pub fn read_structured(path: &Path, names: &VariableNames, with_height: bool) -> NetCdfResult<ObservationSet> {
    let file = open(path)?;

    let (x, shape) = read_f64(&file, &names.x)?;
    let (y, _) = read_f64(&file, &names.y)?;
    let (t, _) = read_f64(&file, &names.t)?;
    let z = if with_height {
        Some(read_f64(&file, &names.z)?.0)
    } else {
        None
    };

    debug!(path = %path.display(), points = x.len(), shape = ?shape, "Read structured observations");
    Ok(ObservationSet::with_shape(x, y, t, z, shape)?)
}

/// Read observations from a delimited text file.
///
/// Lines starting with `#` are comments. Extra columns are ignored.
pub fn read_delimited(
    path: &Path,
    columns: &ColumnIndices,
    delimiter: Option<u8>,
    with_height: bool,
) -> NetCdfResult<ObservationSet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter.unwrap_or(b' '))
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let (mut x, mut y, mut t) = (Vec::new(), Vec::new(), Vec::new());
    let mut z = with_height.then(Vec::new);

    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let fields: Vec<&str> = if delimiter.is_some() {
            record.iter().collect()
        } else {
            record
                .iter()
                .flat_map(|f| f.split_whitespace())
                .collect()
        };
        if fields.is_empty() {
            continue;
        }

        let column = |index: usize| -> NetCdfResult<f64> {
            let raw = fields.get(index).ok_or_else(|| {
                NetCdfError::InvalidFormat(format!(
                    "{} line {}: no column {} ({} columns)",
                    path.display(),
                    line,
                    index,
                    fields.len()
                ))
            })?;
            raw.parse::<f64>().map_err(|_| {
                NetCdfError::InvalidFormat(format!(
                    "{} line {}: column {} is not a number: '{}'",
                    path.display(),
                    line,
                    index,
                    raw
                ))
            })
        };

        x.push(column(columns.x)?);
        y.push(column(columns.y)?);
        t.push(column(columns.t)?);
        if let Some(z) = z.as_mut() {
            z.push(column(columns.z)?);
        }
    }

    debug!(path = %path.display(), points = x.len(), "Read delimited observations");
    Ok(ObservationSet::new(x, y, t, z)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use test_utils::scratch_dir;

    #[test]
    fn test_whitespace_columns_and_comments() {
        let dir = scratch_dir();
        let path = dir.path().join("track.txt");
        fs::write(
            &path,
            "# lon lat t h\n10.0  -70.0 3600 1.5\n\n  -20.5\t-75.25   7200   2.0  extra\n",
        )
        .unwrap();

        let obs = read_delimited(&path, &ColumnIndices::default(), None, true).unwrap();
        assert_eq!(obs.x, vec![10.0, -20.5]);
        assert_eq!(obs.y, vec![-70.0, -75.25]);
        assert_eq!(obs.t, vec![3600.0, 7200.0]);
        assert_eq!(obs.z, Some(vec![1.5, 2.0]));
        assert_eq!(obs.shape, vec![2]);
    }

    #[test]
    fn test_custom_columns_and_delimiter() {
        let dir = scratch_dir();
        let path = dir.path().join("track.csv");
        fs::write(&path, "1,100,-70,5\n2,200,-71,6\n").unwrap();

        let columns = ColumnIndices { x: 1, y: 2, t: 3, z: 0 };
        let obs = read_delimited(&path, &columns, Some(b','), false).unwrap();
        assert_eq!(obs.x, vec![100.0, 200.0]);
        assert_eq!(obs.t, vec![5.0, 6.0]);
        assert!(obs.z.is_none());
    }

    #[test]
    fn test_missing_column_is_reported() {
        let dir = scratch_dir();
        let path = dir.path().join("short.txt");
        fs::write(&path, "1 2 3\n").unwrap();

        let err = read_delimited(&path, &ColumnIndices::default(), None, true).unwrap_err();
        assert!(matches!(err, NetCdfError::InvalidFormat(ref m) if m.contains("no column 3")));
    }

    #[test]
    fn test_non_numeric_field() {
        let dir = scratch_dir();
        let path = dir.path().join("bad.txt");
        fs::write(&path, "1 2 abc\n").unwrap();

        let err = read_delimited(&path, &ColumnIndices::default(), None, false).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_format_selection() {
        assert!(InputFormat::Structured(VariableNames::default()).is_structured());
        let delimited = InputFormat::Delimited {
            columns: ColumnIndices::default(),
            delimiter: None,
        };
        assert!(!delimited.is_structured());
    }
}
