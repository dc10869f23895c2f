//! Writing corrections: side-car export files and in-place application.
//!
//! Every writer stages its output in a temporary file in the destination
//! directory and persists it without clobbering, so a failed run never
//! leaves a half-written result or replaces an existing file.

use std::path::{Path, PathBuf};

use ibe_common::IbeError;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{NetCdfError, NetCdfResult};
use crate::native::{dimension_names, open, require_variable, silence_hdf5_errors};

/// Name of the stored correction variable.
pub const CORRECTION_VARIABLE: &str = "h_ibe";

/// Suffix appended to the input stem for outputs.
pub const OUTPUT_SUFFIX: &str = "_IBE";

/// Output path for `input`: `<stem>_IBE.<ext>`.
///
/// Structured files keep their extension (`h5` when there is none);
/// delimited exports always get `txt`.
pub fn output_path(input: &Path, structured: bool) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = if structured {
        input
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "h5".to_string())
    } else {
        "txt".to_string()
    };
    input.with_file_name(format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext))
}

/// Coordinates, original times and corrections for an export file.
#[derive(Debug, Clone, Copy)]
pub struct CorrectionExport<'a> {
    /// Variable names for x, y and t in structured exports
    pub names: [&'a str; 3],
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub t: &'a [f64],
    pub correction: &'a [f64],
    /// Logical shape of the values
    pub shape: &'a [usize],
}

impl CorrectionExport<'_> {
    fn check_lengths(&self) -> NetCdfResult<()> {
        let n = self.x.len();
        for (context, len) in [("y", self.y.len()), ("t", self.t.len()), ("correction", self.correction.len())] {
            if len != n {
                return Err(IbeError::length_mismatch(context, n, len).into());
            }
        }
        let expected: usize = self.shape.iter().product();
        if expected != n {
            return Err(IbeError::length_mismatch("shape", expected, n).into());
        }
        Ok(())
    }
}

fn ensure_absent(path: &Path) -> NetCdfResult<()> {
    if path.exists() {
        return Err(NetCdfError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// A temporary file next to `target`.
fn stage_next_to(target: &Path) -> NetCdfResult<NamedTempFile> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(tempfile::Builder::new()
        .prefix(".ibe-")
        .suffix(".tmp")
        .tempfile_in(dir)?)
}

fn persist(staged: NamedTempFile, target: &Path) -> NetCdfResult<()> {
    staged.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            NetCdfError::OutputExists(target.to_path_buf())
        } else {
            NetCdfError::IoError(e.error)
        }
    })?;
    Ok(())
}

/// Write x, y, t and `h_ibe` to a new NetCDF-4 file.
pub fn export_structured(path: &Path, export: &CorrectionExport<'_>) -> NetCdfResult<()> {
    export.check_lengths()?;
    ensure_absent(path)?;
    silence_hdf5_errors();

    let staged = stage_next_to(path)?;
    {
        let mut file = netcdf::create(staged.path())?;
        let dims: Vec<String> = (0..export.shape.len()).map(|i| format!("dim_{}", i)).collect();
        for (name, &len) in dims.iter().zip(export.shape) {
            file.add_dimension(name, len)?;
        }
        let dims: Vec<&str> = dims.iter().map(String::as_str).collect();

        let [xname, yname, tname] = export.names;
        for (name, values) in [
            (xname, export.x),
            (yname, export.y),
            (tname, export.t),
            (CORRECTION_VARIABLE, export.correction),
        ] {
            let mut var = file.add_variable::<f64>(name, &dims)?;
            var.put_values(values, ..)?;
        }
        if let Some(mut var) = file.variable_mut(CORRECTION_VARIABLE) {
            var.put_attribute("units", "m")?;
            var.put_attribute("long_name", "inverse barometer correction")?;
        }
    }
    persist(staged, path)?;

    info!(path = %path.display(), points = export.x.len(), "Wrote structured export");
    Ok(())
}

/// Write `x y t h_ibe` rows to a new space-delimited text file, `%.6f`.
pub fn export_delimited(path: &Path, export: &CorrectionExport<'_>) -> NetCdfResult<()> {
    export.check_lengths()?;
    ensure_absent(path)?;

    let staged = stage_next_to(path)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(staged.as_file());

        for n in 0..export.x.len() {
            writer.write_record([
                format!("{:.6}", export.x[n]),
                format!("{:.6}", export.y[n]),
                format!("{:.6}", export.t[n]),
                format!("{:.6}", export.correction[n]),
            ])?;
        }
        writer.flush()?;
    }
    staged.as_file().sync_all()?;
    persist(staged, path)?;

    info!(path = %path.display(), points = export.x.len(), "Wrote delimited export");
    Ok(())
}

/// Subtract-and-store result for one structured file.
#[derive(Debug, Clone, Copy)]
pub struct InPlaceCorrection<'a> {
    /// Height variable to overwrite
    pub height_variable: &'a str,
    /// Heights after correction
    pub corrected: &'a [f64],
    /// The correction, stored verbatim as `h_ibe`
    pub correction: &'a [f64],
}

/// Refuse inputs that cannot be corrected in place.
///
/// The height variable must exist and the file must not already carry
/// `h_ibe`.
pub fn check_correctable(input: &Path, height_variable: &str) -> NetCdfResult<()> {
    let file = open(input)?;
    if file.variable(CORRECTION_VARIABLE).is_some() {
        return Err(NetCdfError::AlreadyCorrected(input.to_path_buf()));
    }
    require_variable(&file, height_variable)?;
    Ok(())
}

/// Write corrected heights and `h_ibe` into a copy of `input`, move the copy
/// to `output` and remove `input`.
///
/// Until the copy is persisted the source is untouched; afterwards the
/// output holds every field. A crash in between leaves the original.
pub fn apply_in_place(input: &Path, output: &Path, update: &InPlaceCorrection<'_>) -> NetCdfResult<()> {
    if update.corrected.len() != update.correction.len() {
        return Err(IbeError::length_mismatch(
            "correction",
            update.corrected.len(),
            update.correction.len(),
        )
        .into());
    }
    ensure_absent(output)?;
    check_correctable(input, update.height_variable)?;

    let staged = stage_next_to(output)?;
    std::fs::copy(input, staged.path())?;
    debug!(staging = %staged.path().display(), "Staged copy of input");

    {
        let mut file = netcdf::append(staged.path())?;

        let dims = {
            let var = require_variable(&file, update.height_variable)?;
            if var.len() != update.corrected.len() {
                return Err(IbeError::length_mismatch(
                    update.height_variable,
                    var.len(),
                    update.corrected.len(),
                )
                .into());
            }
            dimension_names(&var)
        };

        file.variable_mut(update.height_variable)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", update.height_variable)))?
            .put_values(update.corrected, ..)?;

        let dims: Vec<&str> = dims.iter().map(String::as_str).collect();
        let mut var = file.add_variable::<f64>(CORRECTION_VARIABLE, &dims)?;
        var.put_values(update.correction, ..)?;
        var.put_attribute("units", "m")?;
        var.put_attribute("long_name", "inverse barometer correction")?;
    }

    persist(staged, output)?;
    std::fs::remove_file(input)?;

    info!(input = %input.display(), output = %output.display(), "Applied correction in place");
    Ok(())
}
