//! Thin helpers over the native netcdf library.

use std::sync::Once;

use crate::error::{NetCdfError, NetCdfResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist). This creates confusing log spam like:
///
/// ```text
/// HDF5-DIAG: Error detected in HDF5 (1.10.8) thread 3:
///   #003: ../../../src/H5Adense.c line 397 in H5A__dense_open(): can't locate attribute in name index
/// ```
///
/// Only needs to run once per process; later calls are no-ops. Call it before
/// the first file is opened.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
pub(crate) fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get a string attribute.
pub(crate) fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Dimension lengths of a variable.
pub(crate) fn variable_shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// Dimension names of a variable.
pub(crate) fn dimension_names(var: &netcdf::Variable) -> Vec<String> {
    var.dimensions().iter().map(|d| d.name()).collect()
}

/// Look up a variable or fail with its name.
pub(crate) fn require_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
) -> NetCdfResult<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))
}

/// Read a whole variable as `f64` together with its shape.
pub(crate) fn read_f64(file: &netcdf::File, name: &str) -> NetCdfResult<(Vec<f64>, Vec<usize>)> {
    let var = require_variable(file, name)?;
    let values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;
    Ok((values, variable_shape(&var)))
}

/// Open a file read-only, naming it in the error.
pub(crate) fn open(path: &std::path::Path) -> NetCdfResult<netcdf::File> {
    silence_hdf5_errors();
    netcdf::open(path).map_err(|e| {
        NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
    })
}
