//! NetCDF-4/HDF5 and delimited-text I/O for IBE correction.
//!
//! This crate reads the correction cube and altimetry observation files and
//! writes corrected results:
//!
//! - **Cube loading**: axes eagerly, the `(time, lat, lon)` field lazily or
//!   resident, with an optional time subset materialized once
//! - **Observations**: named variables from NetCDF-4/HDF5 files or columns
//!   from delimited text
//! - **Outputs**: side-car exports and atomic in-place correction
//!
//! # System requirements
//!
//! Links against libnetcdf and libhdf5 (`libhdf5-dev libnetcdf-dev`).
//! HDF5 diagnostic output is silenced on first use.

pub mod cube;
pub mod error;
pub mod native;
pub mod observations;
pub mod writer;

pub use cube::{load_cube, open_cube, CubeFileLayout, LoadMode, NetCdfCubeField};
pub use error::{NetCdfError, NetCdfResult};
pub use native::silence_hdf5_errors;
pub use observations::{read_delimited, read_structured, ColumnIndices, InputFormat, VariableNames};
pub use writer::{
    apply_in_place, check_correctable, export_delimited, export_structured, output_path,
    CorrectionExport, InPlaceCorrection, CORRECTION_VARIABLE, OUTPUT_SUFFIX,
};
