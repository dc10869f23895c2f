//! NetCDF-4 fixture files for loader and applier tests.
//!
//! Requires libnetcdf/libhdf5 at test time, like the crates under test.

use std::path::Path;

use ndarray::Array3;

/// Default CF units of a cube time axis.
pub const CUBE_TIME_UNITS: &str = "hours since 1900-01-01 00:00:0.0";

/// Write a correction cube with the default `lon/lat/time/ibe` layout.
///
/// `time_units` of `None` leaves the `units` attribute off.
pub fn write_cube_file(
    path: &Path,
    t: &[f64],
    lat: &[f64],
    lon: &[f64],
    values: &Array3<f32>,
    time_units: Option<&str>,
) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("time", t.len())?;
    file.add_dimension("lat", lat.len())?;
    file.add_dimension("lon", lon.len())?;

    {
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        if let Some(units) = time_units {
            var.put_attribute("units", units)?;
        }
        var.put_values(t, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lat", &["lat"])?;
        var.put_attribute("units", "degrees_north")?;
        var.put_values(lat, ..)?;
    }
    {
        let mut var = file.add_variable::<f64>("lon", &["lon"])?;
        var.put_attribute("units", "degrees_east")?;
        var.put_values(lon, ..)?;
    }
    {
        let flat: Vec<f32> = values.iter().copied().collect();
        let mut var = file.add_variable::<f32>("ibe", &["time", "lat", "lon"])?;
        var.put_attribute("units", "m")?;
        var.put_values(flat.as_slice(), ..)?;
    }
    Ok(())
}

/// Write 1-D `f64` variables sharing one dimension `n`.
pub fn write_track_file(path: &Path, vars: &[(&str, Vec<f64>)]) -> Result<(), netcdf::Error> {
    let n = vars.first().map(|(_, v)| v.len()).unwrap_or(0);
    let mut file = netcdf::create(path)?;
    file.add_dimension("n", n)?;
    for (name, values) in vars {
        let mut var = file.add_variable::<f64>(name, &["n"])?;
        var.put_values(values.as_slice(), ..)?;
    }
    Ok(())
}

/// Read a whole `f64` variable, panicking if it is absent.
pub fn read_variable(path: &Path, name: &str) -> Vec<f64> {
    let file = netcdf::open(path).expect("failed to open fixture");
    let var = file
        .variable(name)
        .unwrap_or_else(|| panic!("variable '{}' missing", name));
    var.get_values::<f64, _>(..).expect("failed to read variable")
}

/// Whether the file has a variable called `name`.
pub fn has_variable(path: &Path, name: &str) -> bool {
    netcdf::open(path)
        .map(|file| file.variable(name).is_some())
        .unwrap_or(false)
}
