//! Integration tests against real NetCDF-4 files in scratch directories.
//!
//! Requires libnetcdf/libhdf5.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use cube_sampler::{CubeSubset, TimeWindow};
use ibe_common::{Epoch, IbeError};
use netcdf_io::{
    apply_in_place, export_delimited, export_structured, load_cube, open_cube, output_path,
    read_structured, CorrectionExport, CubeFileLayout, InPlaceCorrection, LoadMode, NetCdfError,
    VariableNames, CORRECTION_VARIABLE,
};
use test_utils::{
    assert_slice_approx_eq, create_index_cube, has_variable, read_variable, scratch_dir,
    three_hourly_axis, write_cube_file, write_track_file, CUBE_TIME_UNITS,
};

fn write_index_cube(path: &Path, units: Option<&str>) {
    write_cube_file(
        path,
        &three_hourly_axis(0.0, 6),
        &[-60.0, -70.0, -80.0],
        &[0.0, 90.0, 180.0, 270.0],
        &create_index_cube(6, 3, 4),
        units,
    )
    .unwrap();
}

#[test]
fn test_lazy_and_resident_cubes_agree() {
    let dir = scratch_dir();
    let path = dir.path().join("cube.h5");
    write_index_cube(&path, Some(CUBE_TIME_UNITS));

    let layout = CubeFileLayout::default();
    let lazy = open_cube(&path, &layout, LoadMode::Lazy).unwrap();
    let resident = open_cube(&path, &layout, LoadMode::Resident).unwrap();
    assert!(!lazy.is_resident());
    assert!(resident.is_resident());
    assert_eq!(lazy.time_epoch(), &Epoch::era_interim());

    let t = [1.5, 7.0, 15.0];
    let lat = [-65.0, -80.0, -60.0];
    let lon = [45.0, 180.0, 0.0];
    let a = lazy.sample_points(&t, &lat, &lon).unwrap();
    let b = resident.sample_points(&t, &lat, &lon).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[2], 50000.0);
}

#[test]
fn test_cube_longitudes_are_wrapped_at_load() {
    let dir = scratch_dir();
    let path = dir.path().join("cube.h5");
    write_index_cube(&path, Some(CUBE_TIME_UNITS));

    let cube = open_cube(&path, &CubeFileLayout::default(), LoadMode::Lazy).unwrap();
    assert_eq!(cube.x_axis(), &[0.0, 90.0, 180.0, -90.0]);
}

#[test]
fn test_time_units_rescaled_to_hours() {
    let dir = scratch_dir();
    let path = dir.path().join("days.h5");
    write_cube_file(
        &path,
        &[0.0, 0.125, 0.25],
        &[-60.0, -70.0],
        &[0.0, 10.0],
        &create_index_cube(3, 2, 2),
        Some("days since 1990-01-01"),
    )
    .unwrap();

    let cube = open_cube(&path, &CubeFileLayout::default(), LoadMode::Lazy).unwrap();
    assert_eq!(cube.t_axis(), &[0.0, 3.0, 6.0]);
    assert_eq!(cube.time_epoch().parts(), [1990, 1, 1, 0, 0, 0]);
}

#[test]
fn test_missing_units_default_to_1900_hours() {
    let dir = scratch_dir();
    let path = dir.path().join("bare.h5");
    write_index_cube(&path, None);

    let cube = open_cube(&path, &CubeFileLayout::default(), LoadMode::Lazy).unwrap();
    assert_eq!(cube.time_epoch(), &Epoch::era_interim());
}

#[test]
fn test_malformed_units_are_configuration_errors() {
    let dir = scratch_dir();
    let path = dir.path().join("bad.h5");
    write_index_cube(&path, Some("hours after lunch"));

    let err = open_cube(&path, &CubeFileLayout::default(), LoadMode::Lazy).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_missing_field_variable() {
    let dir = scratch_dir();
    let path = dir.path().join("cube.h5");
    write_index_cube(&path, Some(CUBE_TIME_UNITS));

    let layout = CubeFileLayout {
        field: "dac".to_string(),
        ..Default::default()
    };
    let err = open_cube(&path, &layout, LoadMode::Lazy).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(ref m) if m.contains("dac")));
}

#[test]
fn test_time_subset_reads_selected_steps() {
    let dir = scratch_dir();
    let path = dir.path().join("cube.h5");
    write_index_cube(&path, Some(CUBE_TIME_UNITS));

    let day = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    let window = TimeWindow::new(day.and_hms_opt(3, 0, 0).unwrap(), day.and_hms_opt(9, 0, 0).unwrap()).unwrap();
    let cube = load_cube(
        &path,
        &CubeFileLayout::default(),
        LoadMode::Lazy,
        &CubeSubset::time(window),
    )
    .unwrap();

    assert!(cube.is_resident());
    assert_eq!(cube.t_axis(), &[3.0, 6.0, 9.0]);
    assert_eq!(cube.sample_points(&[9.0], &[-60.0], &[0.0]).unwrap(), vec![30000.0]);
}

#[test]
fn test_subset_outside_cube_fails_before_sampling() {
    let dir = scratch_dir();
    let path = dir.path().join("cube.h5");
    write_index_cube(&path, Some(CUBE_TIME_UNITS));

    let window = TimeWindow::from_years(1990, 1991).unwrap();
    let err = load_cube(
        &path,
        &CubeFileLayout::default(),
        LoadMode::Resident,
        &CubeSubset::time(window),
    )
    .unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_spatial_subset_rejected_without_io() {
    let subset = CubeSubset {
        lon: Some((0.0, 10.0)),
        ..Default::default()
    };
    let err = load_cube(
        Path::new("/does/not/exist.h5"),
        &CubeFileLayout::default(),
        LoadMode::Lazy,
        &subset,
    )
    .unwrap_err();
    assert!(matches!(err, NetCdfError::Common(IbeError::UnsupportedSubset(_))));
}

#[test]
fn test_read_structured_observations() {
    let dir = scratch_dir();
    let path = dir.path().join("track.h5");
    write_track_file(
        &path,
        &[
            ("lon", vec![10.0, 190.0]),
            ("lat", vec![-70.0, -75.0]),
            ("t_sec", vec![0.0, 3600.0]),
            ("h_cor", vec![1.0, 2.0]),
        ],
    )
    .unwrap();

    let obs = read_structured(&path, &VariableNames::default(), true).unwrap();
    assert_eq!(obs.x, vec![10.0, 190.0]);
    assert_eq!(obs.z, Some(vec![1.0, 2.0]));
    assert_eq!(obs.shape, vec![2]);

    let names = VariableNames {
        z: "h_elv".to_string(),
        ..Default::default()
    };
    let err = read_structured(&path, &names, true).unwrap_err();
    assert!(matches!(err, NetCdfError::MissingData(ref m) if m.contains("h_elv")));
}

fn sample_export<'a>() -> CorrectionExport<'a> {
    CorrectionExport {
        names: ["lon", "lat", "t_sec"],
        x: &[10.0, -170.0],
        y: &[-70.0, -75.5],
        t: &[0.0, 3600.0],
        correction: &[0.0123456789, -0.5],
        shape: &[2],
    }
}

#[test]
fn test_export_structured() {
    let dir = scratch_dir();
    let path = dir.path().join("track_IBE.h5");
    export_structured(&path, &sample_export()).unwrap();

    assert_eq!(read_variable(&path, "lon"), vec![10.0, -170.0]);
    assert_eq!(read_variable(&path, "t_sec"), vec![0.0, 3600.0]);
    assert_eq!(read_variable(&path, CORRECTION_VARIABLE), vec![0.0123456789, -0.5]);

    let err = export_structured(&path, &sample_export()).unwrap_err();
    assert!(matches!(err, NetCdfError::OutputExists(_)));
}

#[test]
fn test_export_delimited_six_decimals() {
    let dir = scratch_dir();
    let path = dir.path().join("track_IBE.txt");
    export_delimited(&path, &sample_export()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec![
        "10.000000 -70.000000 0.000000 0.012346",
        "-170.000000 -75.500000 3600.000000 -0.500000",
    ]);

    // Nothing left behind but the output.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_apply_in_place_moves_corrected_file() {
    let dir = scratch_dir();
    let input = dir.path().join("track.h5");
    write_track_file(
        &input,
        &[
            ("lon", vec![10.0, 20.0]),
            ("lat", vec![-70.0, -75.0]),
            ("t_sec", vec![0.0, 3600.0]),
            ("h_cor", vec![1.0, 2.0]),
        ],
    )
    .unwrap();

    let output = output_path(&input, true);
    let update = InPlaceCorrection {
        height_variable: "h_cor",
        corrected: &[0.9, 2.25],
        correction: &[0.1, -0.25],
    };
    apply_in_place(&input, &output, &update).unwrap();

    assert!(!input.exists());
    assert_slice_approx_eq!(read_variable(&output, "h_cor"), [0.9, 2.25], 1e-12);
    assert_eq!(read_variable(&output, CORRECTION_VARIABLE), vec![0.1, -0.25]);
    assert_eq!(read_variable(&output, "lon"), vec![10.0, 20.0]);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_apply_refuses_corrected_input() {
    let dir = scratch_dir();
    let input = dir.path().join("done.h5");
    write_track_file(&input, &[("h_cor", vec![1.0]), (CORRECTION_VARIABLE, vec![0.1])]).unwrap();

    let update = InPlaceCorrection {
        height_variable: "h_cor",
        corrected: &[0.9],
        correction: &[0.1],
    };
    let err = apply_in_place(&input, &dir.path().join("done_IBE.h5"), &update).unwrap_err();
    assert!(matches!(err, NetCdfError::AlreadyCorrected(_)));
    assert!(input.exists());
    assert!(has_variable(&input, CORRECTION_VARIABLE));
}

#[test]
fn test_apply_never_overwrites_output() {
    let dir = scratch_dir();
    let input = dir.path().join("track.h5");
    write_track_file(&input, &[("h_cor", vec![1.0])]).unwrap();
    let output = output_path(&input, true);
    fs::write(&output, b"occupied").unwrap();

    let update = InPlaceCorrection {
        height_variable: "h_cor",
        corrected: &[0.9],
        correction: &[0.1],
    };
    let err = apply_in_place(&input, &output, &update).unwrap_err();
    assert!(matches!(err, NetCdfError::OutputExists(_)));
    assert!(input.exists());
    assert!(!has_variable(&input, CORRECTION_VARIABLE));
    assert_eq!(fs::read(&output).unwrap(), b"occupied");
}
