//! End-to-end correction runs against NetCDF-4 files in scratch directories.
//!
//! The cube is linear in pixel space (`k + 10 j + 100 i`), so trilinear
//! samples have closed-form values. Requires libnetcdf/libhdf5.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::NaiveDate;
use cube_sampler::TimeWindow;
use ibe_common::Epoch;
use ibecor::{load_shared_cube, ApplyError, CorrectionApplier, FormatKind, IbeConfig, OutputMode};
use netcdf_io::{NetCdfError, CORRECTION_VARIABLE};
use projection::{convert_xy_ll, Direction};
use test_utils::{
    assert_approx_eq, assert_slice_approx_eq, has_variable, linear_cube, read_variable,
    scratch_dir, three_hourly_axis, write_cube_file, write_track_file, CUBE_TIME_UNITS,
};

/// Two observations and their expected corrections.
const LON: [f64; 2] = [-45.0, 135.0];
const LAT: [f64; 2] = [-65.0, -80.0];
const T_SEC: [f64; 2] = [4.5 * 3600.0, 9.0 * 3600.0];
const EXPECTED: [f64; 2] = [1.5 + 5.0 + 150.0, 3.0 + 20.0 + 350.0];

fn write_linear_cube(dir: &Path) -> PathBuf {
    let path = dir.join("cube.h5");
    write_cube_file(
        &path,
        &three_hourly_axis(0.0, 6),
        &[-60.0, -70.0, -80.0],
        &[-180.0, -90.0, 0.0, 90.0, 180.0],
        &linear_cube((6, 3, 5), [1.0, 10.0, 100.0, 0.0]),
        Some(CUBE_TIME_UNITS),
    )
    .unwrap();
    path
}

fn write_track(path: &Path, lon: &[f64]) {
    write_track_file(
        path,
        &[
            ("lon", lon.to_vec()),
            ("lat", LAT.to_vec()),
            ("t_sec", T_SEC.to_vec()),
            ("h_cor", vec![1000.0, 2000.0]),
        ],
    )
    .unwrap();
}

fn config_for(cube: &Path) -> IbeConfig {
    IbeConfig {
        cube_file: cube.to_path_buf(),
        epoch: Epoch::era_interim(),
        ..Default::default()
    }
}

fn applier(config: &IbeConfig) -> CorrectionApplier {
    let cube = load_shared_cube(config).unwrap();
    CorrectionApplier::new(cube, config).unwrap()
}

#[test]
fn test_apply_subtracts_and_stores_correction() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    let input = dir.path().join("track.h5");
    write_track(&input, &LON);

    let config = IbeConfig {
        mode: OutputMode::Apply,
        ..config_for(&cube)
    };
    let reports = applier(&config).run(&[&input]).unwrap();

    let output = dir.path().join("track_IBE.h5");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].output, output);
    assert_eq!(reports[0].observations, 2);
    assert_approx_eq!(reports[0].mean_correction, (EXPECTED[0] + EXPECTED[1]) / 2.0, 1e-4);

    assert!(!input.exists());
    assert_slice_approx_eq!(read_variable(&output, CORRECTION_VARIABLE), EXPECTED, 1e-4);
    assert_slice_approx_eq!(
        read_variable(&output, "h_cor"),
        [1000.0 - EXPECTED[0], 2000.0 - EXPECTED[1]],
        1e-4
    );
    // Other variables are carried over untouched.
    assert_eq!(read_variable(&output, "t_sec"), T_SEC.to_vec());
}

#[test]
fn test_second_apply_is_refused() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    let input = dir.path().join("track.h5");
    write_track(&input, &LON);

    let config = IbeConfig {
        mode: OutputMode::Apply,
        ..config_for(&cube)
    };
    let applier = applier(&config);
    applier.run(&[&input]).unwrap();

    let corrected = dir.path().join("track_IBE.h5");
    let before = read_variable(&corrected, "h_cor");
    let err = applier.run(&[&corrected]).unwrap_err();
    assert_eq!(err.file(), Some(corrected.as_path()));
    assert!(matches!(
        err,
        ApplyError::File {
            source: ibecor::FileError::Io(NetCdfError::AlreadyCorrected(_)),
            ..
        }
    ));
    assert_eq!(read_variable(&corrected, "h_cor"), before);
    assert!(!dir.path().join("track_IBE_IBE.h5").exists());
}

#[test]
fn test_export_structured_keeps_input() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    let input = dir.path().join("track.h5");
    // 315 E wraps to -45 before sampling.
    write_track(&input, &[315.0, 135.0]);

    let reports = applier(&config_for(&cube)).run(&[&input]).unwrap();
    let output = &reports[0].output;

    assert!(input.exists());
    assert!(!has_variable(&input, CORRECTION_VARIABLE));
    assert_slice_approx_eq!(read_variable(output, CORRECTION_VARIABLE), EXPECTED, 1e-4);
    assert_eq!(read_variable(output, "lon"), LON.to_vec());
    assert_eq!(read_variable(output, "lat"), LAT.to_vec());
    assert_eq!(read_variable(output, "t_sec"), T_SEC.to_vec());
    assert!(!has_variable(output, "h_cor"));
}

#[test]
fn test_export_delimited_rows() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    let input = dir.path().join("track.dat");
    fs::write(
        &input,
        "# lon lat t_sec h\n315.0 -65.0 16200.0 1000.0\n135.0  -80.0\t32400.0 2000.0\n",
    )
    .unwrap();

    let config = IbeConfig {
        format: FormatKind::Delimited,
        ..config_for(&cube)
    };
    applier(&config).run(&[&input]).unwrap();

    let text = fs::read_to_string(dir.path().join("track_IBE.txt")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "-45.000000 -65.000000 16200.000000 156.500000",
            "135.000000 -80.000000 32400.000000 373.000000",
        ]
    );
}

#[test]
fn test_projected_input_matches_geographic() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    let (x, y) = convert_xy_ll(&LON, &LAT, "3031", Direction::Forward).unwrap();
    let input = dir.path().join("track.h5");
    write_track_file(
        &input,
        &[
            ("x", x.clone()),
            ("y", y.clone()),
            ("t_sec", T_SEC.to_vec()),
        ],
    )
    .unwrap();

    let mut config = IbeConfig {
        projection: "3031".to_string(),
        ..config_for(&cube)
    };
    config.variables.x = "x".to_string();
    config.variables.y = "y".to_string();

    let reports = applier(&config).run(&[&input]).unwrap();
    let output = &reports[0].output;
    assert_slice_approx_eq!(read_variable(output, CORRECTION_VARIABLE), EXPECTED, 1e-4);
    assert_eq!(read_variable(output, "x"), x);
    assert_eq!(read_variable(output, "y"), y);
}

#[test]
fn test_run_stops_at_first_failure() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    let first = dir.path().join("a.h5");
    let missing = dir.path().join("b.h5");
    let last = dir.path().join("c.h5");
    write_track(&first, &LON);
    write_track(&last, &LON);

    let err = applier(&config_for(&cube))
        .run(&[&first, &missing, &last])
        .unwrap_err();

    assert_eq!(err.file(), Some(missing.as_path()));
    assert!(!err.is_configuration_error());
    assert!(dir.path().join("a_IBE.h5").exists());
    assert!(!dir.path().join("c_IBE.h5").exists());
}

#[test]
fn test_resident_subset_cube_gives_same_corrections() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    let input = dir.path().join("track.h5");
    write_track(&input, &LON);

    let mut config = config_for(&cube);
    config.load_mode = netcdf_io::LoadMode::Resident;
    let day = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
    config.subset.time = Some(
        TimeWindow::new(day.and_hms_opt(0, 0, 0).unwrap(), day.and_hms_opt(12, 0, 0).unwrap()).unwrap(),
    );

    let shared = load_shared_cube(&config).unwrap();
    assert!(shared.is_resident());
    assert_eq!(shared.t_axis(), &[0.0, 3.0, 6.0, 9.0, 12.0]);
    let reports = CorrectionApplier::new(shared, &config).unwrap().run(&[&input]).unwrap();
    assert_slice_approx_eq!(read_variable(&reports[0].output, CORRECTION_VARIABLE), EXPECTED, 1e-4);
}

#[test]
fn test_subset_outside_cube_fails_before_any_file() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());

    let mut config = config_for(&cube);
    config.subset.time = Some(TimeWindow::from_years(1995, 1996).unwrap());

    let err = load_shared_cube(&config).unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_cli_exports_glob_matches() {
    let dir = scratch_dir();
    let cube = write_linear_cube(dir.path());
    write_track(&dir.path().join("t1.h5"), &LON);
    write_track(&dir.path().join("t2.h5"), &LON);

    let status = Command::new(env!("CARGO_BIN_EXE_ibecor"))
        .arg(format!("{}/t*.h5", dir.path().display()))
        .args(["-e", "1900", "1", "1", "0", "0", "0"])
        .arg("--cube")
        .arg(&cube)
        .env_remove("IBE_CUBE_FILE")
        .env_remove("IBE_PROJECTION")
        .status()
        .unwrap();

    assert!(status.success());
    for name in ["t1_IBE.h5", "t2_IBE.h5"] {
        let output = dir.path().join(name);
        assert_slice_approx_eq!(read_variable(&output, CORRECTION_VARIABLE), EXPECTED, 1e-4);
    }
}
