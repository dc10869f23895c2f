//! Common test fixtures for IBE correction tests.

/// Calendar epochs as `(Y, M, D, h, m, s)`.
pub mod epochs {
    /// Unix epoch, reference of altimetry `t_sec` fields
    pub const UNIX: [i32; 6] = [1970, 1, 1, 0, 0, 0];

    /// Reference of ERA-Interim derived cubes
    pub const ERA_INTERIM: [i32; 6] = [1900, 1, 1, 0, 0, 0];

    /// Hours from 1900-01-01 to 1970-01-01 (25567 days)
    pub const HOURS_1900_TO_1970: f64 = 613_608.0;

    /// Seconds from 1900-01-01 to 1970-01-01
    pub const SECONDS_1900_TO_1970: f64 = HOURS_1900_TO_1970 * 3600.0;
}

/// Axes resembling the Antarctic IBE product.
pub mod axes {
    /// Latitudes stored north to south, as in ERA-Interim files
    pub const ANTARCTIC_LAT_DESC: [f64; 5] = [-60.0, -67.5, -75.0, -82.5, -90.0];

    /// Longitudes already in [-180, 180)
    pub const LON_WEST_EAST: [f64; 4] = [-180.0, -90.0, 0.0, 90.0];

    /// Uneven axis used to check that spacing is never assumed
    pub const UNEVEN: [f64; 4] = [0.0, 1.0, 4.0, 10.0];
}

/// Shapes of cubes used across the suite (time, lat, lon).
pub mod shapes {
    pub const TINY: (usize, usize, usize) = (2, 2, 2);
    pub const SMALL: (usize, usize, usize) = (8, 5, 4);
}
