//! Inverse Barometer Effect correction of polar altimetry heights.
//!
//! Loads the correction cube once and runs every input file through it:
//!
//! ```text
//! IbeConfig (defaults → YAML → IBE_* env → CLI)
//!      │
//!      ▼
//! load_shared_cube()  ── optional time subset, once
//!      │
//!      ▼
//! CorrectionApplier::run(files)
//!      │
//!      ├─► read x, y, t [, h]
//!      ├─► seconds since input epoch → hours since cube epoch
//!      ├─► projected x/y → lon/lat, wrap lon
//!      ├─► sample cube
//!      │
//!      └─► apply: h - h_ibe written into <stem>_IBE.<ext>
//!          export: x, y, t, h_ibe written to <stem>_IBE.<ext>
//! ```

pub mod apply;
pub mod config;
pub mod error;

pub use apply::{load_shared_cube, CorrectionApplier, Corrections, FileReport};
pub use config::{FormatKind, IbeConfig, OutputMode, DEFAULT_CUBE_FILE};
pub use error::{ApplyError, FileError};
