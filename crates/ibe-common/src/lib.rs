//! Common types and utilities shared across the IBE correction workspace.

pub mod error;
pub mod lon;
pub mod observation;
pub mod time;

pub use error::{IbeError, IbeResult};
pub use lon::{is_strictly_monotonic, wrap_to_180, wrap_to_180_in_place};
pub use observation::ObservationSet;
pub use time::{hours_between, secs_to_hours, CfTimeUnits, Epoch, TimeUnit};
