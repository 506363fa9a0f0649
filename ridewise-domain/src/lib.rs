#![warn(clippy::uninlined_format_args)]

pub mod model;

pub use model::{PreferenceSet, RidePreferences};
