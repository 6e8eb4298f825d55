//! Parsers for the remote results and the local post-processing on top of them.

pub mod impact_force;
pub mod interpolate;
pub mod nuisance;
pub mod sound;
pub mod vibration;

pub use impact_force::{
    Hue, ImpactForceColumns, ImpactForceTable, MultiCalculationData, SingleCalculationData,
};
pub use interpolate::Interp1d;
pub use nuisance::{NuisanceTable, nuisance_distances, nuisance_prediction};
pub use sound::{SoundLevel, get_normative_sound_building, sound_prediction};
pub use vibration::{SingleVibrationResult, VibrationResults};
