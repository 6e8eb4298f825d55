//! Client for the VibraCore calculation service.
//!
//! The crate builds request payloads for the impact force, CUR 166 and PrePal
//! calculations, submits them as long-running tasks through an authenticated
//! RPC gateway, polls the returned ticket with exponential backoff and parses
//! the results. Nuisance and sound distances are derived locally from the
//! parsed results.

pub mod api;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod results;

pub use config::VibraCoreConfig;
pub use error::{Result, VibraCoreError};
pub use geometry::{Feature, FeatureCollection, Geometry, Position};
