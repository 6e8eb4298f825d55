//! Sound contour distances after the "Handleiding meten en rekenen
//! industrielawaai" (2004), method I.

use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use super::interpolate::Interp1d;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::input::vibration::{Buildings, nearest_building};

const GRID_START: f64 = 1e-5;
const GRID_STEP: f64 = 0.2;
const GRID_SIZE: usize = 2500;
/// Beyond this distance [m] results are extrapolated.
pub const GRID_LIMIT: f64 = 500.0;

const SENSITIVE_FUNCTIONS: [&str; 3] = ["woonfunctie", "gezondheidsfunctie", "onderwijsfunctie"];

/// A sound level contour to compute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundLevel {
    pub label: String,
    /// [dB]
    pub level: f64,
}

impl SoundLevel {
    pub fn new(label: impl Into<String>, level: f64) -> Self {
        Self {
            label: label.into(),
            level,
        }
    }

    pub fn defaults() -> Vec<SoundLevel> {
        vec![
            SoundLevel::new(">80 db [0 dagen]", 80.0),
            SoundLevel::new(">75 db [5 dagen]", 75.0),
            SoundLevel::new(">70 db [15 dagen]", 70.0),
            SoundLevel::new(">65 db [30 dagen]", 65.0),
            SoundLevel::new(">60 db [50 dagen]", 60.0),
        ]
    }
}

/// Distance [m] at which each of `levels` [dB] is reached.
///
/// `power` is the source power [dB], `k2` a correction term [dB] and `period`
/// the daily operating period [hours].
pub fn sound_prediction(power: f64, k2: f64, period: f64, levels: &[f64]) -> Result<Vec<f64>> {
    let distance: Vec<f64> = (0..GRID_SIZE)
        .map(|i| GRID_START + GRID_STEP * i as f64)
        .collect();
    let noise: Vec<f64> = distance
        .iter()
        .map(|d| power + 10.0 * (period / 12.0).log10() - (20.0 * d.log10() + 0.005 * d + 9.1) + k2)
        .collect();

    let f = Interp1d::new(&noise, &distance)?;
    let space = f.eval_many(levels);

    if space.iter().any(|d| *d > GRID_LIMIT) {
        warn!(
            "One or more distances exceeds the {GRID_LIMIT} meter mark. \
             Please note that this method extrapolates the values from this point."
        );
    }
    Ok(space)
}

/// Name of the nearest residential, healthcare or education building.
pub fn get_normative_sound_building(buildings: &Buildings, location: &Geometry) -> Option<String> {
    let nearest = nearest_building(buildings, location, |b| {
        b.properties
            .get("gebruiksdoel")
            .and_then(Value::as_str)
            .is_some_and(|doel| doel.split(',').any(|item| SENSITIVE_FUNCTIONS.contains(&item)))
    });
    if nearest.is_none() {
        error!(category = ?SENSITIVE_FUNCTIONS, "no buildings with category");
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::vibration::tests::{buildings, source};

    #[test]
    fn default_levels_descend() {
        let levels = SoundLevel::defaults();
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0].label, ">80 db [0 dagen]");
        assert!(levels.windows(2).all(|w| w[0].level > w[1].level));
    }

    #[test]
    fn prediction_hits_known_distance() {
        // at 10 m the attenuation is 20 + 0.05 + 9.1 dB
        let out = sound_prediction(100.0, 0.0, 12.0, &[100.0 - 29.15]).unwrap();
        assert!((out[0] - 10.0).abs() < 1e-3);
    }

    #[test]
    fn lower_levels_lie_further_away() {
        let levels: Vec<f64> = SoundLevel::defaults().iter().map(|l| l.level).collect();
        let out = sound_prediction(110.0, 0.0, 10.0, &levels).unwrap();
        assert!(out.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn extrapolates_past_grid() {
        let out = sound_prediction(100.0, 0.0, 12.0, &[20.0]).unwrap();
        assert!(out[0] > GRID_LIMIT);
    }

    #[test]
    fn normative_sound_building() {
        let mut buildings = buildings();
        assert_eq!(
            get_normative_sound_building(&buildings, &source()),
            Some("0".to_string())
        );

        buildings.features[0]
            .properties
            .insert("gebruiksdoel".into(), "bijeenkomstfunctie".into());
        assert_eq!(
            get_normative_sound_building(&buildings, &source()),
            Some("2".to_string())
        );

        buildings.features[2].properties.remove("gebruiksdoel");
        assert_eq!(get_normative_sound_building(&buildings, &source()), None);
    }
}
