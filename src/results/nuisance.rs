//! Nuisance distances for people in buildings, following SBR-B (2002).

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::interpolate::Interp1d;
use super::vibration::SingleVibrationResult;
use crate::error::{Result, VibraCoreError};
use crate::input::vibration::{Buildings, FloorMaterial, InstallationType, VibrationType};

/// Duration categories of SBR-B art. 10.5.4 table 4, in table order.
pub const DURATIONS: [&str; 8] = [
    "<= 1 day",
    "2 days",
    "3 days",
    "4 days",
    "5 days",
    ">= 6 days; <26 days",
    ">= 26 days; <78 days",
    "Unlimited",
];

// A1, A2, A3 for the limited durations
const LIMITED_TARGETS: [[f64; 3]; 7] = [
    [0.8, 6.0, 0.4],
    [0.72, 6.0, 0.38],
    [0.64, 6.0, 0.34],
    [0.56, 6.0, 0.36],
    [0.48, 6.0, 0.32],
    [0.4, 6.0, 0.3],
    [0.3, 6.0, 0.2],
];

/// Building functions with an unlimited-duration target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildingFunction {
    Residential,
    Healthcare,
    Education,
}

impl BuildingFunction {
    fn detect(gebruiksdoel: &str) -> Option<Self> {
        if gebruiksdoel.contains("woonfunctie") {
            Some(Self::Residential)
        } else if gebruiksdoel.contains("gezondheidsfunctie") {
            Some(Self::Healthcare)
        } else if gebruiksdoel.contains("onderwijsfunctie") {
            Some(Self::Education)
        } else {
            None
        }
    }
}

fn unlimited_target(vibration_type: VibrationType, function: Option<BuildingFunction>) -> [f64; 3] {
    use BuildingFunction::*;
    match (vibration_type, function) {
        (_, None) => [f64::NAN; 3],
        (VibrationType::ShortTerm | VibrationType::RepeatedShortTerm, Some(Residential | Healthcare)) => {
            [0.2, 0.8, 0.1]
        }
        (VibrationType::ShortTerm | VibrationType::RepeatedShortTerm, Some(Education)) => {
            [0.3, 1.2, 0.15]
        }
        (VibrationType::Continuous, Some(Residential | Healthcare)) => [0.1, 0.4, 0.05],
        (VibrationType::Continuous, Some(Education)) => [0.15, 0.6, 0.07],
    }
}

/// Target values per duration for a building with the given `gebruiksdoel`.
/// The unlimited row is NaN for functions without a target.
pub fn target_levels(vibration_type: VibrationType, gebruiksdoel: &str) -> [[f64; 3]; 8] {
    let mut levels = [[0.0; 3]; 8];
    levels[..7].copy_from_slice(&LIMITED_TARGETS);
    levels[7] = unlimited_target(vibration_type, BuildingFunction::detect(gebruiksdoel));
    levels
}

/// Floor amplification factor Cfc, CUR 166-1997 table 5.20.
pub fn cfc_factor(installation_type: InstallationType, material: FloorMaterial) -> f64 {
    match (installation_type, material) {
        (InstallationType::Driving, _) => 1.4,
        (InstallationType::Vibrate, FloorMaterial::Concrete) => 1.7,
        (InstallationType::Vibrate, FloorMaterial::Wood) => 2.5,
    }
}

fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

fn nan_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
}

/// Distance per target triple `(t1[i], t2[i], t3[i])`, computed as
/// `min(max(d_eff(t2), d_per(t3)), d_eff(t1))`.
///
/// Samples with an already seen `(v_per, v_eff)` pair are ignored.
pub fn nuisance_prediction(
    target_value_one: &[f64],
    target_value_two: &[f64],
    target_value_three: &[f64],
    vibration_velocity_eff: &[f64],
    vibration_velocity_per: &[f64],
    distance: &[f64],
) -> Result<Vec<f64>> {
    let n = distance.len();
    if vibration_velocity_eff.len() != n || vibration_velocity_per.len() != n {
        return Err(VibraCoreError::Shape(
            "velocity and distance samples differ in length".into(),
        ));
    }
    if target_value_two.len() != target_value_one.len()
        || target_value_three.len() != target_value_one.len()
    {
        return Err(VibraCoreError::Shape("target values differ in length".into()));
    }

    let mut seen = HashSet::new();
    let (mut eff, mut per, mut dist) = (Vec::new(), Vec::new(), Vec::new());
    for i in 0..n {
        let (p, e) = (vibration_velocity_per[i], vibration_velocity_eff[i]);
        if seen.insert((p.to_bits(), e.to_bits())) {
            per.push(p);
            eff.push(e);
            dist.push(distance[i]);
        }
    }

    let f_eff = Interp1d::new(&eff, &dist)?;
    let f_per = Interp1d::new(&per, &dist)?;

    Ok(target_value_one
        .iter()
        .zip(target_value_two)
        .zip(target_value_three)
        .map(|((&t1, &t2), &t3)| {
            nan_min(nan_max(f_eff.eval(t2), f_per.eval(t3)), f_eff.eval(t1))
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuisanceRow {
    pub duration: &'static str,
    /// [m]
    pub distance: f64,
}

/// Nuisance distance per duration category for one building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NuisanceTable {
    pub building: String,
    pub rows: Vec<NuisanceRow>,
}

impl NuisanceTable {
    pub fn distance(&self, duration: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.duration == duration)
            .map(|row| row.distance)
    }
}

/// Nuisance distances for `building_name` from a single-building response.
///
/// `period` is the daily operating period in hours.
pub fn nuisance_distances(
    buildings: &Buildings,
    response: &SingleVibrationResult,
    building_name: &str,
    vibration_type: VibrationType,
    installation_type: InstallationType,
    period: f64,
) -> Result<NuisanceTable> {
    let building = buildings
        .find_by_name(building_name)
        .ok_or_else(|| VibraCoreError::Lookup(format!("No buildings with name {building_name}.")))?;

    let gebruiksdoel = building
        .properties
        .get("gebruiksdoel")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let material: FloorMaterial = match building.properties.get("material") {
        Some(value) => serde_json::from_value(value.clone())?,
        None => {
            return Err(VibraCoreError::MissingField {
                missing: vec!["material".into()],
            });
        }
    };

    let levels = target_levels(vibration_type, gebruiksdoel);
    let a_one: Vec<f64> = levels.iter().map(|l| l[0]).collect();
    let a_two: Vec<f64> = levels.iter().map(|l| l[1]).collect();
    let a_three: Vec<f64> = levels.iter().map(|l| l[2]).collect();

    let gamma = response.gamma();
    let cfc = cfc_factor(installation_type, material);
    let u_eff = if vibration_type == VibrationType::Continuous { 0.64 } else { 0.42 };

    let v_eff: Vec<f64> = response
        .data
        .vibration_velocity()
        .iter()
        .map(|v| v / gamma * cfc * u_eff)
        .collect();
    let v_per: Vec<f64> = v_eff.iter().map(|v| v * (period / 12.0).sqrt()).collect();

    let distances = nuisance_prediction(
        &a_one,
        &a_two,
        &a_three,
        &v_eff,
        &v_per,
        response.data.distance(),
    )?;

    Ok(NuisanceTable {
        building: building_name.to_string(),
        rows: DURATIONS
            .iter()
            .zip(distances)
            .map(|(&duration, distance)| NuisanceRow { duration, distance })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::vibration::tests::buildings;
    use crate::results::vibration::tests::single_response;
    use serde_json::json;

    fn linear_response() -> SingleVibrationResult {
        SingleVibrationResult::from_api_response(&json!({
            "calculation": {"distance": 5.0, "failureValueVibrationVelocity": 3.0, "distanceRequired": 4.0},
            "data": {"distance": [0.0, 10.0, 20.0, 30.0], "vibrationVelocity": [4.0, 3.0, 2.0, 1.0]}
        }))
        .unwrap()
    }

    #[test]
    fn unlimited_row_depends_on_function() {
        let levels = target_levels(VibrationType::Continuous, "woonfunctie,kantoorfunctie");
        assert_eq!(levels[7], [0.1, 0.4, 0.05]);
        assert_eq!(levels[0], [0.8, 6.0, 0.4]);

        let levels = target_levels(VibrationType::ShortTerm, "onderwijsfunctie");
        assert_eq!(levels[7], [0.3, 1.2, 0.15]);

        let levels = target_levels(VibrationType::RepeatedShortTerm, "industriefunctie");
        assert!(levels[7].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn cfc_table() {
        assert_eq!(cfc_factor(InstallationType::Driving, FloorMaterial::Wood), 1.4);
        assert_eq!(cfc_factor(InstallationType::Vibrate, FloorMaterial::Concrete), 1.7);
        assert_eq!(cfc_factor(InstallationType::Vibrate, FloorMaterial::Wood), 2.5);
    }

    #[test]
    fn prediction_lies_between_the_three_target_distances() {
        let v = [1.25, 2.5, 5.0, 10.0, 20.0];
        let per: Vec<f64> = v.iter().map(|x| x * 0.9).collect();
        let d = [1.0, 2.0, 4.0, 8.0, 16.0];
        let t1 = [2.0, 6.0, 15.0];
        let t2 = [6.0, 3.0, 1.5];
        let t3 = [3.0, 12.0, 4.0];

        let out = nuisance_prediction(&t1, &t2, &t3, &v, &per, &d).unwrap();
        let f_eff = Interp1d::new(&v, &d).unwrap();
        let f_per = Interp1d::new(&per, &d).unwrap();
        for (i, value) in out.iter().enumerate() {
            let p = [f_eff.eval(t1[i]), f_eff.eval(t2[i]), f_per.eval(t3[i])];
            let lo = p.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = p.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!(*value >= lo - 1e-12 && *value <= hi + 1e-12, "{i}: {value} not in [{lo}, {hi}]");
        }
        // capped by t1 in the first two, governed by t3 in the last
        assert!((out[0] - f_eff.eval(t1[0])).abs() < 1e-12);
        assert!((out[1] - f_eff.eval(t1[1])).abs() < 1e-12);
        assert!((out[2] - f_per.eval(t3[2])).abs() < 1e-12);
        assert!(out[2] < f_eff.eval(t1[2]));
    }

    #[test]
    fn prediction_ignores_repeated_pairs() {
        let v = [4.0, 4.0, 2.0];
        let d = [0.0, 50.0, 20.0];
        let out = nuisance_prediction(&[3.0], &[6.0], &[0.1], &v, &v, &d).unwrap();
        assert!((out[0] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn distances_for_residential_building() {
        let table = nuisance_distances(
            &buildings(),
            &linear_response(),
            "0",
            VibrationType::Continuous,
            InstallationType::Vibrate,
            10.0,
        )
        .unwrap();

        assert_eq!(table.building, "0");
        assert_eq!(
            table.rows.iter().map(|r| r.duration).collect::<Vec<_>>(),
            DURATIONS.to_vec()
        );
        // samples are collinear: d = 40 - 10 v / (Cfc u_eff)
        let scale = 10.0 / (1.7 * 0.64);
        let one_day = table.distance("<= 1 day").unwrap();
        assert!((one_day - (40.0 - 0.8 * scale)).abs() < 1e-9);
        let unlimited = table.distance("Unlimited").unwrap();
        assert!((unlimited - (40.0 - 0.1 * scale)).abs() < 1e-9);
    }

    #[test]
    fn unlimited_is_nan_for_other_functions() {
        let table = nuisance_distances(
            &buildings(),
            &linear_response(),
            "1",
            VibrationType::Continuous,
            InstallationType::Driving,
            10.0,
        )
        .unwrap();
        assert!(table.distance("Unlimited").unwrap().is_nan());
        assert!(table.distance("2 days").unwrap().is_finite());
    }

    #[test]
    fn gamma_scales_velocities() {
        let response = SingleVibrationResult::from_api_response(&single_response()).unwrap();
        let table = nuisance_distances(
            &buildings(),
            &response,
            "0",
            VibrationType::ShortTerm,
            InstallationType::Vibrate,
            12.0,
        )
        .unwrap();
        assert_eq!(table.rows.len(), 8);
    }

    #[test]
    fn unknown_building_and_missing_material() {
        let err = nuisance_distances(
            &buildings(),
            &linear_response(),
            "42",
            VibrationType::Continuous,
            InstallationType::Vibrate,
            10.0,
        )
        .unwrap_err();
        assert!(matches!(err, VibraCoreError::Lookup(_)));

        let mut buildings = buildings();
        buildings.features[0].properties.remove("material");
        let err = nuisance_distances(
            &buildings,
            &linear_response(),
            "0",
            VibrationType::Continuous,
            InstallationType::Vibrate,
            10.0,
        )
        .unwrap_err();
        assert!(matches!(err, VibraCoreError::MissingField { .. }));
    }
}
