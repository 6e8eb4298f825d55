use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VibraCoreError};
use crate::geometry::FeatureCollection;
use crate::input::vibration::Category;

/// Outcome of the vibration check for one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingCheck {
    pub cat: Category,
    /// `true` when the building satisfies the limit.
    pub check: bool,
    /// Required distance to the source [m].
    #[serde(default)]
    pub x_required: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `/cur166/validation/multi` or `/prepal/validation/multi`.
pub type VibrationResults = FeatureCollection<BuildingCheck>;

impl FeatureCollection<BuildingCheck> {
    pub fn from_api_response(response: &Value) -> Result<Self> {
        Ok(Self::deserialize(response)?)
    }

    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Number of buildings of `category` that fail the check.
    pub fn insufficient(&self, category: Category) -> usize {
        self.features
            .iter()
            .filter(|f| f.properties.cat == category && !f.properties.check)
            .count()
    }

    pub fn sufficient(&self) -> usize {
        self.features.iter().filter(|f| f.properties.check).count()
    }
}

/// Scalar outcome of a single-building calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCalculation {
    /// Building distance to the source [m].
    pub distance: f64,
    /// Vr [mm/s]
    pub failure_value_vibration_velocity: f64,
    pub distance_required: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_value_vibration_velocity_vibration_sensitive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_required_velocity_vibration_sensitive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_value_excitation_velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_required_excitation_velocity: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Predicted velocity against distance.
///
/// Every trace has one sample per distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCurve", into = "RawCurve")]
pub struct VelocityCurve {
    distance: Vec<f64>,
    vibration_velocity: Vec<f64>,
    vibration_velocity_vibration_sensitive: Option<Vec<f64>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCurve {
    distance: Vec<f64>,
    vibration_velocity: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vibration_velocity_vibration_sensitive: Option<Vec<f64>>,
}

impl TryFrom<RawCurve> for VelocityCurve {
    type Error = VibraCoreError;

    fn try_from(raw: RawCurve) -> Result<Self> {
        Self::try_new(
            raw.distance,
            raw.vibration_velocity,
            raw.vibration_velocity_vibration_sensitive,
        )
    }
}

impl From<VelocityCurve> for RawCurve {
    fn from(curve: VelocityCurve) -> Self {
        Self {
            distance: curve.distance,
            vibration_velocity: curve.vibration_velocity,
            vibration_velocity_vibration_sensitive: curve.vibration_velocity_vibration_sensitive,
        }
    }
}

impl VelocityCurve {
    pub fn try_new(
        distance: Vec<f64>,
        vibration_velocity: Vec<f64>,
        vibration_velocity_vibration_sensitive: Option<Vec<f64>>,
    ) -> Result<Self> {
        let n = distance.len();
        let sensitive = vibration_velocity_vibration_sensitive.as_ref().map(Vec::len);
        if vibration_velocity.len() != n || sensitive.is_some_and(|len| len != n) {
            return Err(VibraCoreError::Shape(format!(
                "velocity curve needs equally long traces, distance has {n}"
            )));
        }
        Ok(Self {
            distance,
            vibration_velocity,
            vibration_velocity_vibration_sensitive,
        })
    }

    /// [m]
    pub fn distance(&self) -> &[f64] {
        &self.distance
    }

    /// Vd [mm/s]
    pub fn vibration_velocity(&self) -> &[f64] {
        &self.vibration_velocity
    }

    pub fn vibration_velocity_vibration_sensitive(&self) -> Option<&[f64]> {
        self.vibration_velocity_vibration_sensitive.as_deref()
    }
}

/// Result of `/cur166/validation/single` or `/prepal/validation/single`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleVibrationResult {
    pub calculation: SingleCalculation,
    pub data: VelocityCurve,
}

#[derive(Deserialize)]
struct RawSingleResult {
    calculation: SingleCalculation,
    data: RawCurve,
}

impl SingleVibrationResult {
    /// Parses the response; ragged curves fail with [`VibraCoreError::Shape`].
    pub fn from_api_response(response: &Value) -> Result<Self> {
        let raw = RawSingleResult::deserialize(response)?;
        Ok(Self {
            calculation: raw.calculation,
            data: VelocityCurve::try_from(raw.data)?,
        })
    }

    /// Safety factor applied to the velocity curve; 1 when absent.
    pub fn gamma(&self) -> f64 {
        self.calculation.gamma.unwrap_or(1.0)
    }
}
