use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, VibraCoreError};
use crate::geometry::FeatureCollection;

/// Impact force summary of one CPT location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CptForce {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Maximum impact force [kN].
    pub max: f64,
    pub base: f64,
    #[serde(rename = "Q90")]
    pub q90: f64,
    #[serde(rename = "Q95")]
    pub q95: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `/impact-force/calculation/multi`.
pub type MultiCalculationData = FeatureCollection<CptForce>;

/// Column of [`CptForce`] to summarise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hue {
    #[default]
    Max,
    Base,
    Q90,
    Q95,
}

impl Hue {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "max" => Ok(Hue::Max),
            "base" => Ok(Hue::Base),
            "Q90" => Ok(Hue::Q90),
            "Q95" => Ok(Hue::Q95),
            other => Err(VibraCoreError::InvalidInput(format!(
                "The value {other} is not in [max, base, Q90, Q95]"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hue::Max => "max",
            Hue::Base => "base",
            Hue::Q90 => "Q90",
            Hue::Q95 => "Q95",
        }
    }

    fn pick(self, force: &CptForce) -> f64 {
        match self {
            Hue::Max => force.max,
            Hue::Base => force.base,
            Hue::Q90 => force.q90,
            Hue::Q95 => force.q95,
        }
    }
}

impl FeatureCollection<CptForce> {
    pub fn from_api_response(response: &Value) -> Result<Self> {
        Ok(Self::deserialize(response)?)
    }

    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// `(id, value)` per CPT for the chosen column.
    pub fn values(&self, hue: Hue) -> Vec<(&str, f64)> {
        self.features
            .iter()
            .map(|f| (f.properties.id.as_str(), hue.pick(&f.properties)))
            .collect()
    }

    /// CPT with the largest value in the chosen column.
    pub fn governing(&self, hue: Hue) -> Option<&CptForce> {
        self.features
            .iter()
            .map(|f| &f.properties)
            .max_by(|a, b| hue.pick(a).total_cmp(&hue.pick(b)))
    }
}

/// Raw depth traces of a single impact force calculation, unchecked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactForceColumns {
    /// [kN]
    #[serde(default)]
    pub beta_frictional_resistance: Option<Vec<f64>>,
    /// [kN]
    #[serde(default)]
    pub beta_point_resistance: Option<Vec<f64>>,
    /// [MPa]
    #[serde(default)]
    pub corrected_cone_resistance: Option<Vec<f64>>,
    /// CPT depth [m w.r.t. reference].
    #[serde(default)]
    pub depth_offset: Option<Vec<f64>>,
    #[serde(default)]
    pub frictional_resistance: Option<Vec<f64>>,
    #[serde(default)]
    pub point_resistance: Option<Vec<f64>>,
    #[serde(default)]
    pub sheet_resistance: Option<Vec<f64>>,
    #[serde(default)]
    pub slot_resistance: Option<Vec<f64>>,
    #[serde(default)]
    pub total_resistance: Option<Vec<f64>>,
}

impl ImpactForceColumns {
    fn named(&self) -> [(&'static str, Option<&Vec<f64>>); 9] {
        [
            ("betaFrictionalResistance", self.beta_frictional_resistance.as_ref()),
            ("betaPointResistance", self.beta_point_resistance.as_ref()),
            ("correctedConeResistance", self.corrected_cone_resistance.as_ref()),
            ("depthOffset", self.depth_offset.as_ref()),
            ("frictionalResistance", self.frictional_resistance.as_ref()),
            ("pointResistance", self.point_resistance.as_ref()),
            ("sheetResistance", self.sheet_resistance.as_ref()),
            ("slotResistance", self.slot_resistance.as_ref()),
            ("totalResistance", self.total_resistance.as_ref()),
        ]
    }
}

/// Depth traces of a single impact force calculation.
///
/// All traces that are present have the same length; [`ImpactForceTable::try_new`]
/// is the only way to build one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ImpactForceColumns", into = "ImpactForceColumns")]
pub struct ImpactForceTable {
    columns: ImpactForceColumns,
}

impl TryFrom<ImpactForceColumns> for ImpactForceTable {
    type Error = VibraCoreError;

    fn try_from(columns: ImpactForceColumns) -> Result<Self> {
        Self::try_new(columns)
    }
}

impl From<ImpactForceTable> for ImpactForceColumns {
    fn from(table: ImpactForceTable) -> Self {
        table.columns
    }
}

impl ImpactForceTable {
    /// Fails with [`VibraCoreError::Shape`] when present traces differ in length.
    pub fn try_new(columns: ImpactForceColumns) -> Result<Self> {
        let mut lengths = columns
            .named()
            .into_iter()
            .filter_map(|(name, col)| col.map(|c| (name, c.len())));
        if let Some((first_name, first_len)) = lengths.next()
            && let Some((name, len)) = lengths.find(|(_, len)| *len != first_len)
        {
            return Err(VibraCoreError::Shape(format!(
                "All values in this table must have the same length: \
                 {first_name} has {first_len}, {name} has {len}"
            )));
        }
        drop(lengths);
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &ImpactForceColumns {
        &self.columns
    }

    /// Number of depth samples; zero when no trace is present.
    pub fn len(&self) -> usize {
        self.columns
            .named()
            .into_iter()
            .find_map(|(_, col)| col.map(Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of `/impact-force/calculation/single`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCalculationData {
    #[serde(rename = "data")]
    pub table: ImpactForceTable,
    /// [m w.r.t. reference]
    pub installation_level: f64,
    /// Total resistance [kN].
    pub maximum_force: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_force: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSingleCalculation {
    data: ImpactForceColumns,
    installation_level: f64,
    maximum_force: f64,
    #[serde(default)]
    point_force: Option<f64>,
}

impl SingleCalculationData {
    /// Parses the response; ragged traces fail with [`VibraCoreError::Shape`].
    pub fn from_api_response(response: &Value) -> Result<Self> {
        let raw = RawSingleCalculation::deserialize(response)?;
        Ok(Self {
            table: ImpactForceTable::try_new(raw.data)?,
            installation_level: raw.installation_level,
            maximum_force: raw.maximum_force,
            point_force: raw.point_force,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn multi() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [0.0, 0.0]},
                    "properties": {"id": "CPT-1", "x": 0.0, "y": 0.0, "max": 410.5, "base": 120.0, "Q90": 380.0, "Q95": 395.0}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [10.0, 5.0]},
                    "properties": {"id": "CPT-2", "x": 10.0, "y": 5.0, "max": 390.0, "base": 150.0, "Q90": 360.0, "Q95": 370.0, "alias": "B"}
                }
            ]
        })
    }

    #[test]
    fn multi_calculation_values_by_hue() {
        let data = MultiCalculationData::from_api_response(&multi()).unwrap();
        assert_eq!(data.values(Hue::Q95), vec![("CPT-1", 395.0), ("CPT-2", 370.0)]);
        assert_eq!(data.governing(Hue::Max).unwrap().id, "CPT-1");
        assert_eq!(data.governing(Hue::Base).unwrap().id, "CPT-2");
    }

    #[test]
    fn multi_calculation_round_trip_keeps_extra_properties() {
        let data = MultiCalculationData::from_api_response(&multi()).unwrap();
        assert_eq!(serde_json::to_value(&data).unwrap(), multi());
    }

    #[test]
    fn hue_rejects_unknown_column() {
        assert_eq!(Hue::parse("Q90").unwrap(), Hue::Q90);
        assert!(matches!(Hue::parse("min"), Err(VibraCoreError::InvalidInput(_))));
    }

    #[test]
    fn impact_force_table_rejects_ragged_traces() {
        let err = ImpactForceTable::try_new(ImpactForceColumns {
            depth_offset: Some(vec![0.0]),
            slot_resistance: Some(vec![]),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, VibraCoreError::Shape(_)));

        let table = ImpactForceTable::try_new(ImpactForceColumns {
            depth_offset: Some(vec![0.0, -1.0]),
            total_resistance: Some(vec![5.0, 6.0]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(ImpactForceTable::default().is_empty());
    }

    #[test]
    fn single_calculation_reports_ragged_traces_as_shape_error() {
        let response = json!({
            "data": {
                "depthOffset": [0.0, -1.0, -2.0],
                "totalResistance": [1.0, 2.0]
            },
            "installationLevel": -1.0,
            "maximumForce": 2.0
        });
        let err = SingleCalculationData::from_api_response(&response).unwrap_err();
        assert!(matches!(err, VibraCoreError::Shape(_)), "{err:?}");
    }

    #[test]
    fn single_calculation_parses_optional_point_force() {
        let response = json!({
            "data": {
                "depthOffset": [0.0, -1.0],
                "totalResistance": [10.0, 20.0],
                "pointResistance": null
            },
            "installationLevel": -1.0,
            "maximumForce": 20.0
        });
        let single = SingleCalculationData::from_api_response(&response).unwrap();
        assert_eq!(single.table.len(), 2);
        assert_eq!(single.point_force, None);
        assert_eq!(single.table.columns().point_resistance, None);

        let missing = json!({"data": {}, "installationLevel": -1.0});
        assert!(matches!(
            SingleCalculationData::from_api_response(&missing),
            Err(VibraCoreError::Json(_))
        ));
    }
}
