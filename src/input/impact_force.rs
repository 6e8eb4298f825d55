//! Payloads for the `/impact-force/*` routes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ReportPayload;
use super::constants::sheet_pile_profile;
use crate::error::{Result, VibraCoreError};

/// Depth interval of the remote resistance integration [m].
pub const CUSTOM_INTERVAL: f64 = 0.5;
/// Unit weight of water [kN/m³].
pub const UNIT_WEIGHT_WATER: f64 = 9.81;
/// Default kneading factor ζ for the push strategy (CUR 166 6th edition).
pub const DEFAULT_ZETA: f64 = 0.6;

const MAX_CLAMP: f64 = 1e10;

/// Sheet pile that is installed.
///
/// For new sheet piles CUR 166 (6th edition) uses a slot resistance of
/// 5 kN/m for pushing and 10 kN/m for vibrating, with one sheet pushed or
/// two sheets vibrated at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibrationSource {
    /// Specific shaft area of a single sheet per unit length [m²/m].
    pub area_shaft_specific: f64,
    /// Specific tip area of a single sheet [m²].
    pub area_tip_specific: f64,
    /// Number of sheets installed together.
    #[serde(rename = "numSheets")]
    pub amount_of_sheet_piles: u32,
    pub sheet_pile_name: String,
    /// Specific slot resistance [kN/m].
    pub slot_resistance_specific: f64,
}

impl VibrationSource {
    pub fn new(area_shaft_specific: f64, area_tip_specific: f64, slot_resistance_specific: f64) -> Self {
        Self {
            area_shaft_specific,
            area_tip_specific,
            amount_of_sheet_piles: 1,
            sheet_pile_name: "User defined".to_string(),
            slot_resistance_specific,
        }
    }

    /// Looks the profile up in the sheet pile table with one sheet and a
    /// slot resistance of 10 kN/m.
    pub fn from_sheet_pile_name(name: &str) -> Result<Self> {
        Self::from_sheet_pile_name_with(name, 1, 10.0)
    }

    pub fn from_sheet_pile_name_with(
        name: &str,
        amount_of_sheet_piles: u32,
        slot_resistance_specific: f64,
    ) -> Result<Self> {
        let profile = sheet_pile_profile(name).ok_or_else(|| {
            VibraCoreError::Lookup(format!(
                "{name} is not a valid sheet pile name. Specify the shaft and tip area \
                 explicitly or extend the sheet pile table."
            ))
        })?;

        Ok(Self {
            area_shaft_specific: profile.area_shaft_specific,
            area_tip_specific: profile.area_tip_specific,
            amount_of_sheet_piles,
            sheet_pile_name: name.to_string(),
            slot_resistance_specific,
        })
    }
}

/// How the sleeve friction is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrictionStrategy {
    /// Use the local friction measured by the CPT.
    CPTFrictionStrategy,
    /// Derive friction from unit weights, phi and undrained shear strength.
    SlipFrictionStrategy,
}

/// Installation method used for the impact force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveStrategy {
    Vibrate,
    Push,
}

/// One cone penetration test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CptData {
    pub alias: String,
    /// Cone resistance per depth [MPa].
    pub cone_resistance: Vec<f64>,
    /// Local (sleeve) friction per depth [MPa].
    pub local_friction: Vec<f64>,
    /// Depth per sample [m w.r.t. reference].
    pub depth_offset: Vec<f64>,
    /// Surface level [m w.r.t. reference].
    pub vertical_position_offset: f64,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub groundwater_level_offset: Option<f64>,
}

/// Layer table returned by the CPT classification service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyTable {
    #[serde(default)]
    pub geotechnical_soil_name: Option<Vec<String>>,
    #[serde(default)]
    pub lower_boundary: Option<Vec<f64>>,
    #[serde(default)]
    pub upper_boundary: Option<Vec<f64>>,
    #[serde(default)]
    pub color: Option<Vec<String>>,
    #[serde(default)]
    pub main_component: Option<Vec<String>>,
    #[serde(default)]
    pub cohesion: Option<Vec<f64>>,
    #[serde(default, rename = "gamma_sat")]
    pub gamma_sat: Option<Vec<f64>>,
    #[serde(default, rename = "gamma_unsat")]
    pub gamma_unsat: Option<Vec<f64>>,
    #[serde(default)]
    pub phi: Option<Vec<f64>>,
    #[serde(default)]
    pub undrained_shear_strength: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CptObject {
    pub cone_resistance: Vec<f64>,
    pub depth_offset: Vec<f64>,
    pub local_friction: Vec<f64>,
    pub name: String,
    pub vertical_position_offset: f64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTable {
    pub gamma_sat: Option<Vec<f64>>,
    pub gamma_unsat: Option<Vec<f64>>,
    pub phi: Option<Vec<f64>>,
    pub soilcode: Option<Vec<String>>,
    #[serde(rename = "undrainedShearStrength")]
    pub undrained_shear_strength: Option<Vec<f64>>,
    /// Layer tops as levels [m w.r.t. reference].
    #[serde(rename = "upperBoundary")]
    pub upper_boundary: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilProperties {
    pub cpt_object: CptObject,
    pub custom_interval: f64,
    pub groundwater_level_offset: f64,
    pub layer_table: LayerTable,
    pub unit_weight_water: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactForceCalculation {
    pub drive_strategy: DriveStrategy,
    /// Installation level of the sheet pile [m w.r.t. reference].
    pub installation_level: f64,
    pub zeta: f64,
}

/// Payload for `/impact-force/calculation/multi` (with `S` a list) or
/// `/impact-force/calculation/single` (with `S` one entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactForcePayload<S = Vec<SoilProperties>> {
    pub soil_properties: S,
    pub vibration_source: VibrationSource,
    pub friction_strategy: FrictionStrategy,
    pub impact_force_calculation: ImpactForceCalculation,
}

pub type SingleImpactForcePayload = ImpactForcePayload<SoilProperties>;
pub type ImpactForceReportPayload = ReportPayload<ImpactForcePayload>;

fn clamp_all(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| v.clamp(0.0, MAX_CLAMP)).collect()
}

fn soil_properties(cpt: &CptData, table: &ClassifyTable) -> Result<SoilProperties> {
    let depth = cpt.depth_offset.len();
    if cpt.cone_resistance.len() != depth || cpt.local_friction.len() != depth {
        return Err(VibraCoreError::Shape(format!(
            "CPT {}: coneResistance ({}), localFriction ({}) and depthOffset ({depth}) differ in length",
            cpt.alias,
            cpt.cone_resistance.len(),
            cpt.local_friction.len(),
        )));
    }
    let upper_boundary = table
        .upper_boundary
        .as_ref()
        .ok_or_else(|| VibraCoreError::MissingField {
            missing: vec!["upperBoundary".to_string()],
        })?;

    Ok(SoilProperties {
        cpt_object: CptObject {
            cone_resistance: clamp_all(&cpt.cone_resistance),
            depth_offset: cpt.depth_offset.clone(),
            local_friction: clamp_all(&cpt.local_friction),
            name: cpt.alias.clone(),
            vertical_position_offset: cpt.vertical_position_offset,
            x: cpt.x,
            y: cpt.y,
        },
        custom_interval: CUSTOM_INTERVAL,
        // only an absent level falls back; a measured 0.0 is kept
        groundwater_level_offset: cpt
            .groundwater_level_offset
            .unwrap_or(cpt.vertical_position_offset - 1.0),
        layer_table: LayerTable {
            gamma_sat: table.gamma_sat.clone(),
            gamma_unsat: table.gamma_unsat.clone(),
            phi: table.phi.clone(),
            soilcode: table.main_component.clone(),
            undrained_shear_strength: table.undrained_shear_strength.clone(),
            upper_boundary: upper_boundary
                .iter()
                .map(|depth| cpt.vertical_position_offset - depth)
                .collect(),
        },
        unit_weight_water: UNIT_WEIGHT_WATER,
    })
}

/// Builds the payload for `/impact-force/calculation/multi`.
///
/// `classify_tables` maps each CPT alias to its classification layer table.
pub fn create_multi_cpt_impact_force_payload(
    cpts: &[CptData],
    classify_tables: &HashMap<String, ClassifyTable>,
    vibration_source: &VibrationSource,
    friction_strategy: FrictionStrategy,
    drive_strategy: DriveStrategy,
    installation_level_offset: f64,
    zeta: f64,
) -> Result<ImpactForcePayload> {
    let soil_properties = cpts
        .iter()
        .map(|cpt| {
            let table = classify_tables.get(&cpt.alias).ok_or_else(|| {
                VibraCoreError::Lookup(format!("no classify table for CPT {}", cpt.alias))
            })?;
            soil_properties(cpt, table)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ImpactForcePayload {
        soil_properties,
        vibration_source: vibration_source.clone(),
        friction_strategy,
        impact_force_calculation: ImpactForceCalculation {
            drive_strategy,
            installation_level: installation_level_offset,
            zeta,
        },
    })
}

/// Builds the payload for `/impact-force/report`.
pub fn create_multi_cpt_impact_force_report_payload(
    multi_cpt_payload: &ImpactForcePayload,
    project_name: &str,
    project_id: &str,
    author: &str,
) -> ImpactForceReportPayload {
    ReportPayload::new(multi_cpt_payload, project_name, project_id, author)
}

/// Builds the payload for `/impact-force/calculation/single` from a multi payload.
pub fn create_single_cpt_impact_force_payload(
    multi_cpt_payload: &ImpactForcePayload,
    name: &str,
) -> Result<SingleImpactForcePayload> {
    let props = multi_cpt_payload
        .soil_properties
        .iter()
        .find(|item| item.cpt_object.name == name)
        .ok_or_else(|| VibraCoreError::Lookup(format!("{name} is not a valid CPT name.")))?;

    Ok(ImpactForcePayload {
        soil_properties: props.clone(),
        vibration_source: multi_cpt_payload.vibration_source.clone(),
        friction_strategy: multi_cpt_payload.friction_strategy,
        impact_force_calculation: multi_cpt_payload.impact_force_calculation.clone(),
    })
}
