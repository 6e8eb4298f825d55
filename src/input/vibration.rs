//! Building inventory and payloads for the CUR 166 and PrePal routes.
//!
//! Buildings are kept as a GeoJSON feature collection whose property map acts
//! as the attribute table. [`BagWfs::get_buildings`] fills in the attributes
//! both methods need; callers may override any of them per building before
//! building a payload.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error};
use uuid::Uuid;

use super::ReportPayload;
use super::constants::soil_reference;
use crate::error::{Result, VibraCoreError};
use crate::geometry::{Feature, FeatureCollection, Geometry};

pub const BAG_WFS_URL: &str = "https://service.pdok.nl/lv/bag/wfs/v2_0";
/// Largest accepted side of a building query box [m].
pub const THRESHOLD: f64 = 10_000.0;

pub type BuildingProperties = Map<String, Value>;
pub type Buildings = FeatureCollection<BuildingProperties>;
pub type Building = Feature<BuildingProperties>;

/// Building category, SBR A table 10.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    One,
    Two,
}

/// Structural condition, SBR A table 10.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructuralCondition {
    Sensitive,
    Normal,
}

/// Foundation element, CUR 166 3rd edition table 5.19.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoundationElement {
    #[serde(rename = "shallow foundation")]
    ShallowFoundation,
    #[serde(rename = "concrete piles")]
    ConcretePiles,
    #[serde(rename = "timber piles")]
    TimberPiles,
    #[serde(rename = "steel piles")]
    SteelPiles,
}

/// Floor material, CUR 166 3rd edition table 5.20.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloorMaterial {
    Concrete,
    Wood,
}

/// Vibration type, SBR A table 10.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VibrationType {
    ShortTerm,
    RepeatedShortTerm,
    Continuous,
}

/// Measurement type, SBR A table 9.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementType {
    Indicative,
    Limited,
    Extensive,
}

/// Installation method, CUR 166 3rd edition tables 5.20 and 5.21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationType {
    Vibrate,
    Driving,
}

impl InstallationType {
    pub fn as_str(self) -> &'static str {
        match self {
            InstallationType::Vibrate => "vibrate",
            InstallationType::Driving => "driving",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingPart {
    Floor,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VibrationDirection {
    Vertical,
    Horizontal,
}

impl VibrationDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            VibrationDirection::Vertical => "vertical",
            VibrationDirection::Horizontal => "horizontal",
        }
    }
}

/// How the remote side derives the CUR 166 safety factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodeSafetyFactor {
    #[serde(rename = "CUR")]
    Cur,
    #[serde(rename = "exact")]
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PileShape {
    Square,
    Round,
}

/// Feature type requested from the building register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagFeature {
    Pand,
    Ligplaats,
    Verblijfsobject,
    Woonplaats,
    Standplaats,
}

impl BagFeature {
    pub fn as_str(self) -> &'static str {
        match self {
            BagFeature::Pand => "bag:pand",
            BagFeature::Ligplaats => "bag:ligplaats",
            BagFeature::Verblijfsobject => "bag:verblijfsobject",
            BagFeature::Woonplaats => "bag:woonplaats",
            BagFeature::Standplaats => "bag:standplaats",
        }
    }
}

/// Query box in RD New (EPSG:28992) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self> {
        if west > east {
            return Err(VibraCoreError::InvalidInput(
                "west coordinate is larger than east coordinate".into(),
            ));
        }
        if south > north {
            return Err(VibraCoreError::InvalidInput(
                "south coordinate is larger than north coordinate".into(),
            ));
        }
        if east - west > THRESHOLD {
            return Err(VibraCoreError::InvalidInput(format!(
                "x dimension of the bbox is {} meters, larger than threshold",
                east - west
            )));
        }
        if north - south > THRESHOLD {
            return Err(VibraCoreError::InvalidInput(format!(
                "y dimension of the bbox is {} meters, larger than threshold",
                north - south
            )));
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    fn to_query(self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}

/// Attribute values assigned to every fetched building.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingDefaults {
    pub category: Category,
    pub monumental: bool,
    pub structural_condition: StructuralCondition,
    pub vibration_sensitive: bool,
    /// Thickness of the settlement-sensitive layer [m].
    pub thickness: f64,
    pub foundation_element: FoundationElement,
    pub material_floor: FloorMaterial,
    pub feature: BagFeature,
    /// Results per page: 10, 20, 50, 100 or 1000.
    pub pagesize: u32,
}

impl Default for BuildingDefaults {
    fn default() -> Self {
        Self {
            category: Category::Two,
            monumental: false,
            structural_condition: StructuralCondition::Normal,
            vibration_sensitive: false,
            thickness: 8.0,
            foundation_element: FoundationElement::ShallowFoundation,
            material_floor: FloorMaterial::Concrete,
            feature: BagFeature::Pand,
            pagesize: 1000,
        }
    }
}

const PAGE_SIZES: [u32; 5] = [10, 20, 50, 100, 1000];

/// Building register (BAG) WFS source.
pub struct BagWfs {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl BagWfs {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            timeout,
        }
    }

    /// Fetches the building footprints inside `bbox` and assigns the
    /// attributes used by the CUR 166 and PrePal payloads.
    pub async fn get_buildings(
        &self,
        bbox: &BoundingBox,
        defaults: &BuildingDefaults,
    ) -> Result<Buildings> {
        if !PAGE_SIZES.contains(&defaults.pagesize) {
            return Err(VibraCoreError::InvalidInput(format!(
                "pagesize must be one of {PAGE_SIZES:?}, got {}",
                defaults.pagesize
            )));
        }

        let count = defaults.pagesize.to_string();
        let bbox_query = bbox.to_query();
        let params = [
            ("service", "WFS"),
            ("version", "2.0.0"),
            ("request", "GetFeature"),
            ("typeName", defaults.feature.as_str()),
            ("srsname", "EPSG:28992"),
            ("outputFormat", "json"),
            ("bbox", bbox_query.as_str()),
            ("count", count.as_str()),
        ];

        let response = self
            .client
            .get(&self.url)
            .header("Content-Type", "application/json")
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VibraCoreError::Wfs {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let mut buildings: Buildings = response.json().await?;
        debug!(count = buildings.features.len(), "fetched buildings");
        apply_defaults(&mut buildings, defaults)?;
        Ok(buildings)
    }
}

/// Assigns `name` (the feature index) and the default attributes.
pub fn apply_defaults(buildings: &mut Buildings, defaults: &BuildingDefaults) -> Result<()> {
    for (index, building) in buildings.features.iter_mut().enumerate() {
        let depth = building.geometry.area().sqrt().clamp(1.0, 18.0);
        let props = &mut building.properties;
        props.insert("name".into(), Value::String(index.to_string()));

        // sbr-A
        props.insert("category".into(), serde_json::to_value(defaults.category)?);
        props.insert(
            "structuralCondition".into(),
            serde_json::to_value(defaults.structural_condition)?,
        );
        props.insert("vibrationSensitive".into(), Value::Bool(defaults.vibration_sensitive));
        props.insert("thickness".into(), Value::from(defaults.thickness));
        props.insert("monumental".into(), Value::Bool(defaults.monumental));

        // prepal
        props.insert("buildingDepth".into(), Value::from(depth));
        props.insert("buildingDepthVibrationSensitive".into(), Value::from(1.0));

        // cur166
        props.insert(
            "foundationElement".into(),
            serde_json::to_value(defaults.foundation_element)?,
        );
        props.insert("material".into(), serde_json::to_value(defaults.material_floor)?);
    }
    Ok(())
}

impl FeatureCollection<BuildingProperties> {
    /// Fails with [`VibraCoreError::MissingField`] naming every required
    /// attribute that is absent on at least one building.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        match VibraCoreError::missing_from(required, |column| {
            self.features
                .iter()
                .all(|b| b.properties.contains_key(column))
        }) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Building> {
        self.features
            .iter()
            .find(|b| building_name(b).as_deref() == Some(name))
    }
}

/// Value of `name` rendered as a string, if present.
pub fn building_name(building: &Building) -> Option<String> {
    building.properties.get("name").map(|v| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn row<T: serde::de::DeserializeOwned>(building: &Building) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(building.properties.clone()))?)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingMetadata {
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrePalProperties {
    /// Minimum building depth [m].
    pub building_depth: f64,
    pub building_depth_vibration_sensitive: f64,
    pub calculation_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurProperties {
    pub building_part: BuildingPart,
    pub foundation_element: FoundationElement,
    pub installation_type: InstallationType,
    pub material: FloorMaterial,
    pub safety_factor: f64,
    pub vibration_direction: VibrationDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SbrAProperties {
    pub category: Category,
    /// Dominant frequency [Hz].
    pub frequency: f64,
    pub frequency_vibration_sensitive: f64,
    pub monumental: bool,
    pub structural_condition: StructuralCondition,
    pub thickness: f64,
    pub vibration_sensitive: bool,
    pub vibration_type: VibrationType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInformation {
    pub geometry: Geometry,
    pub metadata: BuildingMetadata,
    #[serde(
        rename = "properties_PrePal",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub properties_prepal: Option<PrePalProperties>,
    #[serde(
        rename = "properties_CUR",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub properties_cur: Option<CurProperties>,
    #[serde(rename = "properties_SBRa")]
    pub properties_sbra: SbrAProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PileSource {
    pub shape: PileShape,
    /// Pile size [m].
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilParameters {
    pub cone_resistance: f64,
    pub elastic_modulus: f64,
    pub poisson_ratio: f64,
    pub unit_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub hysteretic_damping_barkan: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<f64>,
    pub measurement_type: MeasurementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methode_safety_factor: Option<MethodeSafetyFactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_velocity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_coefficient: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub source_location: Geometry,
}

/// Payload for the `*/validation/multi` routes (`B` a list) or the
/// `*/validation/single` routes (`B` one building).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibrationPayload<B = Vec<BuildingInformation>> {
    pub building_information: B,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibration_source: Option<PileSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_properties: Option<SoilParameters>,
    pub prediction: Prediction,
    pub validation: Validation,
}

pub type SingleVibrationPayload = VibrationPayload<BuildingInformation>;
pub type VibrationReportPayload = ReportPayload<VibrationPayload>;

/// Optional PrePal inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PrePalOptions {
    /// Reduction of the cone resistance [%].
    pub reduction: f64,
    /// Soil unit weight [kN/m³].
    pub unit_weight: f64,
    pub elastic_modulus_factor: f64,
    pub poisson_ratio: f64,
    pub frequency: f64,
    pub vibration_type: VibrationType,
    pub frequency_vibration_sensitive: f64,
    pub measurement_type: MeasurementType,
    /// [1/m]
    pub hysteretic_damping_barkan: f64,
}

impl Default for PrePalOptions {
    fn default() -> Self {
        Self {
            reduction: 0.0,
            unit_weight: 20.0,
            elastic_modulus_factor: 15.0,
            poisson_ratio: 0.2,
            frequency: 20.0,
            vibration_type: VibrationType::Continuous,
            frequency_vibration_sensitive: 40.0,
            measurement_type: MeasurementType::Extensive,
            hysteretic_damping_barkan: -0.05,
        }
    }
}

/// Optional CUR 166 inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Cur166Options {
    /// Reduction of the impact force [%].
    pub reduction: f64,
    pub installation_type: InstallationType,
    pub building_part: BuildingPart,
    pub safety_factor: f64,
    pub vibration_direction: VibrationDirection,
    pub frequency: f64,
    pub vibration_type: VibrationType,
    pub frequency_vibration_sensitive: f64,
    /// CUR 166-1997 tables 5.16 and 5.17.
    pub reference_location: String,
    pub measurement_type: MeasurementType,
    pub methode_safety_factor: MethodeSafetyFactor,
}

impl Default for Cur166Options {
    fn default() -> Self {
        Self {
            reduction: 0.0,
            installation_type: InstallationType::Vibrate,
            building_part: BuildingPart::Floor,
            safety_factor: 0.05,
            vibration_direction: VibrationDirection::Vertical,
            frequency: 30.0,
            vibration_type: VibrationType::Continuous,
            frequency_vibration_sensitive: 40.0,
            reference_location: "Amsterdam".to_string(),
            measurement_type: MeasurementType::Extensive,
            methode_safety_factor: MethodeSafetyFactor::Exact,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SbrARow {
    category: Category,
    monumental: bool,
    structural_condition: StructuralCondition,
    thickness: f64,
    vibration_sensitive: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrePalRow {
    building_depth: f64,
    #[serde(default = "default_depth_vibration_sensitive")]
    building_depth_vibration_sensitive: f64,
}

fn default_depth_vibration_sensitive() -> f64 {
    1.0
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurRow {
    foundation_element: FoundationElement,
    material: FloorMaterial,
}

fn metadata(building: &Building) -> BuildingMetadata {
    BuildingMetadata {
        id: building_name(building).unwrap_or_else(|| Uuid::new_v4().to_string()),
    }
}

fn sbra(
    building: &Building,
    frequency: f64,
    frequency_vibration_sensitive: f64,
    vibration_type: VibrationType,
) -> Result<SbrAProperties> {
    let r: SbrARow = row(building)?;
    Ok(SbrAProperties {
        category: r.category,
        frequency,
        frequency_vibration_sensitive,
        monumental: r.monumental,
        structural_condition: r.structural_condition,
        thickness: r.thickness,
        vibration_sensitive: r.vibration_sensitive,
        vibration_type,
    })
}

/// Builds the payload for `/prepal/validation/multi`.
///
/// `cone_resistance` is in MPa and `pile_size` in m.
pub fn create_prepal_payload(
    buildings: &Buildings,
    location: &Geometry,
    pile_shape: PileShape,
    pile_size: f64,
    cone_resistance: f64,
    options: &PrePalOptions,
) -> Result<VibrationPayload> {
    buildings.require_columns(&[
        "category",
        "structuralCondition",
        "vibrationSensitive",
        "thickness",
        "buildingDepth",
        "monumental",
    ])?;

    let building_information = buildings
        .features
        .iter()
        .map(|building| {
            let prepal: PrePalRow = row(building)?;
            Ok(BuildingInformation {
                geometry: building.geometry.clone(),
                metadata: metadata(building),
                properties_prepal: Some(PrePalProperties {
                    building_depth: prepal.building_depth,
                    building_depth_vibration_sensitive: prepal.building_depth_vibration_sensitive,
                    calculation_height: None,
                }),
                properties_cur: None,
                properties_sbra: sbra(
                    building,
                    options.frequency,
                    options.frequency_vibration_sensitive,
                    options.vibration_type,
                )?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VibrationPayload {
        building_information,
        vibration_source: Some(PileSource {
            shape: pile_shape,
            size: pile_size,
        }),
        soil_properties: Some(SoilParameters {
            cone_resistance: cone_resistance * (100.0 - options.reduction) / 100.0,
            elastic_modulus: cone_resistance * options.elastic_modulus_factor,
            poisson_ratio: options.poisson_ratio,
            unit_weight: options.unit_weight,
        }),
        prediction: Prediction {
            hysteretic_damping_barkan: options.hysteretic_damping_barkan,
            force: None,
            measurement_type: options.measurement_type,
            methode_safety_factor: None,
            references_velocity: None,
            variation_coefficient: None,
        },
        validation: Validation {
            source_location: location.clone(),
        },
    })
}

/// Builds the payload for `/cur166/validation/multi`. `force` is the impact
/// force of the pile in kN.
pub fn create_cur166_payload(
    buildings: &Buildings,
    location: &Geometry,
    force: f64,
    options: &Cur166Options,
) -> Result<VibrationPayload> {
    let reference = soil_reference(
        &options.reference_location,
        options.installation_type.as_str(),
        options.vibration_direction.as_str(),
    )
    .ok_or_else(|| {
        VibraCoreError::Lookup(format!(
            "No reference values found for reference location: {} with installation type: {} \
             and vibration direction: {}.",
            options.reference_location,
            options.installation_type.as_str(),
            options.vibration_direction.as_str(),
        ))
    })?;

    buildings.require_columns(&[
        "foundationElement",
        "material",
        "category",
        "monumental",
        "structuralCondition",
        "thickness",
        "vibrationSensitive",
    ])?;

    let building_information = buildings
        .features
        .iter()
        .map(|building| {
            let cur: CurRow = row(building)?;
            Ok(BuildingInformation {
                geometry: building.geometry.clone(),
                metadata: metadata(building),
                properties_prepal: None,
                properties_cur: Some(CurProperties {
                    building_part: options.building_part,
                    foundation_element: cur.foundation_element,
                    installation_type: options.installation_type,
                    material: cur.material,
                    safety_factor: options.safety_factor,
                    vibration_direction: options.vibration_direction,
                }),
                properties_sbra: sbra(
                    building,
                    options.frequency,
                    options.frequency_vibration_sensitive,
                    options.vibration_type,
                )?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VibrationPayload {
        building_information,
        vibration_source: None,
        soil_properties: None,
        prediction: Prediction {
            hysteretic_damping_barkan: reference.alpha,
            force: Some(force * (100.0 - options.reduction) / 100.0),
            measurement_type: options.measurement_type,
            methode_safety_factor: Some(options.methode_safety_factor),
            references_velocity: Some(reference.uo),
            variation_coefficient: Some(reference.vo),
        },
        validation: Validation {
            source_location: location.clone(),
        },
    })
}

/// Name of the building of `category` closest to `location`.
pub fn get_normative_building(
    buildings: &Buildings,
    location: &Geometry,
    category: Category,
) -> Option<String> {
    let wanted = serde_json::to_value(category).ok()?;
    let nearest = nearest_building(buildings, location, |b| {
        b.properties.get("category") == Some(&wanted)
    });
    if nearest.is_none() {
        error!(?category, "no buildings with category");
    }
    nearest
}

/// Name of the building closest to `location` among those passing `filter`.
pub(crate) fn nearest_building(
    buildings: &Buildings,
    location: &Geometry,
    filter: impl Fn(&Building) -> bool,
) -> Option<String> {
    buildings
        .features
        .iter()
        .filter(|b| filter(b))
        .map(|b| (b.geometry.distance(location), b))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .and_then(|(_, b)| building_name(b))
}

/// Builds the payload for `/cur166/validation/single` or
/// `/prepal/validation/single` from a multi payload.
pub fn create_single_payload(
    multi_vibration_payload: &VibrationPayload,
    name: &str,
) -> Result<SingleVibrationPayload> {
    let props = multi_vibration_payload
        .building_information
        .iter()
        .find(|item| item.metadata.id == name)
        .ok_or_else(|| VibraCoreError::Lookup(format!("{name} is not a valid building name.")))?;

    Ok(VibrationPayload {
        building_information: props.clone(),
        vibration_source: multi_vibration_payload.vibration_source.clone(),
        soil_properties: multi_vibration_payload.soil_properties.clone(),
        prediction: multi_vibration_payload.prediction.clone(),
        validation: multi_vibration_payload.validation.clone(),
    })
}

/// Builds the payload for `/cur166/report` or `/prepal/report`.
pub fn create_vibration_report_payload(
    multi_vibration_payload: &VibrationPayload,
    project_name: &str,
    project_id: &str,
    author: &str,
) -> VibrationReportPayload {
    ReportPayload::new(multi_vibration_payload, project_name, project_id, author)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geometry::Position;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn square(x0: f64, y0: f64, size: f64) -> Geometry {
        Geometry::Polygon(vec![vec![
            Position::new(x0, y0),
            Position::new(x0 + size, y0),
            Position::new(x0 + size, y0 + size),
            Position::new(x0, y0 + size),
            Position::new(x0, y0),
        ]])
    }

    pub(crate) fn raw_buildings() -> Buildings {
        FeatureCollection::new(vec![
            Feature::new(
                square(10.0, 0.0, 10.0),
                json!({"gebruiksdoel": "woonfunctie"}).as_object().unwrap().clone(),
            ),
            Feature::new(
                square(40.0, 0.0, 20.0),
                json!({"gebruiksdoel": "industriefunctie,kantoorfunctie"})
                    .as_object()
                    .unwrap()
                    .clone(),
            ),
            Feature::new(
                square(0.0, 30.0, 0.5),
                json!({"gebruiksdoel": "onderwijsfunctie"}).as_object().unwrap().clone(),
            ),
        ])
    }

    pub(crate) fn buildings() -> Buildings {
        let mut buildings = raw_buildings();
        apply_defaults(&mut buildings, &BuildingDefaults::default()).unwrap();
        buildings
    }

    pub(crate) fn source() -> Geometry {
        square(0.0, 0.0, 5.0)
    }

    #[test]
    fn bounding_box_is_validated() {
        assert!(BoundingBox::new(1.0, 2.0, 3.0, 4.0).is_ok());
        assert!(matches!(
            BoundingBox::new(3.0, 2.0, 1.0, 4.0),
            Err(VibraCoreError::InvalidInput(_))
        ));
        assert!(matches!(
            BoundingBox::new(1.0, 4.0, 3.0, 2.0),
            Err(VibraCoreError::InvalidInput(_))
        ));
        assert!(BoundingBox::new(0.0, 0.0, 10_001.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 10_001.0).is_err());
    }

    #[test]
    fn defaults_fill_every_column() {
        let buildings = buildings();
        let first = &buildings.features[0].properties;
        assert_eq!(first["name"], "0");
        assert_eq!(first["category"], "two");
        assert_eq!(first["structuralCondition"], "normal");
        assert_eq!(first["foundationElement"], "shallow foundation");
        assert_eq!(first["material"], "concrete");
        assert_eq!(first["buildingDepth"], 10.0);
        assert_eq!(buildings.features[1].properties["buildingDepth"], 18.0);
        assert_eq!(buildings.features[2].properties["buildingDepth"], 1.0);
    }

    #[tokio::test]
    async fn get_buildings_queries_wfs() {
        let server = MockServer::start().await;
        let body = serde_json::to_value(raw_buildings()).unwrap();
        Mock::given(method("GET"))
            .and(query_param("typeName", "bag:pand"))
            .and(query_param("bbox", "1,2,3,4"))
            .and(query_param("count", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let wfs = BagWfs::new(server.uri(), Duration::from_secs(5));
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let buildings = wfs
            .get_buildings(&bbox, &BuildingDefaults::default())
            .await
            .unwrap();

        assert_eq!(buildings.features.len(), 3);
        assert_eq!(buildings.features[2].properties["name"], "2");
    }

    #[tokio::test]
    async fn get_buildings_surfaces_wfs_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let wfs = BagWfs::new(server.uri(), Duration::from_secs(5));
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let err = wfs
            .get_buildings(&bbox, &BuildingDefaults::default())
            .await
            .unwrap_err();

        match err {
            VibraCoreError::Wfs { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn get_buildings_rejects_unknown_pagesize() {
        let wfs = BagWfs::new("http://127.0.0.1:9", Duration::from_secs(1));
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let defaults = BuildingDefaults {
            pagesize: 7,
            ..Default::default()
        };
        let err = wfs.get_buildings(&bbox, &defaults).await.unwrap_err();
        assert!(matches!(err, VibraCoreError::InvalidInput(_)));
    }

    #[test]
    fn cur166_payload_uses_reference_row() {
        let payload =
            create_cur166_payload(&buildings(), &source(), 500.0, &Cur166Options::default()).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value["prediction"],
            json!({
                "hystereticDampingBarkan": 0.02,
                "force": 500.0,
                "measurementType": "extensive",
                "methodeSafetyFactor": "exact",
                "referencesVelocity": 1.1,
                "variationCoefficient": 0.9
            })
        );
        let first = &value["buildingInformation"][0];
        assert_eq!(first["metadata"]["ID"], "0");
        assert_eq!(first["properties_CUR"]["foundationElement"], "shallow foundation");
        assert_eq!(first["properties_CUR"]["installationType"], "vibrate");
        assert_eq!(first["properties_SBRa"]["vibrationType"], "continuous");
        assert_eq!(first["properties_SBRa"]["frequency"], 30.0);
        assert!(first.get("properties_PrePal").is_none());
        assert!(value.get("soilProperties").is_none());
        assert_eq!(value["validation"]["sourceLocation"]["type"], "Polygon");
    }

    #[test]
    fn cur166_force_reduction() {
        let options = Cur166Options {
            reduction: 20.0,
            ..Default::default()
        };
        let payload = create_cur166_payload(&buildings(), &source(), 500.0, &options).unwrap();
        assert_eq!(payload.prediction.force, Some(400.0));
    }

    #[test]
    fn cur166_unknown_reference_location() {
        let options = Cur166Options {
            reference_location: "Utrecht".into(),
            ..Default::default()
        };
        let err = create_cur166_payload(&buildings(), &source(), 500.0, &options).unwrap_err();
        assert!(matches!(err, VibraCoreError::Lookup(_)));
    }

    #[test]
    fn cur166_missing_columns_are_named() {
        let err = create_cur166_payload(&raw_buildings(), &source(), 500.0, &Cur166Options::default())
            .unwrap_err();
        match err {
            VibraCoreError::MissingField { missing } => {
                assert!(missing.contains(&"foundationElement".to_string()));
                assert!(missing.contains(&"vibrationSensitive".to_string()));
                assert_eq!(missing.len(), 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prepal_payload_scales_soil_properties() {
        let options = PrePalOptions {
            reduction: 25.0,
            ..Default::default()
        };
        let payload =
            create_prepal_payload(&buildings(), &source(), PileShape::Round, 0.4, 10.0, &options).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value["soilProperties"],
            json!({"coneResistance": 7.5, "elasticModulus": 150.0, "poissonRatio": 0.2, "unitWeight": 20.0})
        );
        assert_eq!(value["vibrationSource"], json!({"shape": "round", "size": 0.4}));
        assert_eq!(
            value["prediction"],
            json!({"hystereticDampingBarkan": -0.05, "measurementType": "extensive"})
        );
        let first = &value["buildingInformation"][0];
        assert_eq!(
            first["properties_PrePal"],
            json!({"buildingDepth": 10.0, "buildingDepthVibrationSensitive": 1.0, "calculationHeight": null})
        );
        assert!(first.get("properties_CUR").is_none());
    }

    #[test]
    fn prepal_missing_building_depth() {
        let mut buildings = buildings();
        buildings.features[1].properties.remove("buildingDepth");
        let err = create_prepal_payload(
            &buildings,
            &source(),
            PileShape::Square,
            0.3,
            5.0,
            &PrePalOptions::default(),
        )
        .unwrap_err();
        match err {
            VibraCoreError::MissingField { missing } => assert_eq!(missing, vec!["buildingDepth"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn prepal_missing_monumental() {
        let mut buildings = buildings();
        buildings.features[1].properties.remove("monumental");
        let err = create_prepal_payload(
            &buildings,
            &source(),
            PileShape::Round,
            0.3,
            5.0,
            &PrePalOptions::default(),
        )
        .unwrap_err();
        match err {
            VibraCoreError::MissingField { missing } => assert_eq!(missing, vec!["monumental"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn find_by_name_matches_numeric_names() {
        let mut buildings = buildings();
        buildings.features[2].properties.insert("name".into(), json!(7));
        let found = buildings.find_by_name("7").unwrap();
        assert_eq!(found.properties["gebruiksdoel"], "onderwijsfunctie");
        assert_eq!(
            buildings.find_by_name("0").map(building_name),
            Some(Some("0".to_string()))
        );
        assert!(buildings.find_by_name("8").is_none());
    }

    #[test]
    fn unnamed_building_gets_uuid() {
        let mut buildings = buildings();
        buildings.features[0].properties.remove("name");
        let payload =
            create_cur166_payload(&buildings, &source(), 100.0, &Cur166Options::default()).unwrap();
        let id = &payload.building_information[0].metadata.id;
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn normative_building_is_nearest_of_category() {
        let mut buildings = buildings();
        assert_eq!(
            get_normative_building(&buildings, &source(), Category::Two),
            Some("0".to_string())
        );
        assert_eq!(get_normative_building(&buildings, &source(), Category::One), None);

        buildings.features[2]
            .properties
            .insert("category".into(), json!("one"));
        assert_eq!(
            get_normative_building(&buildings, &source(), Category::One),
            Some("2".to_string())
        );
    }

    #[test]
    fn single_payload_selects_building() {
        let payload =
            create_cur166_payload(&buildings(), &source(), 500.0, &Cur166Options::default()).unwrap();

        let single = create_single_payload(&payload, "0").unwrap();
        assert_eq!(single.building_information, payload.building_information[0]);
        assert_eq!(single.prediction, payload.prediction);

        let err = create_single_payload(&payload, "-1").unwrap_err();
        assert!(matches!(err, VibraCoreError::Lookup(_)));
    }

    #[test]
    fn report_payload_keeps_calculation_fields() {
        let payload =
            create_cur166_payload(&buildings(), &source(), 500.0, &Cur166Options::default()).unwrap();
        let report = create_vibration_report_payload(&payload, "Test project", "123", "Test User");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["reportProperties"]["projectNumber"], "123");
        assert_eq!(value["buildingInformation"].as_array().unwrap().len(), 3);

        let back: VibrationReportPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back.payload, payload);
    }
}
