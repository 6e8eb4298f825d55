pub mod constants;
pub mod impact_force;
pub mod vibration;

use serde::{Deserialize, Serialize};

/// Report metadata appended to a calculation payload for the report routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProperties {
    pub author: String,
    pub project_number: String,
    pub project_name: String,
}

/// A calculation payload extended with `reportProperties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload<P> {
    #[serde(flatten)]
    pub payload: P,
    pub report_properties: ReportProperties,
}

impl<P: Clone> ReportPayload<P> {
    pub fn new(payload: &P, project_name: &str, project_id: &str, author: &str) -> Self {
        Self {
            payload: payload.clone(),
            report_properties: ReportProperties {
                author: author.to_string(),
                project_number: project_id.to_string(),
                project_name: project_name.to_string(),
            },
        }
    }
}
