use serde::Serialize;
use tracing::info;

use super::client::RpcClient;
use super::ticket::{
    PollConfig, RESULTS_ROUTE, SERVICE, Ticket, TicketRecord, wait_until_ticket_is_ready,
};
use crate::error::{Result, VibraCoreError};
use crate::input::impact_force::{ImpactForcePayload, ImpactForceReportPayload};
use crate::input::vibration::{VibrationPayload, VibrationReportPayload};
use crate::results::impact_force::MultiCalculationData;
use crate::results::vibration::VibrationResults;

pub const IMPACT_FORCE_REPORT: &str = "/impact-force/report";
pub const IMPACT_FORCE_MULTI: &str = "/impact-force/calculation/multi";
pub const PREPAL_MULTI: &str = "/prepal/validation/multi";
pub const CUR166_MULTI: &str = "/cur166/validation/multi";
pub const CUR166_REPORT: &str = "/cur166/report";
pub const PREPAL_REPORT: &str = "/prepal/report";

/// Raw result of a finished task.
#[derive(Debug, Clone)]
pub struct TaskOutput {
    pub route: String,
    pub record: TicketRecord,
    pub body: Vec<u8>,
}

/// Submits `payload` to `route`, waits for the ticket and fetches the result.
pub async fn run_task(
    client: &impl RpcClient,
    route: &str,
    payload: &impl Serialize,
    config: &PollConfig,
) -> Result<TaskOutput> {
    let body = serde_json::to_value(payload)?;
    let ticket = Ticket::from(client.call_endpoint(SERVICE, route, &body).await?);

    let record = wait_until_ticket_is_ready(client, &ticket, config).await?;

    let response = client
        .call_endpoint(SERVICE, RESULTS_ROUTE, &ticket.descriptor()?)
        .await?;
    if !response.is_success() {
        return Err(VibraCoreError::ResultFetch {
            status: response.status,
            body: response.text(),
        });
    }

    Ok(TaskOutput {
        route: route.to_string(),
        record,
        body: response.body,
    })
}

/// Wrapper around `/impact-force/report`; returns the report document.
pub async fn get_impact_force_report(
    client: &impl RpcClient,
    payload: &ImpactForceReportPayload,
    config: &PollConfig,
) -> Result<Vec<u8>> {
    info!("Generate report... depending on the amount of CPT's this can take a while.");
    Ok(run_task(client, IMPACT_FORCE_REPORT, payload, config).await?.body)
}

/// Wrapper around `/impact-force/calculation/multi`.
pub async fn get_impact_force_calculation(
    client: &impl RpcClient,
    payload: &ImpactForcePayload,
    config: &PollConfig,
) -> Result<MultiCalculationData> {
    info!("Calculation impact force... depending on the amount of CPT's this can take a while.");
    let output = run_task(client, IMPACT_FORCE_MULTI, payload, config).await?;
    MultiCalculationData::from_slice(&output.body)
}

/// Wrapper around `/prepal/validation/multi`.
pub async fn get_prepal_calculation(
    client: &impl RpcClient,
    payload: &VibrationPayload,
    config: &PollConfig,
) -> Result<VibrationResults> {
    info!("Prepal prediction... depending on the amount of buildings this can take a while.");
    let output = run_task(client, PREPAL_MULTI, payload, config).await?;
    VibrationResults::from_slice(&output.body)
}

/// Wrapper around `/cur166/validation/multi`.
pub async fn get_cur166_calculation(
    client: &impl RpcClient,
    payload: &VibrationPayload,
    config: &PollConfig,
) -> Result<VibrationResults> {
    info!("CUR166 prediction... depending on the amount of buildings this can take a while.");
    let output = run_task(client, CUR166_MULTI, payload, config).await?;
    VibrationResults::from_slice(&output.body)
}

/// Wrapper around `/cur166/report`; returns the report document.
pub async fn get_cur166_report(
    client: &impl RpcClient,
    payload: &VibrationReportPayload,
    config: &PollConfig,
) -> Result<Vec<u8>> {
    info!("Generate report... depending on the amount of buildings this can take a while.");
    Ok(run_task(client, CUR166_REPORT, payload, config).await?.body)
}

/// Wrapper around `/prepal/report`; returns the report document.
pub async fn get_prepal_report(
    client: &impl RpcClient,
    payload: &VibrationReportPayload,
    config: &PollConfig,
) -> Result<Vec<u8>> {
    info!("Generate report... depending on the amount of buildings this can take a while.");
    Ok(run_task(client, PREPAL_REPORT, payload, config).await?.body)
}
