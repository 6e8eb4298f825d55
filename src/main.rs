mod cli;
mod ui;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ReportArgs};
use vibracore::api::{self, HttpRpcClient};
use vibracore::input::impact_force::{
    ClassifyTable, CptData, VibrationSource, create_multi_cpt_impact_force_payload,
    create_multi_cpt_impact_force_report_payload,
};
use vibracore::input::vibration::{
    BagWfs, BoundingBox, BuildingDefaults, Buildings, Category, Cur166Options, PrePalOptions,
    VibrationPayload, create_cur166_payload, create_prepal_payload, create_single_payload,
    create_vibration_report_payload, get_normative_building,
};
use vibracore::results::{
    SingleVibrationResult, SoundLevel, get_normative_sound_building, nuisance_distances,
    sound_prediction,
};
use vibracore::{Geometry, VibraCoreConfig};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn rpc_client(config: &VibraCoreConfig) -> Result<HttpRpcClient> {
    if config.token.is_empty() {
        warn!("no token configured; set NUCLEI_TOKEN or `token` in the config file");
    }
    Ok(HttpRpcClient::with_base_url(
        config.token.clone(),
        config.base_url.clone(),
    )?)
}

fn print_single(payload: &VibrationPayload, name: &str) -> Result<()> {
    let single = create_single_payload(payload, name)?;
    println!("{}", serde_json::to_string_pretty(&single)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => VibraCoreConfig::load_from(path)?,
        None => VibraCoreConfig::load()?,
    };
    let poll = config.poll_config();

    match cli.command {
        Command::Buildings {
            west,
            south,
            east,
            north,
            output,
        } => {
            let bbox = BoundingBox::new(west, south, east, north)?;
            let wfs = BagWfs::new(config.wfs_url.clone(), config.wfs_timeout());
            let progress = ui::TaskProgress::start("Fetching buildings");
            let buildings = progress.finish(
                wfs.get_buildings(&bbox, &BuildingDefaults::default()).await,
            )?;
            ui::print_buildings(&buildings);
            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&buildings)?)
                    .with_context(|| format!("writing {}", path.display()))?;
                info!(path = %path.display(), "buildings written");
            }
        }

        Command::Sound {
            buildings,
            source,
            building,
            power,
            k2,
            period,
        } => {
            let buildings: Buildings = read_json(&buildings)?;
            let name = match (building, source) {
                (Some(name), _) => name,
                (None, Some(source)) => {
                    let source: Geometry = read_json(&source)?;
                    get_normative_sound_building(&buildings, &source)
                        .context("no residential, healthcare or education building found")?
                }
                (None, None) => anyhow::bail!("either --building or --source is required"),
            };
            if buildings.find_by_name(&name).is_none() {
                anyhow::bail!("No buildings with name {name}.");
            }

            let levels = SoundLevel::defaults();
            let values: Vec<f64> = levels.iter().map(|l| l.level).collect();
            let distances = sound_prediction(power, k2, period, &values)?;
            ui::print_sound(&name, &levels, &distances);
        }

        Command::Nuisance {
            buildings,
            response,
            building,
            vibration_type,
            installation_type,
            period,
        } => {
            let buildings: Buildings = read_json(&buildings)?;
            let response =
                SingleVibrationResult::from_api_response(&read_json(&response)?)?;
            let table = nuisance_distances(
                &buildings,
                &response,
                &building,
                vibration_type.into(),
                installation_type.into(),
                period,
            )?;
            ui::print_nuisance(&table);
        }

        Command::Cur166 {
            buildings,
            source,
            force,
            reference_location,
            installation_type,
            single,
            report,
        } => {
            let buildings: Buildings = read_json(&buildings)?;
            let source: Geometry = read_json(&source)?;
            let options = Cur166Options {
                reference_location,
                installation_type: installation_type.into(),
                ..Default::default()
            };
            let payload = create_cur166_payload(&buildings, &source, force, &options)?;
            if let Some(name) = single {
                return print_single(&payload, &name);
            }
            print_normative_buildings(&buildings, &source);

            let client = rpc_client(&config)?;
            let progress = ui::TaskProgress::start("CUR166 prediction");
            let results =
                progress.finish(api::get_cur166_calculation(&client, &payload, &poll).await)?;
            ui::print_vibration_results(&results);

            if let Some(path) = &report.report {
                let report_payload = vibration_report(&payload, &report);
                let progress = ui::TaskProgress::start("CUR166 report");
                let document =
                    progress.finish(api::get_cur166_report(&client, &report_payload, &poll).await)?;
                write_report(path, &document)?;
            }
        }

        Command::Prepal {
            buildings,
            source,
            pile_shape,
            pile_size,
            cone_resistance,
            single,
            report,
        } => {
            let buildings: Buildings = read_json(&buildings)?;
            let source: Geometry = read_json(&source)?;
            let payload = create_prepal_payload(
                &buildings,
                &source,
                pile_shape.into(),
                pile_size,
                cone_resistance,
                &PrePalOptions::default(),
            )?;
            if let Some(name) = single {
                return print_single(&payload, &name);
            }
            print_normative_buildings(&buildings, &source);

            let client = rpc_client(&config)?;
            let progress = ui::TaskProgress::start("PrePal prediction");
            let results =
                progress.finish(api::get_prepal_calculation(&client, &payload, &poll).await)?;
            ui::print_vibration_results(&results);

            if let Some(path) = &report.report {
                let report_payload = vibration_report(&payload, &report);
                let progress = ui::TaskProgress::start("PrePal report");
                let document =
                    progress.finish(api::get_prepal_report(&client, &report_payload, &poll).await)?;
                write_report(path, &document)?;
            }
        }

        Command::ImpactForce {
            cpt,
            classify,
            sheet_pile,
            installation_level,
            friction,
            drive,
            zeta,
            hue,
            report,
        } => {
            let cpts = cpt
                .iter()
                .map(|path| read_json::<CptData>(path))
                .collect::<Result<Vec<_>>>()?;
            let mut tables: HashMap<String, ClassifyTable> = HashMap::new();
            for path in &classify {
                tables.extend(read_json::<HashMap<String, ClassifyTable>>(path)?);
            }
            let source = VibrationSource::from_sheet_pile_name(&sheet_pile)?;
            let payload = create_multi_cpt_impact_force_payload(
                &cpts,
                &tables,
                &source,
                friction.into(),
                drive.into(),
                installation_level,
                zeta,
            )?;

            let client = rpc_client(&config)?;
            let progress = ui::TaskProgress::start("Impact force calculation");
            let data = progress
                .finish(api::get_impact_force_calculation(&client, &payload, &poll).await)?;
            ui::print_impact_force(&data, hue.into());

            if let Some(path) = &report.report {
                let report_payload = create_multi_cpt_impact_force_report_payload(
                    &payload,
                    &report.project_name,
                    &report.project_id,
                    &report.author,
                );
                let progress = ui::TaskProgress::start("Impact force report");
                let document = progress
                    .finish(api::get_impact_force_report(&client, &report_payload, &poll).await)?;
                write_report(path, &document)?;
            }
        }
    }

    Ok(())
}

fn print_normative_buildings(buildings: &Buildings, source: &Geometry) {
    for category in [Category::One, Category::Two] {
        let name = get_normative_building(buildings, source, category);
        ui::print_normative(category, name.as_deref());
    }
}

fn vibration_report(
    payload: &VibrationPayload,
    report: &ReportArgs,
) -> vibracore::input::vibration::VibrationReportPayload {
    create_vibration_report_payload(
        payload,
        &report.project_name,
        &report.project_id,
        &report.author,
    )
}

fn write_report(path: &Path, document: &[u8]) -> Result<()> {
    std::fs::write(path, document).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = document.len(), "report written");
    Ok(())
}
