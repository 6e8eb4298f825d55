//! Command line interface of the `vibracore` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vibracore::input::impact_force::{DEFAULT_ZETA, DriveStrategy, FrictionStrategy};
use vibracore::input::vibration::{InstallationType, PileShape, VibrationType};
use vibracore::results::Hue;

/// Vibration and impact force predictions through the VibraCore service.
#[derive(Debug, Parser)]
#[command(name = "vibracore", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Configuration file; defaults to `vibracore.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch building footprints from the BAG register.
    Buildings {
        #[arg(long, allow_hyphen_values = true)]
        west: f64,
        #[arg(long, allow_hyphen_values = true)]
        south: f64,
        #[arg(long, allow_hyphen_values = true)]
        east: f64,
        #[arg(long, allow_hyphen_values = true)]
        north: f64,

        /// Write the buildings as GeoJSON to this file.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Distance per sound level around a building.
    Sound {
        /// Buildings GeoJSON.
        #[arg(long)]
        buildings: PathBuf,

        /// Source location geometry (GeoJSON). Used to pick the nearest
        /// sensitive building when `--building` is omitted.
        #[arg(long)]
        source: Option<PathBuf>,

        #[arg(long)]
        building: Option<String>,

        /// Source power [dB].
        #[arg(long)]
        power: f64,

        /// Correction term [dB].
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        k2: f64,

        /// Daily operating period [hours].
        #[arg(long, default_value_t = 12.0)]
        period: f64,
    },

    /// Nuisance distances per duration from a single-building response.
    Nuisance {
        #[arg(long)]
        buildings: PathBuf,

        /// JSON response of a single CUR 166 or PrePal calculation.
        #[arg(long)]
        response: PathBuf,

        #[arg(long)]
        building: String,

        #[arg(long, value_enum, default_value_t = VibrationTypeArg::Continuous)]
        vibration_type: VibrationTypeArg,

        #[arg(long, value_enum, default_value_t = InstallationTypeArg::Vibrate)]
        installation_type: InstallationTypeArg,

        /// Daily operating period [hours].
        #[arg(long, default_value_t = 10.0)]
        period: f64,
    },

    /// CUR 166 vibration prediction for every building.
    Cur166 {
        #[arg(long)]
        buildings: PathBuf,

        #[arg(long)]
        source: PathBuf,

        /// Impact force of the pile [kN].
        #[arg(long)]
        force: f64,

        #[arg(long, default_value = "Amsterdam")]
        reference_location: String,

        #[arg(long, value_enum, default_value_t = InstallationTypeArg::Vibrate)]
        installation_type: InstallationTypeArg,

        /// Print the single-building payload for this building and exit.
        #[arg(long)]
        single: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// PrePal vibration prediction for every building.
    Prepal {
        #[arg(long)]
        buildings: PathBuf,

        #[arg(long)]
        source: PathBuf,

        #[arg(long, value_enum)]
        pile_shape: PileShapeArg,

        /// Pile size [m].
        #[arg(long)]
        pile_size: f64,

        /// Cone resistance [MPa].
        #[arg(long)]
        cone_resistance: f64,

        /// Print the single-building payload for this building and exit.
        #[arg(long)]
        single: Option<String>,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Impact force calculation over several CPTs.
    ImpactForce {
        /// CPT data files (JSON).
        #[arg(long, required = true, num_args = 1..)]
        cpt: Vec<PathBuf>,

        /// Classify table files, each a JSON object keyed by CPT alias.
        #[arg(long, required = true, num_args = 1..)]
        classify: Vec<PathBuf>,

        /// Sheet pile profile, e.g. `AZ12-770`.
        #[arg(long)]
        sheet_pile: String,

        /// Installation level [m w.r.t. reference].
        #[arg(long, allow_hyphen_values = true)]
        installation_level: f64,

        #[arg(long, value_enum, default_value_t = FrictionArg::Cpt)]
        friction: FrictionArg,

        #[arg(long, value_enum, default_value_t = DriveArg::Vibrate)]
        drive: DriveArg,

        #[arg(long, default_value_t = DEFAULT_ZETA)]
        zeta: f64,

        /// Column to summarise.
        #[arg(long, value_enum, default_value_t = HueArg::Max)]
        hue: HueArg,

        #[command(flatten)]
        report: ReportArgs,
    },
}

/// Optional report request.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Also request the report and write it to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    #[arg(long, default_value = "")]
    pub project_name: String,

    #[arg(long, default_value = "")]
    pub project_id: String,

    #[arg(long, default_value = "")]
    pub author: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VibrationTypeArg {
    ShortTerm,
    RepeatedShortTerm,
    Continuous,
}

impl From<VibrationTypeArg> for VibrationType {
    fn from(arg: VibrationTypeArg) -> Self {
        match arg {
            VibrationTypeArg::ShortTerm => VibrationType::ShortTerm,
            VibrationTypeArg::RepeatedShortTerm => VibrationType::RepeatedShortTerm,
            VibrationTypeArg::Continuous => VibrationType::Continuous,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InstallationTypeArg {
    Vibrate,
    Driving,
}

impl From<InstallationTypeArg> for InstallationType {
    fn from(arg: InstallationTypeArg) -> Self {
        match arg {
            InstallationTypeArg::Vibrate => InstallationType::Vibrate,
            InstallationTypeArg::Driving => InstallationType::Driving,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PileShapeArg {
    Square,
    Round,
}

impl From<PileShapeArg> for PileShape {
    fn from(arg: PileShapeArg) -> Self {
        match arg {
            PileShapeArg::Square => PileShape::Square,
            PileShapeArg::Round => PileShape::Round,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrictionArg {
    /// Local friction measured by the CPT.
    Cpt,
    /// Friction derived from the classify table.
    Slip,
}

impl From<FrictionArg> for FrictionStrategy {
    fn from(arg: FrictionArg) -> Self {
        match arg {
            FrictionArg::Cpt => FrictionStrategy::CPTFrictionStrategy,
            FrictionArg::Slip => FrictionStrategy::SlipFrictionStrategy,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DriveArg {
    Vibrate,
    Push,
}

impl From<DriveArg> for DriveStrategy {
    fn from(arg: DriveArg) -> Self {
        match arg {
            DriveArg::Vibrate => DriveStrategy::Vibrate,
            DriveArg::Push => DriveStrategy::Push,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HueArg {
    Max,
    Base,
    #[value(name = "Q90")]
    Q90,
    #[value(name = "Q95")]
    Q95,
}

impl From<HueArg> for Hue {
    fn from(arg: HueArg) -> Self {
        match arg {
            HueArg::Max => Hue::Max,
            HueArg::Base => Hue::Base,
            HueArg::Q90 => Hue::Q90,
            HueArg::Q95 => Hue::Q95,
        }
    }
}
