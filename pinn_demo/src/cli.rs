use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pricing_model::Variant;

#[derive(Debug, Parser)]
#[command(name = "pinn-demo", version, about = "Price options with pre-trained PINN models")]
pub struct Cli {
    /// JSON file overriding model locations and input bounds.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a single option.
    Price(PriceArgs),
    /// Price a spot × maturity grid and write it as CSV.
    Surface(SurfaceArgs),
    /// List the tensors of a parameter file.
    Inspect {
        file: PathBuf,
    },
    /// Write an all-zero parameter file with the model's layout.
    Init {
        /// `black-scholes` (or `bs`) or `heston`.
        #[arg(short, long, value_name = "MODEL")]
        model: Variant,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    /// `black-scholes` (or `bs`) or `heston`. Defaults to the model named in the config.
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<Variant>,
    #[arg(short, long)]
    pub spot: Option<f32>,
    #[arg(short = 't', long)]
    pub maturity: Option<f32>,
    /// Only used by the Heston model.
    #[arg(short, long)]
    pub volatility: Option<f32>,
}

#[derive(Debug, Args)]
pub struct SurfaceArgs {
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<Variant>,
    /// Held fixed over the grid. Only used by the Heston model.
    #[arg(short, long)]
    pub volatility: Option<f32>,
    /// Points per axis.
    #[arg(short, long)]
    pub points: Option<usize>,
    /// Where to write the CSV, stdout if omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
