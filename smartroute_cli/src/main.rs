use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::{generate::GenerateSubcommands, geocode::GeocodeArgs, optimize::OptimizeArgs};

mod generate;
mod geocode;
mod geocoder;
mod optimize;
mod parsers;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan delivery routes for an orders file
    Optimize {
        #[command(flatten)]
        args: OptimizeArgs,
    },
    /// Look up addresses
    Geocode {
        #[command(flatten)]
        args: GeocodeArgs,
    },
    #[command(visible_alias = "g")]
    Generate {
        #[command(subcommand)]
        commands: GenerateSubcommands,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Optimize { args } => optimize::run(args).await?,
        Commands::Geocode { args } => geocode::run(args).await?,
        Commands::Generate { commands } => generate::run(commands)?,
    }

    Ok(())
}
