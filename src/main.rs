mod backup;
mod commands;
mod config;
mod diagnostics;
mod error;
mod extract;
mod fixup;
mod info;
mod journal;
mod rewrite;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "appearance-patch",
    version,
    about = "Swap a folium map's layer control for Leaflet.Control.Appearance"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Name tile layers, keep one base layer attached, attach the control to the real map
    Fixup {
        /// Map export to patch
        #[arg(default_value = "index.html")]
        file: PathBuf,
    },
    /// Print the plugin contract and the settings a run would use
    Info {
        /// Map export whose directory holds `.appearance.toml`
        #[arg(default_value = "index.html")]
        file: PathBuf,
        /// Output as JSON instead of markdown
        #[arg(long)]
        json: bool,
    },
    /// Back up the export and replace `L.control.layers` with `L.control.appearance`
    Modify {
        /// Map export to patch
        #[arg(default_value = "index.html")]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Fixup { file } => commands::fixup(file),
        Commands::Info { file, json } => commands::info(file, *json),
        Commands::Modify { file } => commands::modify(file),
    };

    return match result {
        // A missing input is reported but not signalled; callers read stdout.
        Err(error::Error::FileNotFound { path }) => {
            println!("Error: {} not found!", path.display());
            ExitCode::SUCCESS
        },
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
        Ok(()) => ExitCode::SUCCESS,
    };
}
