use anyhow::Result;
use clap::Parser;
use shoreline_core::MeasureMethod;
use shoreline_etl::config::StatuteMile;
use shoreline_etl::{Config, ExportFormat};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Debug, Parser)]
#[command(name = "shoreline-ruler", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Measure the polylines in one or more shapefiles
    ///
    /// Each shapefile is measured in the UTM zone containing the midpoint of
    /// its longitude extent (or, for projected data, its central meridian).
    /// Lengths are reported in statute and nautical miles, per C-COAST class
    /// and per shapefile.
    ///
    /// Shapefiles that can't be measured still appear in the results with a
    /// note explaining why:
    ///
    /// - unknown spatial reference (no or unreadable .prj)
    /// - doesn't contain polylines
    /// - unreadable (the shapefile itself couldn't be opened)
    ///
    /// With --export the per-class summary is also written as a table named
    /// ShorelineMileages_<timestamp> in the export directory.
    Measure {
        /// Shapefiles to measure
        files: Vec<String>,

        /// Directory to search for shapefiles (repeatable)
        #[arg(short, long = "dir")]
        dirs: Vec<String>,

        /// Also search the subdirectories of each --dir
        #[arg(short, long)]
        recursive: bool,

        /// Attribute field holding the C-COAST class
        #[arg(long)]
        class_field: Option<String>,

        /// Export the per-class summary table
        #[arg(long, value_name = "dbf|json")]
        export: Option<ExportFormat>,

        /// Directory for exported tables (default: config export_dir)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Always print the per-class table
        #[arg(long)]
        by_class: bool,

        /// How lengths are computed
        #[arg(long, value_name = "utm|geodesic")]
        method: Option<MeasureMethod>,

        /// Report statute miles as international rather than US survey miles
        #[arg(long)]
        international_miles: bool,

        /// Print the per-feature rows as JSON instead of the summary tables
        #[arg(long)]
        json: bool,
    },
    /// Show the UTM zone for a longitude or the midpoint of a longitude range
    Zone {
        /// Longitude in decimal degrees
        #[arg(allow_hyphen_values = true)]
        lon: f64,

        /// Eastern end of a longitude range
        #[arg(allow_hyphen_values = true)]
        lon_max: Option<f64>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    logging::setup(&config.logging, cli.verbose)?;

    match cli.command {
        Commands::Measure {
            files,
            dirs,
            recursive,
            class_field,
            export,
            out,
            by_class,
            method,
            international_miles,
            json,
        } => {
            if let Some(class_field) = class_field {
                config.class_field = class_field;
            }
            if let Some(method) = method {
                config.method = method;
            }
            if international_miles {
                config.statute_mile = StatuteMile::International;
            }

            let request = shoreline_etl::MeasureRequest {
                files,
                dirs,
                include_subdirs: recursive,
                export,
                export_dir: out,
            };
            let output = commands::MeasureOutput { by_class, json };
            commands::run_measure(&request, &config, output)?;
        }
        Commands::Zone { lon, lon_max } => {
            commands::show_zone(lon, lon_max)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}
