//! core-mfx - Mobile Forensic Xplorer
//!
//! Loads extracted handset databases, prints an overview and a correlated
//! timeline, and optionally writes the JSON interchange export.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use mfx_lib::artifact::{catalog, CATALOG};
use mfx_lib::{
    views, ArtifactError, ArtifactResult, Category, EngineConfig, LoadCoordinator, LoadRequest,
};

#[derive(Parser)]
#[command(name = "core-mfx")]
#[command(version)]
#[command(about = "Mobile forensic artifact loader and timeline builder")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "CORE_MFX_CONFIG")]
    config: Option<PathBuf>,

    /// Device description written into the export
    #[arg(long)]
    device_info: Option<String>,

    /// Write the JSON interchange export to this file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print the records of this dataset after loading
    #[arg(short, long, value_name = "NAME")]
    table: Option<String>,

    /// List the known artifacts and exit
    #[arg(long)]
    catalog: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Artifacts to load: `LABEL=PATH`, `CATEGORY=PATH` or a bare `PATH`
    #[arg(value_name = "LOAD", required_unless_present = "catalog")]
    loads: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        mfx_lib::logging::init_verbose();
    } else {
        mfx_lib::logging::init();
    }

    if cli.catalog {
        print_catalog();
        return ExitCode::SUCCESS;
    }

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one load failed
fn run(cli: Cli) -> ArtifactResult<bool> {
    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;
    if let Some(device_info) = cli.device_info {
        config.device_info = device_info;
    }

    let mut coordinator = LoadCoordinator::new(config);
    for arg in &cli.loads {
        coordinator.submit(parse_load(arg))?;
    }

    let statuses = coordinator.wait_all();
    let all_loaded = statuses.iter().all(|s| !s.is_error);
    for status in &statuses {
        if status.is_error {
            eprintln!("{}", status.text);
        } else {
            println!("{}", status.text);
        }
    }

    println!();
    println!("{}", views::overview(coordinator.store(), chrono::Local::now()));
    println!("{}", views::timeline_text(&coordinator.timeline()));

    if let Some(name) = &cli.table {
        let dataset = coordinator
            .store()
            .get(name)
            .ok_or_else(|| ArtifactError::Config(format!("no dataset named {}", name)))?;
        let view = views::table(dataset, coordinator.config().table_row_limit);
        println!("=== {} ===\n", dataset.name());
        print!("{}", views::table_text(&view));
    }

    if let Some(path) = cli.export {
        let summary = coordinator.export(&path)?;
        println!(
            "Exported {} datasets to {} ({} bytes)",
            summary.datasets,
            summary.path.display(),
            summary.bytes
        );
    }

    Ok(all_loaded)
}

/// `Call Log=/x/calllog.db`, `calls=/x/calls.db` or `/x/calllog.db`.
///
/// A prefix that is neither a catalog label nor a category tag is treated as
/// part of the path.
fn parse_load(arg: &str) -> LoadRequest {
    if let Some((prefix, path)) = arg.split_once('=') {
        if let Some(entry) = catalog::lookup(prefix) {
            return LoadRequest::from_catalog(entry, path);
        }
        if let Ok(category) = prefix.parse::<Category>() {
            return LoadRequest::new(path, category, file_name(Path::new(path)));
        }
    }
    LoadRequest::from_path(arg)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn print_catalog() {
    println!("{:<20} {:<20} Category", "Label", "Expected file");
    for entry in CATALOG.iter() {
        println!("{:<20} {:<20} {}", entry.label, entry.file_hint, entry.category);
    }
}
