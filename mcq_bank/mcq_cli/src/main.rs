use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mcq_dedup::{
    export, DedupConfig, DedupEngine, DedupTelemetry, ExportFormat, McqStore, ReportStyle,
};
use serde_json::json;
use shared_logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "mcq", version, about = "MCQ collection maintenance")]
struct Cli {
    /// TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Collection file; overrides the config.
    #[arg(long, global = true)]
    collection: Option<PathBuf>,
    /// JSON-lines log file; overrides the config.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reports duplicate groups without changing the collection.
    Preview,
    /// Removes duplicates, merges explanations and renumbers the collection.
    #[command(alias = "deduplicate")]
    Run,
    /// Appends pipeline output to the collection.
    Append {
        /// JSON file with an array of MCQs or an object with an `mcqs` array.
        source: PathBuf,
    },
    /// Prints the collection as json, csv or readable text.
    Export {
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Write to a file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Prints one record.
    Show {
        id: u64,
    },
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Run => "run",
            Self::Append { .. } => "append",
            Self::Export { .. } => "export",
            Self::Show { .. } => "show",
        }
    }
}

/// Effective settings after layering CLI flags over the config file.
#[derive(Debug)]
struct Settings {
    config: DedupConfig,
    telemetry: DedupTelemetry,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => DedupConfig::load(path)?,
            None => DedupConfig::default(),
        };
        if let Some(collection) = &cli.collection {
            config.collection_path.clone_from(collection);
        }
        if let Some(log) = &cli.log {
            config.log_path = Some(log.clone());
        }
        let telemetry = match &config.log_path {
            Some(path) => DedupTelemetry::builder("mcq")
                .log_path(path)
                .min_level(config.log_level)
                .build()
                .with_context(|| format!("opening log {}", path.display()))?,
            None => DedupTelemetry::disabled("mcq"),
        };
        Ok(Self { config, telemetry })
    }

    fn store(&self) -> McqStore {
        McqStore::new(&self.config.collection_path)
    }

    fn engine(&self) -> DedupEngine {
        DedupEngine::new()
            .with_merge_explanations(self.config.merge_explanations)
            .with_telemetry(self.telemetry.clone())
    }

    fn style(&self) -> ReportStyle {
        ReportStyle::from(&self.config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    match execute(&cli.command, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            settings.telemetry.record(
                LogLevel::Error,
                "command.failed",
                json!({ "command": cli.command.name(), "error": format!("{err:#}") }),
            );
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: &Commands, settings: &Settings) -> Result<()> {
    let store = settings.store();
    match command {
        Commands::Preview => {
            let report = settings
                .engine()
                .preview_store(&store)
                .context("preview aborted")?;
            print!("{}", report.display(settings.style()));
            Ok(())
        }
        Commands::Run => {
            let report = settings
                .engine()
                .run_store(&store)
                .context("deduplication aborted; collection left unchanged")?;
            print!("{}", report.display(settings.style()));
            println!("\nDeduplication complete.");
            Ok(())
        }
        Commands::Append { source } => handle_append(settings, &store, source),
        Commands::Export { format, out } => {
            let records = store.load()?;
            let rendered = export::render(&records, *format).context("rendering export")?;
            match out {
                Some(path) => fs::write(path, rendered)
                    .with_context(|| format!("writing export {}", path.display()))?,
                None => println!("{rendered}"),
            }
            Ok(())
        }
        Commands::Show { id } => {
            match store.get(*id)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("MCQ {id} not found"),
            }
            Ok(())
        }
    }
}

fn handle_append(settings: &Settings, store: &McqStore, source: &Path) -> Result<()> {
    let summary = store
        .append_from_file(source)
        .with_context(|| format!("appending {}", source.display()))?;
    settings.telemetry.record(
        LogLevel::Info,
        "collection.appended",
        json!({
            "source": source,
            "found": summary.found,
            "skipped": summary.skipped,
            "added": summary.added,
            "total": summary.total,
        }),
    );
    println!("MCQs summary:");
    println!("   - New MCQs found: {}", summary.found);
    println!("   - Duplicates skipped: {}", summary.skipped);
    println!("   - New MCQs added: {}", summary.added);
    println!("   - Total MCQs in collection: {}", summary.total);
    println!("Saved to {}", store.path().display());
    Ok(())
}
