mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use logframe_core::{
    ConfigManager, Domain, GraphSnapshot, LoggingConfig, NodeCategory, ToolboxRegistry,
};
use logframe_engine::LogframeEngine;
use output::Report;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "logframe")]
#[command(about = "Logframe - validate, score and compile programme design graphs", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// Configuration file (defaults to ./.logframe.toml or ~/.logframe/config.toml)
    #[arg(short, long, global = true, env = "LOGFRAME_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a design for cycles, disconnected islands and illegal connections
    Validate {
        /// Graph snapshot JSON file, or - for stdin
        snapshot: PathBuf,
    },

    /// Score a design's health
    Simulate {
        snapshot: PathBuf,

        #[arg(short, long, default_value = "fln", value_parser = parse_domain)]
        domain: Domain,
    },

    /// Compile a design into a logical framework, whatever its health
    Compile {
        snapshot: PathBuf,

        #[arg(short, long, default_value = "fln", value_parser = parse_domain)]
        domain: Domain,
    },

    /// Validate, score and, if acceptable, compile
    Analyze {
        snapshot: PathBuf,

        #[arg(short, long, default_value = "fln", value_parser = parse_domain)]
        domain: Domain,
    },

    /// Compile and ask the AI service to audit the logical framework
    Audit {
        snapshot: PathBuf,

        #[arg(short, long, default_value = "fln", value_parser = parse_domain)]
        domain: Domain,
    },

    /// List the building blocks available for a domain
    Toolbox {
        #[arg(short, long, default_value = "fln", value_parser = parse_domain)]
        domain: Domain,

        /// Only show one category (foundation, stakeholder, intervention, bridge, risk)
        #[arg(long, value_parser = parse_category)]
        category: Option<NodeCategory>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination path
        #[arg(default_value = ".logframe.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_domain(value: &str) -> std::result::Result<Domain, String> {
    value.parse::<Domain>().map_err(|e| e.to_string())
}

fn parse_category(value: &str) -> std::result::Result<NodeCategory, String> {
    value.parse::<NodeCategory>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let manager = match &cli.config {
        Some(path) => ConfigManager::from_path(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")?;

    init_tracing(&manager.config().logging, cli.verbose);
    if let Some(path) = manager.config_path() {
        debug!("Loaded configuration from {}", path.display());
    }

    match execute_command(&cli, manager).await {
        Ok(report) => {
            print_output(&cli.output, &report)?;
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so JSON on stdout stays machine readable.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let default_level = if verbose {
        "debug".to_string()
    } else {
        logging.level.clone()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_snapshot(path: &Path) -> Result<GraphSnapshot> {
    if path.as_os_str() == "-" {
        return GraphSnapshot::from_reader(std::io::stdin().lock())
            .context("Failed to read graph snapshot from stdin");
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot {}", path.display()))?;
    GraphSnapshot::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))
}

async fn execute_command(cli: &Cli, manager: ConfigManager) -> Result<Report> {
    match &cli.command {
        Commands::Validate { snapshot } => {
            let snapshot = read_snapshot(snapshot)?;
            let engine = LogframeEngine::new(manager.config().clone());
            let graph = logframe_graph::LogicGraph::from_snapshot(&snapshot);
            Ok(Report::Structural {
                structural: engine.validate(&snapshot),
                integrity: graph.integrity().clone(),
            })
        }

        Commands::Simulate { snapshot, domain } => {
            let snapshot = read_snapshot(snapshot)?;
            let engine = LogframeEngine::from_config(manager.config().clone());
            Ok(Report::Simulation(engine.simulate(*domain, &snapshot).await))
        }

        Commands::Compile { snapshot, domain } => {
            let snapshot = read_snapshot(snapshot)?;
            let engine = LogframeEngine::new(manager.config().clone());
            Ok(Report::Document(engine.compile(*domain, &snapshot)))
        }

        Commands::Analyze { snapshot, domain } => {
            let snapshot = read_snapshot(snapshot)?;
            let engine = LogframeEngine::from_config(manager.config().clone());
            let evaluation = engine.evaluate(*domain, &snapshot).await;
            Ok(Report::Evaluation(Box::new(evaluation)))
        }

        Commands::Audit { snapshot, domain } => {
            let snapshot = read_snapshot(snapshot)?;
            let engine = LogframeEngine::from_config(manager.config().clone());
            let audit = engine
                .audit(*domain, &snapshot)
                .await
                .context("Audit could not be run")?;
            Ok(Report::Audit(audit))
        }

        Commands::Toolbox { domain, category } => {
            let items = match category {
                Some(category) => ToolboxRegistry::by_category(*domain, *category),
                None => ToolboxRegistry::items(*domain).iter().collect(),
            };
            Ok(Report::Toolbox(items))
        }

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            ConfigManager::create_default_config(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(Report::Message {
                message: format!("Wrote default configuration to {}", path.display()),
            })
        }
    }
}

fn print_output(format: &OutputFormat, report: &Report) -> Result<()> {
    match format {
        OutputFormat::Json => output::print_json(report),
        OutputFormat::Pretty => {
            output::print_pretty(report);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_domain_flag_accepts_aliases() {
        let cli = Cli::try_parse_from(["logframe", "simulate", "design.json", "-d", "career"]).unwrap();
        match cli.command {
            Commands::Simulate { domain, .. } => assert_eq!(domain, Domain::CareerReadiness),
            _ => panic!("expected simulate"),
        }

        assert!(Cli::try_parse_from(["logframe", "compile", "design.json", "-d", "health"]).is_err());
    }

    #[test]
    fn test_read_snapshot_reports_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"nodes\": [").unwrap();
        assert!(read_snapshot(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"nodes\": [], \"edges\": []}}").unwrap();
        assert!(read_snapshot(file.path()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logframe.toml");
        let path_arg = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["logframe", "init-config", path_arg]).unwrap();
        let manager = ConfigManager::from_config(Default::default()).unwrap();
        execute_command(&cli, manager).await.unwrap();
        assert!(path.exists());

        let manager = ConfigManager::from_config(Default::default()).unwrap();
        assert!(execute_command(&cli, manager).await.is_err());
    }
}
