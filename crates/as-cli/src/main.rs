//! asplan - AgentSpeak plan checker.
//!
//! - `asplan check` - parse plan files, report conflict sets and resolved conflicts
//! - `asplan render` - re-render plans in canonical form
//! - `asplan init` - write a default .asplan/config.yaml

mod config;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use as_syntax::{parser, ConflictResolver, ParseOptions, Plan};

use crate::config::{CheckerConfig, OutputFormat, CONFIG_PATH};

#[derive(Parser)]
#[command(name = "asplan")]
#[command(about = "AgentSpeak plan checker", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse plan files and report their conflict sets
    Check {
        /// Plan files; defaults to every source file under the project root
        files: Vec<PathBuf>,

        /// Report format, overriding the config
        #[arg(short, long, value_enum)]
        output: Option<OutputFormat>,

        /// Fail on unparseable trigger patterns in conflict annotations
        #[arg(long)]
        strict: bool,
    },

    /// Print the plans of a file in canonical form
    Render {
        file: PathBuf,
    },

    /// Write a default configuration
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let project_root = match cli.project {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Check { files, output, strict } => check(&project_root, files, output, strict),
        Commands::Render { file } => render(&file),
        Commands::Init => init_project(&project_root),
    }
}

fn load_plans(path: &Path, options: ParseOptions) -> Result<Vec<Plan>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path.display().to_string();
    parser::parse_source(&content, Some(&name), options)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn check(
    project_root: &Path,
    files: Vec<PathBuf>,
    output: Option<OutputFormat>,
    strict: bool,
) -> Result<()> {
    let config = CheckerConfig::load_from_project(project_root)?;
    let files = if files.is_empty() {
        config.discover_sources(project_root)?
    } else {
        files
    };
    if files.is_empty() {
        bail!("No plan files found under {}", project_root.display());
    }

    let options = ParseOptions {
        strict_annotations: strict || config.strict_annotations,
    };
    let mut plans = Vec::new();
    for file in &files {
        let loaded = load_plans(file, options)?;
        tracing::info!(file = %file.display(), plans = loaded.len(), "Loaded plans");
        plans.extend(loaded);
    }

    let resolution = config
        .resolve_conflicts
        .then(|| ConflictResolver::new().resolve(&mut plans));

    let rendered = report::render(&plans, resolution, output.unwrap_or(config.output))?;
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn render(file: &Path) -> Result<()> {
    for plan in load_plans(file, ParseOptions::default())? {
        println!("{}", plan);
    }
    Ok(())
}

fn init_project(project_root: &Path) -> Result<()> {
    let config_path = project_root.join(CONFIG_PATH);
    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Config already exists");
        return Ok(());
    }
    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let yaml = serde_yaml::to_string(&CheckerConfig::default())?;
    std::fs::write(&config_path, format!("# asplan configuration\n\n{}", yaml))
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Initialized asplan config at {}", config_path.display());
    Ok(())
}
