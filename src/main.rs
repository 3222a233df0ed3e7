use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gomod_manifest::config::{Config, OutputFormat};
use gomod_manifest::{Manifest, ManifestParser, Statement, StatementKind};

#[derive(Parser)]
#[command(name = "gomod-manifest")]
#[command(about = "Parse, list and format go.mod manifests", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Module,
    Require,
    Replace,
    Exclude,
    Custom,
}

impl From<KindArg> for StatementKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Module => StatementKind::Module,
            KindArg::Require => StatementKind::Require,
            KindArg::Replace => StatementKind::Replace,
            KindArg::Exclude => StatementKind::Exclude,
            KindArg::Custom => StatementKind::Custom,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the manifest in canonical form
    Fmt {
        /// Path to the go.mod file
        #[arg(short, long)]
        file: PathBuf,

        /// Exit with code 1 if the file is not already canonical
        #[arg(long)]
        check: bool,
    },
    /// List statements, optionally filtered by kind
    List {
        /// Path to the go.mod file
        #[arg(short, long)]
        file: PathBuf,

        /// Only list statements of this kind
        #[arg(short, long)]
        kind: Option<KindArg>,

        /// Output format: canonical, json, or summary (defaults to the config value)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Parse the manifest and report whether it is well-formed
    Check {
        /// Path to the go.mod file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Profile manifest parsing (for use with cargo-flamegraph)
    ProfileParse {
        /// Path to the go.mod file
        #[arg(short, long)]
        file: PathBuf,

        /// Number of iterations (for meaningful profiling)
        #[arg(short, long, default_value = "1000")]
        iterations: usize,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match load_config(cli.config.as_deref()).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Fmt { file, check } => run_fmt(&config, file, check).await,
        Commands::List { file, kind, output } => {
            let format = output
                .as_deref()
                .map(OutputFormat::from_str_loose)
                .unwrap_or(config.output.format);
            run_list(&config, file, kind.map(StatementKind::from), format).await
        }
        Commands::Check { file } => run_check(file).await,
        Commands::ProfileParse { file, iterations } => run_profile_parse(file, iterations).await,
    }
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let owned = path.to_path_buf();
    let config = tokio::task::spawn_blocking(move || Config::load(&owned))
        .await
        .context("Config loader task failed")??;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

async fn read_manifest(file: &Path) -> anyhow::Result<(String, Manifest)> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Error reading file {}", file.display()))?;
    let manifest = ManifestParser::new()
        .parse(&content)
        .with_context(|| format!("Error parsing {}", file.display()))?;
    Ok((content, manifest))
}

async fn run_fmt(config: &Config, file: PathBuf, check: bool) -> ExitCode {
    let (content, manifest) = match read_manifest(&file).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let mut formatted = manifest.to_string();
    if config.output.trailing_newline && !formatted.is_empty() {
        formatted.push('\n');
    }

    if check {
        if formatted == content {
            return ExitCode::SUCCESS;
        }
        eprintln!("{} is not in canonical form", file.display());
        return ExitCode::FAILURE;
    }

    print!("{formatted}");
    ExitCode::SUCCESS
}

async fn run_list(
    config: &Config,
    file: PathBuf,
    kind: Option<StatementKind>,
    format: OutputFormat,
) -> ExitCode {
    let (_, manifest) = match read_manifest(&file).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    let statements: Vec<&Statement> = manifest
        .iter()
        .filter(|s| kind.is_none_or(|k| s.kind() == k))
        .filter(|s| !s.module_names().iter().any(|name| config.is_ignored(name)))
        .collect();

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&statements) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize statements: {e}");
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Summary => print!("{}", render_summary(&file, &manifest, &statements)),
        OutputFormat::Canonical => {
            for statement in &statements {
                println!("{statement}");
            }
        }
    }

    ExitCode::SUCCESS
}

fn render_summary(file: &Path, manifest: &Manifest, statements: &[&Statement]) -> String {
    let count = |kind: StatementKind| statements.iter().filter(|s| s.kind() == kind).count();

    let mut lines = vec![
        format!("Manifest summary for {}", file.display()),
        String::new(),
        format!(
            "  Module:   {}",
            manifest.module().map(|m| m.name()).unwrap_or("(none)")
        ),
        format!("  Require:  {}", count(StatementKind::Require)),
        format!("  Replace:  {}", count(StatementKind::Replace)),
        format!("  Exclude:  {}", count(StatementKind::Exclude)),
        format!("  Custom:   {}", count(StatementKind::Custom)),
        "  ─────────────".to_string(),
        format!("  Total:    {}", statements.len()),
    ];
    if statements.len() < manifest.len() {
        lines.push(format!(
            "  Hidden:   {}",
            manifest.len() - statements.len()
        ));
    }
    lines.push(String::new());
    lines.join("\n")
}

async fn run_check(file: PathBuf) -> ExitCode {
    match read_manifest(&file).await {
        Ok((_, manifest)) => {
            println!("[OK] {}: {} statements", file.display(), manifest.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_profile_parse(file: PathBuf, iterations: usize) -> ExitCode {
    let content = match tokio::fs::read_to_string(&file).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {e}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Profiling parse operations for: {}", file.display());
    eprintln!("Iterations: {iterations}");
    eprintln!("File size: {} bytes", content.len());

    let parser = ManifestParser::new();
    let start = Instant::now();

    for _ in 0..iterations {
        if let Err(e) = std::hint::black_box(parser.parse(&content)) {
            eprintln!("Error parsing {}: {e}", file.display());
            return ExitCode::FAILURE;
        }
    }

    let elapsed = start.elapsed();
    eprintln!("\nProfiling complete!");
    eprintln!("Total time: {elapsed:?}");
    eprintln!(
        "Average per iteration: {:?}",
        average_per_iteration(elapsed, iterations)
    );

    ExitCode::SUCCESS
}

fn average_per_iteration(elapsed: Duration, iterations: usize) -> Duration {
    elapsed / u32::try_from(iterations.max(1)).unwrap_or(u32::MAX)
}
