use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use claimscope::{AnalysisReport, Engine, EngineConfig, LexiconRecognizer};

#[derive(Parser)]
#[command(
    name = "claimscope",
    about = "Analyze the structure and dependencies of patent claim sets",
    version
)]
struct Cli {
    /// Claim files to analyze (reads stdin if none provided)
    files: Vec<PathBuf>,

    /// Locale code, or "auto" to detect from the text
    #[arg(short, long, default_value = "auto")]
    language: String,

    /// TOML file overriding thresholds and locale tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Newline-separated entity names added to the chemical entity pass
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Print single-line JSON instead of pretty output
    #[arg(long)]
    compact: bool,
}

fn render(report: &AnalysisReport, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(report)?
    } else {
        serde_json::to_string_pretty(report)?
    };
    Ok(json)
}

fn build_engine(cli: &Cli) -> Result<Engine> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut engine = Engine::new(config).context("invalid engine configuration")?;

    if let Some(path) = &cli.lexicon {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lexicon {}", path.display()))?;
        let recognizer = LexiconRecognizer::new(raw.lines())?;
        engine = engine.with_recognizer(Box::new(recognizer));
    }
    Ok(engine)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let engine = build_engine(&cli)?;

    if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        let report = engine.analyze(&input, &cli.language)?;
        println!("{}", render(&report, cli.compact)?);
        return Ok(());
    }

    let rendered: Vec<Result<String>> = cli
        .files
        .par_iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let report = engine
                .analyze(&text, &cli.language)
                .with_context(|| format!("failed to analyze {}", path.display()))?;
            render(&report, cli.compact)
        })
        .collect();

    for output in rendered {
        println!("{}", output?);
    }
    Ok(())
}
