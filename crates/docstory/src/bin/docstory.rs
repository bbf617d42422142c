//! docstory command-line entry point
//!
//! Run with: cargo run -p docstory -- lesson.pdf -o story.json

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docstory::storage::write_run;
use docstory::{Locale, StoryConfig, StoryPipeline};

/// Turn a document into an illustrated, narrated story
#[derive(Debug, Parser)]
#[command(name = "docstory", version, about)]
struct Args {
    /// Input document (pdf, txt or md)
    input: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip narration
    #[arg(long)]
    no_audio: bool,

    /// Story locale (pt, en, es); detected when omitted
    #[arg(long)]
    locale: Option<Locale>,

    /// Also write decoded images and audio to this directory
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Also write the text chunks to this JSON file
    #[arg(long)]
    chunks_out: Option<PathBuf>,

    /// Story parts processed concurrently
    #[arg(long)]
    parallel: Option<usize>,
}

impl Args {
    fn apply(&self, config: &mut StoryConfig) {
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if self.no_audio {
            config.voice.enabled = false;
        }
        if let Some(locale) = self.locale {
            config.story.locale = Some(locale);
        }
        if let Some(dir) = &self.media_dir {
            config.output.media_dir = Some(dir.clone());
        }
        if let Some(path) = &self.chunks_out {
            config.output.chunks_path = Some(path.clone());
        }
        if let Some(parallel) = self.parallel {
            config.processing.parallel_parts = Some(parallel);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docstory=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = StoryConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    tracing::info!("Configuration loaded");
    tracing::info!("  - Text backend: {:?}", config.text.provider);
    tracing::info!("  - Story parts: {}", config.story.parts);
    tracing::info!(
        "  - Voice: {}",
        if config.voice.enabled { config.voice.voice_name.as_str() } else { "disabled" }
    );
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    let output = config.output.clone();
    let pipeline = StoryPipeline::from_config(config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise}] {msg}")?,
    );
    spinner.set_message(format!("Processing {}", args.input.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let report = pipeline.run(&args.input).await;
    spinner.finish_and_clear();

    write_run(&output, &report).await?;

    if let Some(failure) = &report.failure {
        eprintln!(
            "{} {} failed at {}: {}",
            style("✗").red().bold(),
            report.source_filename,
            failure.stage,
            failure.error
        );
        std::process::exit(1);
    }

    println!(
        "{} {}",
        style("✓").green().bold(),
        style(&report.source_filename).bold()
    );
    if let Some(locale) = report.locale {
        println!("  Language:  {}", locale.name());
    }
    println!("  Chunks:    {}", report.chunks.len());
    println!(
        "  Parts:     {} of {} assembled",
        style(report.records.len()).cyan(),
        report.parts_extracted
    );
    for dropped in &report.dropped {
        println!(
            "  {} part {} dropped at {}: {}",
            style("!").yellow(),
            dropped.index,
            dropped.stage,
            dropped.error
        );
    }
    println!("  Output:    {}", output.path.display());

    Ok(())
}
