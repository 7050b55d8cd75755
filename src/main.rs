//! RagBuddy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Instant;

use ragbuddy::{
    cli::{Args, Commands, Config, Verbosity},
    logging,
    rag::{Language, RagPipeline},
    repl::{self, RenderOptions, ReplSession},
};

fn render_options(verbosity: Verbosity) -> RenderOptions {
    RenderOptions {
        report: verbosity.show_report(),
        chunks: verbosity.show_chunks(),
    }
}

/// Build the pipeline over `docs` with the configured backend
fn build_pipeline(config: &Config, docs: &[PathBuf]) -> Result<(RagPipeline, String)> {
    let generator = config
        .build_generator()
        .context("Failed to create generation backend")?;
    let backend = generator.name().to_string();

    let started = Instant::now();
    let pipeline = RagPipeline::with_config(docs, config.rag_config(), generator)
        .context("Failed to build document index")?;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        backend = %backend,
        "Pipeline ready"
    );

    Ok((pipeline, backend))
}

/// Warn when the Ollama server does not answer; the mock never fails this
async fn warn_if_unreachable(config: &Config) -> Result<()> {
    if config.backend_reachable().await? {
        return Ok(());
    }

    let url = config.ollama_url();
    tracing::warn!(url = %url, "Ollama is not reachable");
    eprintln!(
        "{} Ollama is not reachable at {}. Start with: ollama serve",
        "Warning:".yellow().bold(),
        url
    );
    Ok(())
}

fn top_k(args: &Args, config: &Config) -> usize {
    args.top_k.unwrap_or(config.retrieval.default_top_k)
}

/// Answer one question and exit
async fn run_ask(
    args: &Args,
    config: &Config,
    language: Language,
    question: &str,
    docs: &[PathBuf],
) -> Result<()> {
    warn_if_unreachable(config).await?;
    let (pipeline, backend) = build_pipeline(config, docs)?;

    let rendered = repl::answer_question(
        &pipeline,
        question,
        language,
        top_k(args, config),
        &backend,
        render_options(args.verbosity()),
    )
    .await;

    if rendered.failed {
        eprintln!("{}", rendered.text);
        std::process::exit(1);
    }
    println!("{}", rendered.text);
    Ok(())
}

/// Interactive question loop
async fn run_start(args: &Args, config: &Config, language: Language, docs: &[PathBuf]) -> Result<()> {
    warn_if_unreachable(config).await?;
    let (pipeline, backend) = build_pipeline(config, docs)?;

    let mut session = ReplSession::new(
        &pipeline,
        language,
        top_k(args, config),
        &backend,
        render_options(args.verbosity()),
    )?;
    session.run().await?;

    println!("{}", "Goodbye!".green());
    Ok(())
}

fn run_stats(config: &Config, docs: &[PathBuf]) -> Result<()> {
    let (pipeline, _) = build_pipeline(config, docs)?;
    println!("{}", repl::display::stats(&pipeline.stats()));
    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match (&args.config, Config::default_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    println!("{}", "RagBuddy Configuration".bold().cyan());
    println!("  Source:    {}", source);
    println!("  Verbosity: {}", args.verbosity().as_str());
    if !config.generation.use_mock {
        println!("  Ollama:    {}", config.ollama_url());
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), msg);
        std::process::exit(2);
    }

    logging::init(args.verbosity());

    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    let language = args.language()?;

    let docs = args.command.docs();
    match &args.command {
        Commands::Ask { question, .. } => run_ask(&args, &config, language, question, docs).await,
        Commands::Start { .. } => run_start(&args, &config, language, docs).await,
        Commands::Stats { .. } => run_stats(&config, docs),
        Commands::Config => show_config(&args, &config),
    }
}
