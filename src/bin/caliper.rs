// src/bin/caliper.rs
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use caliper_core::config::Config;
use caliper_core::engine::{Engine, RunReport};
use caliper_core::facts::{ChangeSet, FactStore};
use caliper_core::store::MetricStore;

#[derive(Parser)]
#[command(name = "caliper")]
#[command(about = "Incremental software-metrics engine over extracted structural facts")]
#[command(version)]
struct Cli {
    /// Fact-base snapshot (JSON) produced by a language front end
    #[arg(long)]
    facts: PathBuf,

    /// Persisted metric store (JSON); created on the first run
    #[arg(long)]
    store: PathBuf,

    /// Change-classifier output (JSON map of file path to status)
    #[arg(long)]
    status: Option<PathBuf>,

    /// Analysis root path; repeatable, overrides caliper.toml
    #[arg(long = "input", short = 'i')]
    input: Vec<String>,

    /// Worker-pool size
    #[arg(long, short)]
    jobs: Option<usize>,

    /// Module list file, one path prefix per line
    #[arg(long, short)]
    modules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "error:".red().bold());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli);

    let facts = FactStore::from_json_file(&cli.facts).context("loading fact base")?;
    let changes = match &cli.status {
        Some(path) => ChangeSet::from_json_file(path).context("loading change statuses")?,
        None => ChangeSet::new(),
    };
    let store = MetricStore::open(&cli.store).context("opening metric store")?;

    let mut engine = Engine::new(&config, &facts, &changes, &store)?;
    let report = engine.run()?;

    print_summary(&report);
    Ok(())
}

/// `caliper.toml` first, CLI flags on top.
fn build_config(cli: &Cli) -> Config {
    let mut config = Config::load();
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if !cli.input.is_empty() {
        config.input = cli.input.clone();
    }
    if let Some(modules) = &cli.modules {
        config.modules = Some(modules.clone());
    }
    config.verbose = cli.verbose;
    config
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .init();
}

fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "caliper run complete".green().bold());
    println!(
        "  invalidated files: {}",
        report.invalidated_files.to_string().yellow()
    );
    if report.invalidated_orphans > 0 {
        println!(
            "  orphaned records:  {}",
            report.invalidated_orphans.to_string().yellow()
        );
    }
    for pass in &report.passes {
        println!(
            "  {:<24} {:>6} subjects  {:>6} ms",
            pass.name,
            pass.subjects.to_string().cyan(),
            pass.duration_ms
        );
    }
    println!(
        "  {:<24} {:>6} subjects  {:>6} ms",
        "total".bold(),
        report.total_subjects().to_string().cyan(),
        report.duration_ms
    );
}
