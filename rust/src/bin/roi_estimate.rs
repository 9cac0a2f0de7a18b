//! Command-line front end: allocate, project and print the JSON report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use roi_estimator_core::{EstimatorConfig, RoiEngine};

#[derive(Parser, Debug)]
#[command(name = "roi-estimate", version, about = "Marketing budget allocation and ROI estimate")]
struct Args {
    /// Total marketing budget
    #[arg(long, default_value_t = 10_000_000.0)]
    budget: f64,

    /// Target segment (repeatable); defaults to every catalog segment
    #[arg(long = "segment")]
    segments: Vec<String>,

    /// Projection timeline in months
    #[arg(long, default_value_t = 12)]
    timeline: u32,

    /// TOML file with model parameters and/or a custom catalog
    #[arg(long, alias = "config")]
    catalog: Option<PathBuf>,

    /// Pair for the diminishing-returns curve, as "<segment>/<channel>"
    #[arg(long, value_parser = parse_curve_pair)]
    curve: Option<(String, String)>,

    /// Also write the report to this file (or, for a directory, under its
    /// timestamped name inside it)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Split "<segment>/<channel>" on the last slash, since segment names
/// such as "Warung/Street Food" carry one themselves.
fn parse_curve_pair(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.rsplit_once('/') {
        Some((segment, channel)) if !segment.trim().is_empty() && !channel.trim().is_empty() => {
            Ok((segment.trim().to_string(), channel.trim().to_string()))
        }
        _ => Err(format!("expected \"<segment>/<channel>\", got {raw:?}")),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.catalog {
        Some(path) => EstimatorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EstimatorConfig::default(),
    };
    let engine = RoiEngine::from_config(&config).context("invalid estimator config")?;

    let segments: Vec<String> = if args.segments.is_empty() {
        engine.catalog().segment_names().map(str::to_string).collect()
    } else {
        args.segments.clone()
    };

    let report = engine.estimate(args.budget, &segments, args.timeline)?;
    let timeline = engine.revenue_timeline(
        &report.roi_metrics,
        args.timeline,
        report.campaign_config.total_budget,
    )?;

    let curve = match &args.curve {
        Some((segment, channel)) => Some(engine.response_curve(
            &report.budget_allocation,
            segment,
            channel,
            args.timeline,
        )?),
        None => None,
    };

    if let Some(target) = &args.output {
        let path = if target.is_dir() {
            report.write_to_dir(target)
        } else {
            report.write(target).map(|()| target.clone())
        }
        .with_context(|| format!("failed to write report to {}", target.display()))?;
        eprintln!("Report written to {}", path.display());
    }

    let output = json!({
        "report": report,
        "revenue_timeline": timeline,
        "response_curve": curve,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
