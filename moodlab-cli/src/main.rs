//! MoodLab CLI — load, join, and analyze trade/sentiment CSV sources.
//!
//! Commands:
//! - `analyze` — run the full pipeline for one mood + size-range selection
//!   and print metrics, risk-model predictions, and distribution tests
//!
//! This binary is the stand-in consumer for the dashboard UI: it exercises
//! the same public API (`load_and_join`, `compute_metrics`, `RiskModels`,
//! `run_distribution_tests`) and makes the error-scoping policy visible —
//! a degenerate model or an undefined test never suppresses the metrics.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use moodlab_analysis::{
    compute_metrics, mood_summary, run_distribution_tests, FilterMetrics, MetricsOutcome,
    MoodSummary, RiskModels, StatTestError, TestResult,
};
use moodlab_core::{filter_trades, load_and_join, AutoCsvProvider, Mood, SizeRange, SourceCache};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "moodlab",
    about = "MoodLab CLI — market mood vs trader behavior analytics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load trades + sentiment, join by date, and analyze one selection.
    Analyze {
        /// Trade CSV source (path or http(s) URL).
        #[arg(long)]
        trades: String,

        /// Sentiment CSV source (path or http(s) URL).
        #[arg(long)]
        sentiment: String,

        /// Market mood to inspect: fear or greed.
        #[arg(long, default_value = "fear")]
        mood: String,

        /// Lower bound of the trade-size range (USD, inclusive).
        #[arg(long, default_value_t = 1000.0)]
        min_size: f64,

        /// Upper bound of the trade-size range (USD, inclusive).
        #[arg(long, default_value_t = 5000.0)]
        max_size: f64,

        /// How many matching trades to preview.
        #[arg(long, default_value_t = 10)]
        preview: usize,

        /// Emit the full report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Everything one analysis run produces. Model and test slots are optional:
/// their failures are scoped to themselves.
#[derive(Serialize)]
struct AnalysisReport {
    mood: Mood,
    size_range: [f64; 2],
    joined_rows: usize,
    filtered_rows: usize,
    metrics: MetricsOutcome,
    by_mood: Vec<MoodSummary>,
    loss_probability_at_midpoint: Option<f64>,
    high_risk_probability: Option<f64>,
    risk_model_error: Option<String>,
    rank_sum: Option<TestResult>,
    rank_sum_error: Option<String>,
    independence: Option<TestResult>,
    independence_error: Option<String>,
}

fn split_test(outcome: Result<TestResult, StatTestError>) -> (Option<TestResult>, Option<String>) {
    match outcome {
        Ok(t) => (Some(t), None),
        Err(e) => (None, Some(e.to_string())),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            trades,
            sentiment,
            mood,
            min_size,
            max_size,
            preview,
            json,
        } => run_analyze(&trades, &sentiment, &mood, min_size, max_size, preview, json),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    trades: &str,
    sentiment: &str,
    mood: &str,
    min_size: f64,
    max_size: f64,
    preview: usize,
    json: bool,
) -> Result<()> {
    let mood: Mood = mood.parse()?;
    let range = SizeRange::new(min_size, max_size)?;

    let provider = AutoCsvProvider::new()?;
    let mut cache = SourceCache::new();
    let joined = load_and_join(&provider, &mut cache, trades, sentiment)
        .context("loading and joining the data sources")?;

    let view = filter_trades(&joined, mood, range);
    let metrics = compute_metrics(view.trades());
    let by_mood = mood_summary(&joined);

    let (loss_p, high_risk_p, model_err) = match RiskModels::fit(&joined) {
        Ok(models) => {
            let loss = models.predict_loss_probability(mood, range.midpoint())?;
            let high_risk = models.predict_high_risk_probability(mood)?;
            (Some(loss), Some(high_risk), None)
        }
        Err(e) => (None, None, Some(e.to_string())),
    };

    let tests = run_distribution_tests(&joined);
    let (rank_sum, rank_sum_error) = split_test(tests.rank_sum);
    let (independence, independence_error) = split_test(tests.independence);

    let report = AnalysisReport {
        mood,
        size_range: [range.lo(), range.hi()],
        joined_rows: joined.len(),
        filtered_rows: view.len(),
        metrics,
        by_mood,
        loss_probability_at_midpoint: loss_p,
        high_risk_probability: high_risk_p,
        risk_model_error: model_err,
        rank_sum,
        rank_sum_error,
        independence,
        independence_error,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report, view.trades(), preview);
    Ok(())
}

fn print_report(
    report: &AnalysisReport,
    matched: &[moodlab_core::JoinedTrade],
    preview: usize,
) {
    println!("Selection: {} mood, trade size ${:.0} to ${:.0}", report.mood, report.size_range[0], report.size_range[1]);
    println!(
        "Joined dataset: {} trades; {} match the selection",
        report.joined_rows, report.filtered_rows
    );

    if preview > 0 && !matched.is_empty() {
        println!("\nMatching trades (first {}):", preview.min(matched.len()));
        for trade in matched.iter().take(preview) {
            println!(
                "  {}  {:<5}  size ${:>10.2}  pnl ${:>10.2}",
                trade.date, trade.mood, trade.size_usd, trade.closed_pnl
            );
        }
    }

    println!();
    match &report.metrics {
        MetricsOutcome::NoData => {
            println!("No trades found for the selected filters.");
        }
        MetricsOutcome::Metrics(FilterMetrics {
            loss_probability,
            avg_pnl,
            trade_count,
        }) => {
            println!("Chance of losing money: {:.1}%", loss_probability * 100.0);
            println!("Average result per trade: ${avg_pnl:.2}");
            println!("Number of trades: {trade_count}");
        }
    }

    println!("\nBehavior by mood (full joined set):");
    for summary in &report.by_mood {
        println!(
            "  {:<5}  {:>7} trades, avg size ${:.2}",
            summary.mood, summary.trade_count, summary.avg_trade_size
        );
    }

    println!();
    match (
        report.loss_probability_at_midpoint,
        report.high_risk_probability,
        &report.risk_model_error,
    ) {
        (Some(loss), Some(high_risk), _) => {
            println!(
                "Predicted loss probability at ${:.0}: {:.1}%",
                (report.size_range[0] + report.size_range[1]) / 2.0,
                loss * 100.0
            );
            println!("Predicted high-risk-trade probability: {:.1}%", high_risk * 100.0);
        }
        (_, _, Some(reason)) => println!("Risk models unavailable: {reason}"),
        _ => {}
    }

    println!();
    match (&report.rank_sum, &report.rank_sum_error) {
        (Some(t), _) => println!(
            "PnL distribution shift (Mann-Whitney U): p = {:.4} -> {}",
            t.p_value,
            verdict(t.significant, "distributions differ", "no detectable shift")
        ),
        (_, Some(reason)) => println!("PnL distribution shift unavailable: {reason}"),
        _ => {}
    }
    match (&report.independence, &report.independence_error) {
        (Some(t), _) => println!(
            "Loss/mood independence (Chi-square):     p = {:.4} -> {}",
            t.p_value,
            verdict(
                t.significant,
                "loss frequency depends on mood",
                "no detectable association"
            )
        ),
        (_, Some(reason)) => println!("Loss/mood independence unavailable: {reason}"),
        _ => {}
    }
}

fn verdict(significant: bool, yes: &'static str, no: &'static str) -> &'static str {
    if significant {
        yes
    } else {
        no
    }
}
