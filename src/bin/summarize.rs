use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use disasterlens::{Engine, GroupKey, Metric, MetricValue, NumericField};

/// Minimal presentation stand-in: load a dataset and print the summary
/// block plus a few rankings to stdout.
fn main() -> Result<()> {
    env_logger::init();

    let path: PathBuf = match std::env::args_os().nth(1) {
        Some(p) => p.into(),
        None => bail!("usage: summarize <disaster_events.csv>"),
    };

    let engine = Engine::from_path(&path)
        .with_context(|| format!("loading dataset from {}", path.display()))?;
    let view = engine.full_view();

    let stats = engine.summary(&view).context("computing summary")?;
    println!("Events:               {}", stats.total_events);
    println!("Major disasters:      {}", stats.major_disasters);
    println!("Affected population:  {}", stats.total_affected);
    println!("Economic loss (USD):  {:.0}", stats.total_economic_loss);
    println!("Avg severity:         {:.2}", stats.avg_severity);
    println!("Avg response (h):     {:.1}", stats.avg_response_time);
    println!("Median response (h):  {:.1}", stats.median_response_time);
    println!("Locations:            {}", stats.unique_locations);
    println!("Disaster types:       {}", stats.unique_disaster_types);
    println!("Date span (days):     {}", stats.date_range_days);

    println!("\nEvents by disaster type:");
    if let MetricValue::Grouped(groups) =
        engine.compute(&view, &Metric::GroupedCount(GroupKey::DisasterType))?
    {
        for (label, count) in groups {
            println!("  {label:<16} {count:.0}");
        }
    }

    println!("\nTop 5 economic losses:");
    if let MetricValue::Ranked(ranked) = engine.compute(
        &view,
        &Metric::TopN {
            field: NumericField::EconomicLossUsd,
            n: 5,
        },
    )? {
        for entry in ranked {
            println!("  {:<16} {:.0}", entry.event_id, entry.value);
        }
    }

    match engine.compute(
        &view,
        &Metric::Correlation {
            x: NumericField::SeverityLevel,
            y: NumericField::EconomicLossUsd,
        },
    ) {
        Ok(MetricValue::Correlation(corr)) => {
            println!(
                "\nSeverity ↔ economic loss: r = {:.3}, p = {:.4} (n = {})",
                corr.r, corr.p_value, corr.n
            );
        }
        Ok(_) => unreachable!("correlation metric returns a correlation"),
        Err(e) => println!("\nSeverity ↔ economic loss: {e}"),
    }

    Ok(())
}
