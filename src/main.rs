use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cbb_edge::pipeline::{self, PipelineConfig};
use cbb_edge::table;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cfg = PipelineConfig::from_env();
    let cycle = pipeline::run_cycle(&cfg);

    for warning in &cycle.warnings {
        eprintln!("warning: {warning}");
    }

    if cycle.projections.is_empty() {
        println!("No team ratings this cycle.");
    } else {
        println!("Team efficiency and model projections");
        println!(
            "{}",
            table::render(
                &table::PROJECTION_HEADERS,
                &table::projection_rows(&cycle.projections),
            )
        );
        if cycle.skipped_ratings_rows > 0 {
            println!("({} malformed ratings rows skipped)", cycle.skipped_ratings_rows);
        }
    }

    if cycle.comparisons.is_empty() {
        println!("No sportsbook lines matched the model this cycle.");
    } else {
        println!("Sportsbook lines vs. model projections");
        println!(
            "{}",
            table::render(
                &table::COMPARISON_HEADERS,
                &table::comparison_rows(&cycle.comparisons),
            )
        );
    }

    Ok(())
}
