use chrono::Utc;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::odds_fetch::{self, BookLine, OddsApiConfig};
use crate::projection::{ProjectedLine, project_all};
use crate::ratings_fetch::{self, RatingsConfig, RatingsExtract};
use crate::reconcile::{AliasTable, Comparison, load_alias_table, reconcile};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub ratings: RatingsConfig,
    pub odds: OddsApiConfig,
    pub aliases: AliasTable,
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        Self {
            ratings: RatingsConfig::from_env(),
            odds: OddsApiConfig::from_env(),
            aliases: load_alias_table(),
        }
    }
}

/// Everything one fetch-render cycle produces. Nothing here survives the
/// cycle; the next run starts from scratch.
#[derive(Debug, Clone, Default)]
pub struct CycleResult {
    pub projections: Vec<ProjectedLine>,
    pub comparisons: Vec<Comparison>,
    pub skipped_ratings_rows: usize,
    /// Per-source failures, already safe to show to a user.
    pub warnings: Vec<String>,
    pub fetched_at_unix: i64,
}

/// Run one full cycle: both sources fetched concurrently, a failed source
/// degraded to an empty dataset plus a warning, the survivors projected and
/// reconciled. Never fails as a whole.
pub fn run_cycle(cfg: &PipelineConfig) -> CycleResult {
    let (ratings_result, odds_result) = rayon::join(
        || ratings_fetch::fetch_team_ratings(&cfg.ratings),
        || odds_fetch::fetch_book_lines(&cfg.odds),
    );

    let mut warnings = Vec::new();

    let RatingsExtract {
        teams,
        skipped_rows,
    } = unwrap_source(ratings_result, &mut warnings);
    let lines: Vec<BookLine> = unwrap_source(odds_result, &mut warnings);

    debug!(
        teams = teams.len(),
        skipped_rows,
        lines = lines.len(),
        "cycle sources fetched"
    );

    let projections = project_all(teams);
    let comparisons = reconcile(&projections, &lines, &cfg.aliases);

    CycleResult {
        projections,
        comparisons,
        skipped_ratings_rows: skipped_rows,
        warnings,
        fetched_at_unix: Utc::now().timestamp(),
    }
}

fn unwrap_source<T: Default>(result: Result<T, SourceError>, warnings: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(source = err.source_name(), "{err}");
            warnings.push(err.to_string());
            T::default()
        }
    }
}
