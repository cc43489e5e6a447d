use std::collections::HashMap;
use std::env;
use std::fs;

use crate::odds_fetch::BookLine;
use crate::projection::ProjectedLine;

/// Model line joined against one sportsbook's market line for the same team.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub team: String,
    pub bookmaker: String,
    pub projected_spread: f64,
    pub market_spread: f64,
    pub spread_difference: f64,
    pub projected_total: f64,
    pub market_total: f64,
    pub total_difference: f64,
}

/// Raw source spelling -> canonical spelling, maintained as configuration.
/// The two upstreams disagree on a handful of names ("St." vs "State",
/// parenthesized campuses); this is the place to record those, not code.
pub type AliasTable = HashMap<String, String>;

/// Load the alias table named by `TEAM_ALIAS_FILE`. No file, an unreadable
/// file, or undecodable JSON all mean an empty table; aliases are an overlay,
/// never a requirement.
pub fn load_alias_table() -> AliasTable {
    let Some(path) = env::var("TEAM_ALIAS_FILE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    else {
        return AliasTable::new();
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return AliasTable::new();
    };
    serde_json::from_str::<AliasTable>(&raw).unwrap_or_default()
}

/// Left join of projections against book lines on team identity: one
/// [`Comparison`] per line whose home side resolves to the projection's team.
/// A projection with no matching line contributes nothing; a line whose home
/// side matches no projection is likewise ignored. Differences are
/// model-minus-market, unrounded.
pub fn reconcile(
    projections: &[ProjectedLine],
    lines: &[BookLine],
    aliases: &AliasTable,
) -> Vec<Comparison> {
    if projections.is_empty() || lines.is_empty() {
        return Vec::new();
    }

    let mut lines_by_team: HashMap<String, Vec<&BookLine>> = HashMap::new();
    for line in lines {
        lines_by_team
            .entry(canonical_key(&line.team_a, aliases))
            .or_default()
            .push(line);
    }

    let mut comparisons = Vec::new();
    for projection in projections {
        let Some(matched) = lines_by_team.get(&canonical_key(projection.team(), aliases)) else {
            continue;
        };
        for line in matched {
            comparisons.push(Comparison {
                team: projection.team().to_string(),
                bookmaker: line.bookmaker.clone(),
                projected_spread: projection.projected_spread,
                market_spread: line.spread,
                spread_difference: projection.projected_spread - line.spread,
                projected_total: projection.projected_total,
                market_total: line.over_under,
                total_difference: projection.projected_total - line.over_under,
            });
        }
    }

    comparisons
}

/// Reduce a source-provided team name to the key both sides are joined on:
/// alias overlay first, then ASCII case folding down to alphanumeric words.
/// Identical spellings always collide; punctuation and casing drift does not
/// break the join.
pub fn team_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut pending_space = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.push(ch.to_ascii_lowercase());
        } else {
            pending_space = true;
        }
    }
    key
}

fn canonical_key(name: &str, aliases: &AliasTable) -> String {
    let trimmed = name.trim();
    if let Some(canonical) = aliases.get(trimmed) {
        return team_key(canonical);
    }
    let key = team_key(trimmed);
    match aliases.get(&key) {
        Some(canonical) => team_key(canonical),
        None => key,
    }
}
