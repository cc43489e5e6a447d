use std::collections::HashSet;
use std::env;

use reqwest::header::USER_AGENT;
use scraper::{ElementRef, Html, Selector};

use crate::error::SourceError;
use crate::http_client::{BROWSER_USER_AGENT, http_client};

const SOURCE: &str = "ratings";
const DEFAULT_RATINGS_URL: &str = "https://barttorvik.com/trank.php";

// Current page revisions mark the ratings grid with this class; older ones
// just ship it as the first table on the page.
const RATINGS_TABLE_SELECTOR: &str = "table.t-rankings-table";

#[derive(Debug, Clone)]
pub struct RatingsConfig {
    pub url: String,
}

impl RatingsConfig {
    pub fn from_env() -> Self {
        let url = env::var("RATINGS_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_RATINGS_URL.to_string());
        Self { url }
    }
}

/// One accepted row of the efficiency table. Either every field parsed or the
/// row was dropped whole; there are no partially populated ratings.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRating {
    pub team: String,
    pub adj_offense: f64,
    pub adj_defense: f64,
    pub tempo: f64,
    pub strength_of_schedule: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RatingsExtract {
    pub teams: Vec<TeamRating>,
    /// Data rows rejected for missing or non-numeric fields. Row-level noise
    /// is expected and only reported in aggregate.
    pub skipped_rows: usize,
}

/// Where each named field lives in a data row. Resolved once per parse from
/// the header labels, so a layout shift fails in one place instead of
/// silently reading the wrong column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnMap {
    team: usize,
    adj_offense: usize,
    adj_defense: usize,
    tempo: usize,
    strength_of_schedule: usize,
}

// Offsets observed on the live page, used when the header carries no
// recognizable labels.
const FALLBACK_COLUMNS: ColumnMap = ColumnMap {
    team: 1,
    adj_offense: 4,
    adj_defense: 5,
    tempo: 7,
    strength_of_schedule: 14,
};

pub fn fetch_team_ratings(cfg: &RatingsConfig) -> Result<RatingsExtract, SourceError> {
    let client =
        http_client().map_err(|err| SourceError::unavailable(SOURCE, err.to_string()))?;
    let resp = client
        .get(&cfg.url)
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .map_err(|err| SourceError::unavailable(SOURCE, format!("request failed: {err}")))?;
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|err| SourceError::unavailable(SOURCE, format!("failed reading body: {err}")))?;
    if !status.is_success() {
        return Err(SourceError::unavailable(SOURCE, format!("http {status}")));
    }
    parse_ratings_html(&body)
}

pub fn parse_ratings_html(html: &str) -> Result<RatingsExtract, SourceError> {
    let document = Html::parse_document(html);
    let table = locate_ratings_table(&document)
        .ok_or_else(|| SourceError::schema_mismatch(SOURCE, "no ratings table found"))?;

    let tr = css("tr");
    let th = css("th");
    let td = css("td");

    let rows: Vec<ElementRef<'_>> = table.select(&tr).collect();
    if rows.is_empty() {
        return Err(SourceError::schema_mismatch(SOURCE, "ratings table has no rows"));
    }

    let columns = resolve_columns(&rows, &th).unwrap_or(FALLBACK_COLUMNS);

    let mut teams: Vec<TeamRating> = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped_rows = 0usize;
    for row in &rows {
        let cells: Vec<String> = row.select(&td).map(cell_text).collect();
        if cells.is_empty() {
            // header / separator row
            continue;
        }
        // The team name is the cycle's unique key; a repeated name is a
        // malformed row, not a second rating.
        match rating_from_cells(&cells, columns) {
            Some(rating) if seen.insert(rating.team.clone()) => teams.push(rating),
            _ => skipped_rows += 1,
        }
    }

    if teams.is_empty() {
        return Err(SourceError::schema_mismatch(
            SOURCE,
            format!("zero rows extracted ({skipped_rows} rejected)"),
        ));
    }

    Ok(RatingsExtract {
        teams,
        skipped_rows,
    })
}

fn locate_ratings_table(document: &Html) -> Option<ElementRef<'_>> {
    let marked = css(RATINGS_TABLE_SELECTOR);
    if let Some(table) = document.select(&marked).next() {
        return Some(table);
    }
    document.select(&css("table")).next()
}

fn resolve_columns(rows: &[ElementRef<'_>], th: &Selector) -> Option<ColumnMap> {
    let header = rows.iter().find(|row| row.select(th).next().is_some())?;
    let labels: Vec<String> = header
        .select(th)
        .map(|cell| normalize_label(&cell_text(cell)))
        .collect();

    Some(ColumnMap {
        team: find_label(&labels, &["team"])?,
        adj_offense: find_label(&labels, &["adjoe", "adjo"])?,
        adj_defense: find_label(&labels, &["adjde", "adjd"])?,
        tempo: find_label(&labels, &["adjt", "tempo"])?,
        strength_of_schedule: find_label(&labels, &["sos", "strengthofschedule"])?,
    })
}

fn find_label(labels: &[String], wanted: &[&str]) -> Option<usize> {
    labels
        .iter()
        .position(|label| wanted.iter().any(|w| label == w))
}

fn rating_from_cells(cells: &[String], columns: ColumnMap) -> Option<TeamRating> {
    let team = clean_team_cell(cells.get(columns.team)?);
    if team.is_empty() {
        return None;
    }
    Some(TeamRating {
        team,
        adj_offense: parse_metric(cells.get(columns.adj_offense)?)?,
        adj_defense: parse_metric(cells.get(columns.adj_defense)?)?,
        tempo: parse_metric(cells.get(columns.tempo)?)?,
        strength_of_schedule: parse_metric(cells.get(columns.strength_of_schedule)?)?,
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Metric cells nest the value next to a small rank marker, so take the first
/// token that reads as a number.
fn parse_metric(raw: &str) -> Option<f64> {
    raw.split_whitespace().next()?.parse::<f64>().ok()
}

/// The team cell nests rank and seed numbers around the name; strip the
/// purely numeric tokens from both ends.
fn clean_team_cell(raw: &str) -> String {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    let leading = tokens.iter().take_while(|t| is_numeric_token(t)).count();
    let trailing = tokens
        .iter()
        .rev()
        .take_while(|t| is_numeric_token(t))
        .count();
    if leading + trailing >= tokens.len() {
        return String::new();
    }
    tokens[leading..tokens.len() - trailing].join(" ")
}

fn is_numeric_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn css(selector: &'static str) -> Selector {
    Selector::parse(selector).expect("static css selector")
}

#[cfg(test)]
mod tests {
    use super::{
        FALLBACK_COLUMNS, clean_team_cell, parse_metric, parse_ratings_html, rating_from_cells,
    };
    use crate::error::SourceError;

    #[test]
    fn team_cell_is_stripped_of_rank_and_seed() {
        assert_eq!(clean_team_cell("1 Duke 2"), "Duke");
        assert_eq!(clean_team_cell("Michigan St."), "Michigan St.");
        assert_eq!(clean_team_cell("3"), "");
    }

    #[test]
    fn metric_takes_first_numeric_token() {
        assert_eq!(parse_metric("118.4 3"), Some(118.4));
        assert_eq!(parse_metric("  95.0"), Some(95.0));
        assert_eq!(parse_metric("n/a"), None);
    }

    #[test]
    fn fallback_offsets_apply_without_header_labels() {
        let cells: Vec<String> = [
            "1", "Duke", "ACC", "30", "118.4", "95.0", ".9500", "67.2", "52.1", "48.0", "18.0",
            "28.0", "10.1", "30.5", "8.3",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let rating = rating_from_cells(&cells, FALLBACK_COLUMNS).expect("row should parse");
        assert_eq!(rating.team, "Duke");
        assert_eq!(rating.adj_offense, 118.4);
        assert_eq!(rating.adj_defense, 95.0);
        assert_eq!(rating.tempo, 67.2);
        assert_eq!(rating.strength_of_schedule, 8.3);
    }

    #[test]
    fn short_row_is_rejected() {
        let cells: Vec<String> = ["1", "Duke", "ACC"].iter().map(|s| s.to_string()).collect();
        assert!(rating_from_cells(&cells, FALLBACK_COLUMNS).is_none());
    }

    #[test]
    fn page_without_table_is_schema_mismatch() {
        let err = parse_ratings_html("<html><body><p>maintenance</p></body></html>")
            .expect_err("no table should fail");
        assert!(matches!(err, SourceError::SchemaMismatch { .. }));
    }

    #[test]
    fn table_with_only_garbage_rows_is_schema_mismatch() {
        let html = r#"<table class="t-rankings-table">
            <tr><th>Team</th><th>AdjOE</th><th>AdjDE</th><th>AdjT</th><th>SOS</th></tr>
            <tr><td>Duke</td><td>oops</td><td>95.0</td><td>67.2</td><td>8.3</td></tr>
        </table>"#;
        let err = parse_ratings_html(html).expect_err("zero accepted rows should fail");
        assert!(matches!(err, SourceError::SchemaMismatch { .. }));
    }

    #[test]
    fn duplicate_team_row_is_counted_as_skipped() {
        let html = r#"<table>
            <tr><th>Team</th><th>AdjOE</th><th>AdjDE</th><th>AdjT</th><th>SOS</th></tr>
            <tr><td>Duke</td><td>118.4</td><td>95.0</td><td>67.2</td><td>8.3</td></tr>
            <tr><td>Duke</td><td>117.0</td><td>96.0</td><td>66.0</td><td>8.0</td></tr>
        </table>"#;
        let extract = parse_ratings_html(html).expect("fixture should parse");
        assert_eq!(extract.teams.len(), 1);
        assert_eq!(extract.teams[0].adj_offense, 118.4);
        assert_eq!(extract.skipped_rows, 1);
    }

    #[test]
    fn header_labels_override_fallback_offsets() {
        // Metrics deliberately not at the live-page offsets.
        let html = r#"<table>
            <tr><th>Team</th><th>Conf</th><th>AdjOE</th><th>AdjDE</th><th>AdjT</th><th>SOS</th></tr>
            <tr><td>Duke</td><td>ACC</td><td>118.4</td><td>95.0</td><td>67.2</td><td>8.3</td></tr>
        </table>"#;
        let extract = parse_ratings_html(html).expect("labeled header should parse");
        assert_eq!(extract.teams.len(), 1);
        assert_eq!(extract.teams[0].adj_offense, 118.4);
        assert_eq!(extract.teams[0].strength_of_schedule, 8.3);
        assert_eq!(extract.skipped_rows, 0);
    }
}
