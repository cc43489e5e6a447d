use std::collections::HashSet;
use std::env;

use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::error::SourceError;
use crate::http_client::{BROWSER_USER_AGENT, http_client};

const SOURCE: &str = "odds";
const ODDS_API_BASE: &str = "https://api.the-odds-api.com/v4/sports";
const SPORT_KEY: &str = "basketball_ncaab";
const MARKETS: &str = "h2h,spreads,totals";

const MONEYLINE_MARKET: &str = "h2h";
const SPREAD_MARKET: &str = "spreads";
const TOTALS_MARKET: &str = "totals";
const OVER_OUTCOME: &str = "Over";

#[derive(Debug, Clone)]
pub struct OddsApiConfig {
    /// Supplied via `ODDS_API_KEY`; never baked into the binary and never
    /// echoed into logs or error strings.
    pub api_key: Option<String>,
    pub regions: String,
}

impl OddsApiConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("ODDS_API_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let regions = env::var("ODDS_REGIONS")
            .unwrap_or_else(|_| "us".to_string())
            .trim()
            .to_ascii_lowercase();
        Self { api_key, regions }
    }
}

/// One sportsbook's current line on one game, home side first.
#[derive(Debug, Clone, PartialEq)]
pub struct BookLine {
    pub team_a: String,
    pub team_b: String,
    pub bookmaker: String,
    pub spread: f64,
    pub over_under: f64,
    pub moneyline_a: i32,
    pub moneyline_b: i32,
}

#[derive(Debug, Deserialize)]
struct OddsEvent {
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<OddsBookmaker>,
}

#[derive(Debug, Deserialize)]
struct OddsBookmaker {
    title: String,
    #[serde(default)]
    markets: Vec<OddsMarket>,
}

#[derive(Debug, Deserialize)]
struct OddsMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<OddsOutcome>,
}

#[derive(Debug, Deserialize)]
struct OddsOutcome {
    name: String,
    price: f64,
    #[serde(default)]
    point: Option<f64>,
}

pub fn fetch_book_lines(cfg: &OddsApiConfig) -> Result<Vec<BookLine>, SourceError> {
    let Some(api_key) = cfg.api_key.as_ref() else {
        return Err(SourceError::unavailable(SOURCE, "ODDS_API_KEY missing"));
    };

    let client =
        http_client().map_err(|err| SourceError::unavailable(SOURCE, err.to_string()))?;
    let url = format!("{ODDS_API_BASE}/{SPORT_KEY}/odds");
    let resp = client
        .get(&url)
        .query(&[
            ("apiKey", api_key.as_str()),
            ("regions", cfg.regions.as_str()),
            ("markets", MARKETS),
            ("oddsFormat", "american"),
        ])
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .map_err(|err| SourceError::unavailable(SOURCE, format!("request failed: {err}")))?;

    let status = resp.status();
    let body = resp
        .text()
        .map_err(|err| SourceError::unavailable(SOURCE, format!("failed reading body: {err}")))?;
    if !status.is_success() {
        // Covers auth rejections and quota exhaustion as well as 5xx.
        let snippet = body
            .trim()
            .replace(['\n', '\r'], " ")
            .chars()
            .take(220)
            .collect::<String>();
        return Err(SourceError::unavailable(
            SOURCE,
            format!("http {status}: {snippet}"),
        ));
    }

    parse_odds_json(&body)
}

/// Extract one [`BookLine`] per (game, bookmaker) pair. A bookmaker entry
/// missing any required market or outcome is dropped on its own; its siblings
/// in the same game still count. An empty result is a valid "no odds
/// currently offered" state, not a failure.
pub fn parse_odds_json(raw: &str) -> Result<Vec<BookLine>, SourceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }

    let events: Vec<OddsEvent> = serde_json::from_str(trimmed)
        .map_err(|err| SourceError::schema_mismatch(SOURCE, format!("invalid odds json: {err}")))?;

    let mut lines = Vec::new();
    let mut seen = HashSet::new();
    for event in &events {
        for bookmaker in &event.bookmakers {
            let Some(line) = book_line_from_entry(event, bookmaker) else {
                continue;
            };
            // (home side, bookmaker) is unique within a cycle; keep the first
            // entry if the payload repeats a game.
            if seen.insert((line.team_a.clone(), line.bookmaker.clone())) {
                lines.push(line);
            }
        }
    }

    Ok(lines)
}

fn book_line_from_entry(event: &OddsEvent, bookmaker: &OddsBookmaker) -> Option<BookLine> {
    let moneyline = find_market(bookmaker, MONEYLINE_MARKET)?;
    let spreads = find_market(bookmaker, SPREAD_MARKET)?;
    let totals = find_market(bookmaker, TOTALS_MARKET)?;

    let spread = outcome_named(spreads, &event.home_team)?.point?;
    let over_under = outcome_named(totals, OVER_OUTCOME)?.point?;
    let moneyline_a = american_price(outcome_named(moneyline, &event.home_team)?);
    let moneyline_b = american_price(outcome_named(moneyline, &event.away_team)?);

    Some(BookLine {
        team_a: event.home_team.trim().to_string(),
        team_b: event.away_team.trim().to_string(),
        bookmaker: bookmaker.title.trim().to_string(),
        spread,
        over_under,
        moneyline_a,
        moneyline_b,
    })
}

// Markets are located by key rather than array position; the API does not
// promise an ordering.
fn find_market<'a>(bookmaker: &'a OddsBookmaker, key: &str) -> Option<&'a OddsMarket> {
    bookmaker
        .markets
        .iter()
        .find(|market| market.key.eq_ignore_ascii_case(key))
}

fn outcome_named<'a>(market: &'a OddsMarket, name: &str) -> Option<&'a OddsOutcome> {
    let wanted = name.trim();
    market
        .outcomes
        .iter()
        .find(|outcome| outcome.name.trim().eq_ignore_ascii_case(wanted))
}

// American prices are whole numbers; the API still serializes them as JSON
// floats.
fn american_price(outcome: &OddsOutcome) -> i32 {
    outcome.price.round() as i32
}
