use std::fs;
use std::path::PathBuf;

use cbb_edge::error::SourceError;
use cbb_edge::odds_fetch::parse_odds_json;
use cbb_edge::ratings_fetch::parse_ratings_html;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_ratings_fixture() {
    let raw = read_fixture("ratings_page.html");
    let extract = parse_ratings_html(&raw).expect("fixture should parse");

    assert_eq!(extract.teams.len(), 3);
    assert_eq!(extract.skipped_rows, 1);

    let duke = &extract.teams[0];
    assert_eq!(duke.team, "Duke");
    assert_eq!(duke.adj_offense, 118.4);
    assert_eq!(duke.adj_defense, 95.0);
    assert_eq!(duke.tempo, 67.2);
    assert_eq!(duke.strength_of_schedule, 8.3);

    assert_eq!(extract.teams[1].team, "Kansas");
    assert_eq!(extract.teams[2].team, "Houston");
}

#[test]
fn malformed_tempo_row_is_counted_not_raised() {
    // Gonzaga's tempo cell is an em dash in the fixture.
    let raw = read_fixture("ratings_page.html");
    let extract = parse_ratings_html(&raw).expect("fixture should parse");
    assert!(extract.teams.iter().all(|t| t.team != "Gonzaga"));
    assert_eq!(extract.skipped_rows, 1);
}

#[test]
fn ratings_parse_is_idempotent() {
    let raw = read_fixture("ratings_page.html");
    let first = parse_ratings_html(&raw).expect("fixture should parse");
    let second = parse_ratings_html(&raw).expect("fixture should parse");
    assert_eq!(first.teams, second.teams);
    assert_eq!(first.skipped_rows, second.skipped_rows);
}

#[test]
fn tableless_page_is_schema_mismatch() {
    let err = parse_ratings_html("<html><body>site maintenance</body></html>")
        .expect_err("no table should fail");
    assert!(matches!(err, SourceError::SchemaMismatch { .. }));
}

#[test]
fn parses_odds_fixture() {
    let raw = read_fixture("odds_response.json");
    let lines = parse_odds_json(&raw).expect("fixture should parse");

    // BookY lacks a totals market, the Wyoming game has no bookmakers at all.
    assert_eq!(lines.len(), 2);

    let duke = &lines[0];
    assert_eq!(duke.team_a, "Duke");
    assert_eq!(duke.team_b, "North Carolina");
    assert_eq!(duke.bookmaker, "BookX");
    assert_eq!(duke.spread, -20.0);
    assert_eq!(duke.over_under, 210.0);
    assert_eq!(duke.moneyline_a, -450);
    assert_eq!(duke.moneyline_b, 350);

    let kansas = &lines[1];
    assert_eq!(kansas.team_a, "Kansas");
    assert_eq!(kansas.bookmaker, "BookX");
    assert_eq!(kansas.spread, -6.5);
    assert_eq!(kansas.over_under, 148.5);
}

#[test]
fn bookmaker_missing_totals_does_not_sink_siblings() {
    let raw = read_fixture("odds_response.json");
    let lines = parse_odds_json(&raw).expect("fixture should parse");

    let duke_books: Vec<&str> = lines
        .iter()
        .filter(|line| line.team_a == "Duke")
        .map(|line| line.bookmaker.as_str())
        .collect();
    assert_eq!(duke_books, vec!["BookX"]);
}

#[test]
fn game_without_bookmakers_yields_no_lines() {
    let raw = read_fixture("odds_response.json");
    let lines = parse_odds_json(&raw).expect("fixture should parse");
    assert!(lines.iter().all(|line| line.team_a != "Wyoming"));
}
