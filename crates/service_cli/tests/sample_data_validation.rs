//! Validation tests for the bundled sample data.

use dv01_core::{FirmFinancials, PositionBook, PositionRecord, RiskConfig, ScenarioShift};
use dv01_risk::RiskEngine;
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn read_firm_feed() -> Vec<PositionRecord> {
    let path = data_dir().join("positions/firm_feed.csv");
    let mut reader = csv::Reader::from_path(&path).expect("Should read firm_feed.csv");
    reader
        .records()
        .map(|row| {
            let row = row.expect("Each row should be well-formed CSV");
            PositionRecord::new(&row[0], &row[1], &row[2])
        })
        .collect()
}

#[test]
fn test_trader_sheets_have_expected_headers() {
    for sheet in ["desk_a.csv", "desk_b.csv", "desk_c.csv"] {
        let path = data_dir().join("positions").join(sheet);
        assert!(path.exists(), "{} should exist", sheet);

        let mut reader = csv::Reader::from_path(&path).expect("Should open sheet");
        let headers = reader.headers().expect("Should have headers");
        assert!(headers.iter().any(|h| h == "Tenor"), "Should have Tenor column");
        assert!(headers.iter().any(|h| h == "Contracts"), "Should have Contracts column");
        assert!(!headers.iter().any(|h| h == "trader"), "Sheets carry no trader column");
    }
}

#[test]
fn test_sample_config_is_valid() {
    let config =
        RiskConfig::from_file(&data_dir().join("dv01.toml")).expect("Should parse dv01.toml");
    config.validate().expect("Sample config should validate");
    assert_eq!(config, RiskConfig::default());
}

#[test]
fn test_sample_scenario_parses() {
    let scenario =
        ScenarioShift::from_file(&data_dir().join("scenario.toml")).expect("Should parse scenario");
    assert_eq!(scenario.len(), 3);
    assert_eq!(scenario.shift_for(&"10Y".into()), 15);
}

#[test]
fn test_firm_feed_evaluates() {
    let (book, rejected) = PositionBook::from_records(read_firm_feed());
    assert_eq!(rejected.len(), 1, "Carol's row is deliberately malformed");
    assert_eq!(book.trader_count(), 2);

    let scenario = ScenarioShift::from_file(&data_dir().join("scenario.toml")).unwrap();
    let engine = RiskEngine::new(RiskConfig::default()).unwrap();
    let evaluation = engine.evaluate(&book, &scenario, &FirmFinancials::unknown());

    let alice = evaluation.trader(&"Alice".into()).unwrap();
    assert_eq!(alice.summary.total_dv01, 750.0);
    assert_eq!(alice.breaches().count(), 1);

    let bob = evaluation.trader(&"Bob".into()).unwrap();
    assert_eq!(bob.summary.total_dv01, 0.0);
    assert_eq!(bob.summary.gross_dv01, 50_000.0);
    assert_eq!(bob.breaches().count(), 2);
    assert_eq!(bob.summary.scenario_pnl, -125_000.0);

    assert_eq!(evaluation.firm.total_dv01, 750.0);
    assert_eq!(evaluation.firm.breach_count, 3);
}
