use super::{backtest, validate};
use chrono::{Days, NaiveDate};
use crossover_application::config::Config;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_tmp_dir(name: &str) -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!(
        "crossover_cli_{name}_{}_{}",
        std::process::id(),
        now
    ));
    fs::create_dir_all(&dir).expect("create tmp dir");
    dir
}

fn write_prices(dir: &PathBuf, symbol: &str, len: usize) {
    let start = NaiveDate::from_ymd_opt(2010, 1, 4).expect("date");
    let mut csv = String::from("date,price\n");
    for i in 0..len {
        let price = 50.0 + (i as f64 * 0.3).sin() * 4.0 + i as f64 * 0.05;
        csv.push_str(&format!("{},{}\n", start + Days::new(i as u64), price));
    }
    fs::write(dir.join(format!("{symbol}.csv")), csv).expect("write csv");
}

fn sample_config(dir: &PathBuf, instruments: &[&str]) -> Config {
    let mut config = Config::default();
    config.run.instruments = instruments.iter().map(|s| s.to_string()).collect();
    config.strategy.short_window = 3;
    config.strategy.long_window = 10;
    config.data.prices_dir = dir.display().to_string();
    config
}

#[test]
fn backtest_prints_stats_and_errors() {
    let dir = unique_tmp_dir("backtest");
    write_prices(&dir, "SPY", 80);
    let config = sample_config(&dir, &["SPY", "MISSING"]);

    let (mut out, mut err) = (Vec::new(), Vec::new());
    backtest::execute(&config, false, &mut out, &mut err).expect("one instrument succeeded");

    let out = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Stats for SPY:");
    assert!(lines[1].starts_with("total_return_pct "));
    assert!(lines[4].starts_with("win_rate_pct "));
    assert_eq!(lines.len(), 5);
    assert!(String::from_utf8(err)
        .expect("utf8")
        .starts_with("Error for MISSING: "));
}

#[test]
fn backtest_json_emits_one_line_per_instrument() {
    let dir = unique_tmp_dir("json");
    write_prices(&dir, "A", 40);
    write_prices(&dir, "B", 40);
    let config = sample_config(&dir, &["A", "B"]);

    let (mut out, mut err) = (Vec::new(), Vec::new());
    backtest::execute(&config, true, &mut out, &mut err).expect("backtest");

    let out = String::from_utf8(out).expect("utf8");
    let values: Vec<serde_json::Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["symbol"], "A");
    assert!(values[1]["report"]["sharpe_ratio"].is_number());
    assert!(err.is_empty());
}

#[test]
fn backtest_fails_when_every_instrument_fails() {
    let dir = unique_tmp_dir("allfail");
    let config = sample_config(&dir, &["X", "Y"]);
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let result = backtest::execute(&config, false, &mut out, &mut err);
    assert!(result.expect_err("all failed").contains("all 2 instrument(s) failed"));
}

#[test]
fn backtest_rejects_invalid_configuration() {
    let dir = unique_tmp_dir("badcfg");
    let mut config = sample_config(&dir, &["SPY"]);
    config.strategy.long_window = 2;
    let (mut out, mut err) = (Vec::new(), Vec::new());
    let result = backtest::execute(&config, false, &mut out, &mut err);
    assert!(result.expect_err("invalid").contains("invalid configuration"));
    assert!(out.is_empty());
}

#[test]
fn validate_strict_rejects_dropped_rows() {
    let dir = unique_tmp_dir("validate");
    fs::write(
        dir.join("GAP.csv"),
        "date,price\n2024-01-02,10\n2024-01-03,\n2024-01-04,11\n",
    )
    .expect("write csv");
    let config = sample_config(&dir, &["GAP"]);

    let mut out = Vec::new();
    validate::execute(&config, false, &mut out).expect("lenient ok");
    let text = String::from_utf8(out).expect("utf8");
    assert!(text.starts_with("GAP ok rows=2 missing_price=1"), "text = {text}");
    assert!(text.contains("insufficient_data"));

    let mut out = Vec::new();
    let err = validate::execute(&config, true, &mut out).expect_err("strict fails");
    assert!(err.contains("validation failed for 1 of 1"));
}
