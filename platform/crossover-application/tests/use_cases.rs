use chrono::{Days, NaiveDate};
use crossover_application::backtesting::{run_backtest, RunError};
use crossover_application::config::Config;
use crossover_application::validation::validate;
use crossover_domain::errors::PipelineError;
use crossover_domain::repositories::price_data::{PriceQuery, PriceRepository};
use crossover_domain::services::quality::{data_quality_from_points, DataQualityReport};
use crossover_domain::value_objects::price_point::PricePoint;
use crossover_infrastructure::market_data::CsvPriceRepository;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Default)]
struct FakePriceRepo {
    series: HashMap<String, Vec<PricePoint>>,
    loads: AtomicUsize,
}

impl FakePriceRepo {
    fn with(mut self, symbol: &str, prices: &[f64]) -> Self {
        let start = NaiveDate::from_ymd_opt(2012, 3, 1).expect("date");
        let points = prices
            .iter()
            .enumerate()
            .map(|(idx, price)| PricePoint::new(start + Days::new(idx as u64), *price))
            .collect();
        self.series.insert(symbol.to_string(), points);
        self
    }
}

impl PriceRepository for FakePriceRepo {
    fn load_prices(
        &self,
        query: &PriceQuery,
    ) -> Result<(Vec<PricePoint>, DataQualityReport), String> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let points = self
            .series
            .get(&query.symbol)
            .cloned()
            .ok_or_else(|| format!("no data for {}", query.symbol))?;
        let report = data_quality_from_points(&points);
        Ok((points, report))
    }
}

fn config(instruments: &[&str], short: usize, long: usize, parallelism: usize) -> Config {
    let mut config = Config::default();
    config.run.instruments = instruments.iter().map(|s| s.to_string()).collect();
    config.run.parallelism = parallelism;
    config.strategy.short_window = short;
    config.strategy.long_window = long;
    config
}

fn trending(len: usize, seed: f64) -> Vec<f64> {
    (0..len)
        .map(|i| 100.0 + (i as f64 * 0.21 + seed).sin() * 9.0 + i as f64 * 0.1)
        .collect()
}

#[test]
fn backtest_reports_every_instrument_in_order() {
    let repo = FakePriceRepo::default()
        .with("SPY", &trending(120, 0.0))
        .with("NVDA", &trending(120, 1.3));
    let batch = run_backtest(&config(&["SPY", "NVDA"], 5, 20, 1), &repo).expect("batch");

    let symbols: Vec<&str> = batch.runs.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["SPY", "NVDA"]);
    assert_eq!(batch.succeeded().count(), 2);
    assert!(!batch.all_failed());

    let spy = batch.runs[0].outcome.as_ref().expect("spy ok");
    assert_eq!(spy.rows, 120);
    assert_eq!(spy.defined_signals, 101);
    assert!(!spy.insufficient_data);
    assert!(spy.report.max_drawdown_pct <= 0.0);
}

#[test]
fn failing_instrument_does_not_abort_the_batch() {
    let repo = FakePriceRepo::default()
        .with("GOOD", &trending(60, 0.4))
        .with("NEG", &[10.0, 11.0, -1.0, 12.0]);
    let batch = run_backtest(&config(&["NEG", "MISSING", "GOOD"], 3, 8, 1), &repo)
        .expect("batch");

    assert_eq!(batch.runs.len(), 3);
    match &batch.runs[0].outcome {
        Err(RunError::Pipeline {
            symbol,
            source: PipelineError::MalformedInput { .. },
        }) => assert_eq!(symbol, "NEG"),
        other => panic!("unexpected outcome {other:?}"),
    }
    match &batch.runs[1].outcome {
        Err(err @ RunError::Load { .. }) => {
            assert_eq!(err.symbol(), "MISSING");
            assert!(err.to_string().contains("MISSING"));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(batch.runs[2].outcome.is_ok());
    assert_eq!(batch.failed().count(), 2);

    let json = batch.runs[1].to_json();
    assert_eq!(json["symbol"], "MISSING");
    assert!(json["error"].as_str().is_some());
}

#[test]
fn invalid_configuration_fails_before_loading() {
    let repo = FakePriceRepo::default().with("SPY", &trending(60, 0.0));
    let err = run_backtest(&config(&["SPY"], 20, 20, 1), &repo).expect_err("invalid");
    assert!(matches!(err, PipelineError::InvalidConfiguration(_)));
    assert_eq!(repo.loads.load(Ordering::Relaxed), 0);
}

#[test]
fn short_history_is_reported_not_rejected() {
    let repo = FakePriceRepo::default().with("IPO", &[20.0, 21.0, 19.0]);
    let batch = run_backtest(&config(&["IPO"], 20, 50, 1), &repo).expect("batch");
    let report = batch.runs[0].outcome.as_ref().expect("ok");
    assert!(report.insufficient_data);
    assert_eq!(report.defined_signals, 0);
    assert_eq!(report.report.total_return_pct, 0.0);
    assert_eq!(report.report.sharpe_ratio, 0.0);
}

#[test]
fn parallel_batch_matches_sequential_batch() {
    let symbols = ["A", "B", "C", "D", "E", "F"];
    let mut repo = FakePriceRepo::default();
    for (idx, symbol) in symbols.iter().enumerate() {
        repo = repo.with(symbol, &trending(90 + idx * 7, idx as f64));
    }
    repo = repo.with("BAD", &[5.0, 5.0]);
    let mut with_bad: Vec<&str> = symbols.to_vec();
    with_bad.insert(3, "BAD");

    let sequential = run_backtest(&config(&with_bad, 4, 12, 1), &repo).expect("seq");
    let parallel = run_backtest(&config(&with_bad, 4, 12, 3), &repo).expect("par");

    assert_eq!(sequential, parallel);
    assert_eq!(parallel.runs[3].symbol, "BAD");
    assert!(parallel.runs[3].outcome.is_ok());
}

#[test]
fn validate_flags_malformed_and_missing_instruments() {
    let repo = FakePriceRepo::default()
        .with("OK", &trending(30, 0.0))
        .with("BACK", &[1.0, 2.0]);
    let mut repo = repo;
    if let Some(points) = repo.series.get_mut("BACK") {
        points.reverse();
    }

    let report = validate(&config(&["OK", "BACK", "NONE"], 2, 5, 1), false, &repo)
        .expect("validate");
    assert!(!report.ok());
    assert!(report.instruments[0].ok);
    assert!(!report.instruments[1].ok);
    assert_eq!(
        report.instruments[1]
            .data_quality
            .as_ref()
            .map(|q| q.out_of_order),
        Some(1)
    );
    assert!(!report.instruments[2].ok);
    assert!(report.instruments[2].data_quality.is_none());

    let json = report.to_json();
    assert_eq!(json["instruments"][0]["symbol"], "OK");
}

fn unique_tmp_dir(name: &str) -> std::path::PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!(
        "crossover_app_{name}_{}_{}",
        std::process::id(),
        now
    ));
    std::fs::create_dir_all(&dir).expect("tmp dir");
    dir
}

#[test]
fn csv_backed_backtest_drops_missing_rows() {
    let dir = unique_tmp_dir("csv");
    let mut csv = String::from("date,price\n");
    let start = NaiveDate::from_ymd_opt(2010, 1, 4).expect("date");
    for (idx, price) in trending(40, 0.0).iter().enumerate() {
        let date = start + Days::new(idx as u64);
        if idx == 10 {
            csv.push_str(&format!("{date},\n"));
        } else {
            csv.push_str(&format!("{date},{price}\n"));
        }
    }
    std::fs::write(dir.join("SPY.csv"), csv).expect("write csv");

    let repo = CsvPriceRepository::new(&dir);
    let mut cfg = config(&["SPY"], 3, 9, 1);
    cfg.data.prices_dir = dir.display().to_string();

    let batch = run_backtest(&cfg, &repo).expect("batch");
    let report = batch.runs[0].outcome.as_ref().expect("ok");
    assert_eq!(report.rows, 39);
    assert_eq!(report.data_quality.missing_price, 1);

    let strict = validate(&cfg, true, &repo).expect("validate");
    assert!(!strict.ok());
    let lenient = validate(&cfg, false, &repo).expect("validate");
    assert!(lenient.ok());
}

#[test]
fn bundled_sample_config_runs_against_demo_data() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let config =
        crossover_application::config::load_config(&root.join("configs/sample.toml"))
            .expect("sample config");
    let repo = CsvPriceRepository::new(root.join(&config.data.prices_dir));

    let batch = run_backtest(&config, &repo).expect("batch");
    let demo = batch.runs[0].outcome.as_ref().expect("demo ok");
    assert_eq!(demo.symbol, "DEMO");
    assert_eq!(demo.rows, 120);
    assert!(demo.data_quality.is_clean());
}
