//! 배치 실행기 통합 테스트.
//!
//! CSV 디렉터리에서 여러 종목을 읽어 처리하고, 실패한 종목이
//! 나머지 종목의 결과에 영향을 주지 않는지 검증합니다.

use std::path::Path;

use chrono::{Duration, NaiveDate};

use edge_cli::commands::backtest::{emit_results, run_batch, BacktestCliConfig, OutputFormat};
use edge_core::{AppConfig, ModelConfig, SignalFilter};
use edge_data::{CsvPriceSource, StaticFundamentalSource};

fn write_prices(dir: &Path, symbol: &str, n: usize) {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut text = String::from("date,open,high,low,close,volume\n");
    for i in 0..n {
        let t = i as f64;
        let close = 80.0 + t * 0.04 + (t / 5.0).sin() * 1.5;
        text.push_str(&format!(
            "{},{:.4},{:.4},{:.4},{:.4},{}\n",
            start + Duration::days(i as i64),
            close - 0.2,
            close + 0.6,
            close - 0.6,
            close,
            5_000 + i
        ));
    }
    std::fs::write(dir.join(format!("{}.csv", symbol)), text).unwrap();
}

fn test_config(dir: &Path, symbols: &[&str]) -> AppConfig {
    let mut config = AppConfig::default();
    config.data.csv_dir = dir.to_path_buf();
    config.pipeline.symbols = symbols.iter().map(|s| s.to_string()).collect();
    config.pipeline.signal_filter = SignalFilter::AllRows;
    config.model = ModelConfig {
        hidden_layers: vec![8],
        dropout: vec![0.0],
        epochs: 2,
        forest_trees: 3,
        forest_max_depth: 3,
        ..ModelConfig::default()
    };
    config
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path(), "AAA", 160);
    write_prices(dir.path(), "SHORT", 12);
    write_prices(dir.path(), "CCC", 160);

    let config = test_config(dir.path(), &["AAA", "MISSING", "SHORT", "CCC"]);
    let prices = CsvPriceSource::new(dir.path());
    let fundamentals = StaticFundamentalSource::new();

    let batch = run_batch(&config, &prices, &fundamentals, None).await;

    let symbols: Vec<_> = batch.aggregator.rows().into_iter().map(|r| r.symbol).collect();
    assert_eq!(symbols, vec!["AAA", "CCC"]);

    let skipped: Vec<_> = batch
        .aggregator
        .skipped()
        .iter()
        .map(|s| s.symbol.as_str())
        .collect();
    assert_eq!(skipped, vec!["MISSING", "SHORT"]);
    assert_eq!(batch.outcomes.len(), 2);
}

#[tokio::test]
async fn test_batch_is_independent_of_neighbours() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path(), "AAA", 160);
    write_prices(dir.path(), "BBB", 140);

    let prices = CsvPriceSource::new(dir.path());
    let fundamentals = StaticFundamentalSource::new();

    let alone = run_batch(&test_config(dir.path(), &["AAA"]), &prices, &fundamentals, None).await;
    let together = run_batch(
        &test_config(dir.path(), &["BBB", "AAA"]),
        &prices,
        &fundamentals,
        None,
    )
    .await;

    assert_eq!(alone.aggregator.reports()[0], together.aggregator.reports()[1]);
}

#[tokio::test]
async fn test_emit_results_writes_exports() {
    let dir = tempfile::tempdir().unwrap();
    write_prices(dir.path(), "AAA", 160);

    let config = test_config(dir.path(), &["AAA"]);
    let prices = CsvPriceSource::new(dir.path());
    let batch = run_batch(&config, &prices, &StaticFundamentalSource::new(), None).await;

    let output = dir.path().join("summary.csv");
    let trades_dir = dir.path().join("trades");
    let cli = BacktestCliConfig {
        output: Some(output.clone()),
        format: OutputFormat::Csv,
        trades_dir: Some(trades_dir.clone()),
        ..Default::default()
    };
    emit_results(&batch.aggregator, &cli).unwrap();

    let summary = std::fs::read_to_string(&output).unwrap();
    assert!(summary.starts_with("Symbol,"));
    assert!(summary.contains("AAA"));
    let has_trades = !batch.aggregator.reports()[0].trades.is_empty();
    assert_eq!(trades_dir.join("AAA_trades.csv").exists(), has_trades);
}
