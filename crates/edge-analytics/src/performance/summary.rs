//! 종목별 성과 리포트 집계.
//!
//! 배치 실행 중 종목마다 생성된 [`MetricsReport`]를 모아 표/CSV/JSON으로 내보냅니다.
//! 종목 간 합산(포트폴리오 수준 집계)은 하지 않습니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let mut aggregator = MetricsAggregator::new();
//! aggregator.push(outcome.report);
//! aggregator.record_skip("TSLA", "매수 신호 없음");
//!
//! println!("{}", aggregator.render_table());
//! aggregator.write_csv_path("reports/summary.csv")?;
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use edge_core::Side;

use crate::backtest::MetricsReport;

/// 리포트 내보내기 에러
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 쓰기 오류: {0}")]
    Csv(#[from] csv::Error),

    #[error("직렬화 오류: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// 요약 표의 한 행
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Cumulative Return")]
    pub cumulative_return: f64,
    #[serde(rename = "Max Drawdown")]
    pub max_drawdown: f64,
    #[serde(rename = "Sharpe Ratio")]
    pub sharpe_ratio: f64,
    #[serde(rename = "Hit Ratio")]
    pub hit_ratio: f64,
    #[serde(rename = "Trades")]
    pub trades: usize,
}

impl From<&MetricsReport> for SummaryRow {
    fn from(report: &MetricsReport) -> Self {
        Self {
            symbol: report.symbol.clone(),
            cumulative_return: report.cumulative_return,
            max_drawdown: report.max_drawdown,
            sharpe_ratio: report.sharpe_ratio,
            hit_ratio: report.hit_ratio,
            trades: report.total_trades,
        }
    }
}

/// 건너뛴 종목과 사유
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub symbol: String,
    pub reason: String,
}

#[derive(Serialize)]
struct JsonExport<'a> {
    results: Vec<SummaryRow>,
    skipped: &'a [SkippedInstrument],
}

/// 종목별 리포트 수집기
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    reports: Vec<MetricsReport>,
    skipped: Vec<SkippedInstrument>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 리포트를 추가합니다 (입력 순서 유지).
    pub fn push(&mut self, report: MetricsReport) {
        debug!(symbol = %report.symbol, "리포트 수집");
        self.reports.push(report);
    }

    /// 처리하지 못한 종목을 기록합니다.
    pub fn record_skip(&mut self, symbol: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedInstrument {
            symbol: symbol.into(),
            reason: reason.into(),
        });
    }

    pub fn reports(&self) -> &[MetricsReport] {
        &self.reports
    }

    pub fn skipped(&self) -> &[SkippedInstrument] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn rows(&self) -> Vec<SummaryRow> {
        self.reports.iter().map(SummaryRow::from).collect()
    }

    /// 고정폭 텍스트 표를 생성합니다.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<10} {:>18} {:>14} {:>14} {:>10} {:>8}\n",
            "Symbol", "Cumulative Return", "Max Drawdown", "Sharpe Ratio", "Hit Ratio", "Trades"
        ));
        out.push_str(&format!("{}\n", "-".repeat(79)));

        for row in self.rows() {
            out.push_str(&format!(
                "{:<10} {:>17.2}% {:>13.2}% {:>14.4} {:>9.2}% {:>8}\n",
                row.symbol,
                row.cumulative_return * 100.0,
                row.max_drawdown * 100.0,
                row.sharpe_ratio,
                row.hit_ratio * 100.0,
                row.trades,
            ));
        }

        if !self.skipped.is_empty() {
            out.push_str(&format!("\n건너뛴 종목 {}개:\n", self.skipped.len()));
            for skip in &self.skipped {
                out.push_str(&format!("  {:<10} {}\n", skip.symbol, skip.reason));
            }
        }

        out
    }

    /// 요약 표를 CSV로 씁니다.
    pub fn write_csv<W: Write>(&self, writer: W) -> ReportResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// 요약 표를 CSV 파일로 저장합니다.
    pub fn write_csv_path(&self, path: impl AsRef<Path>) -> ReportResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(path)?;
        self.write_csv(file)?;
        info!(path = %path.display(), rows = self.reports.len(), "요약 CSV 저장");
        Ok(())
    }

    /// 요약과 건너뛴 종목을 JSON 문자열로 반환합니다.
    pub fn to_json(&self) -> ReportResult<String> {
        let export = JsonExport {
            results: self.rows(),
            skipped: &self.skipped,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// 종목별 거래 로그를 `<dir>/<SYMBOL>_trades.csv` 로 저장합니다.
    ///
    /// 거래가 없는 종목은 파일을 만들지 않습니다.
    pub fn write_trade_log(&self, dir: impl AsRef<Path>) -> ReportResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for report in self.reports.iter().filter(|r| !r.trades.is_empty()) {
            let path = dir.join(format!("{}_trades.csv", report.symbol));
            let mut wtr = csv::Writer::from_path(&path)?;

            wtr.write_record([
                "Date",
                "Trade Type",
                "Entry Price",
                "Exit Price",
                "Portfolio Value",
                "Reason",
            ])?;

            for trade in &report.trades {
                let entry = match trade.side {
                    Side::Buy => trade.entry_price.to_string(),
                    Side::Sell => String::new(),
                };
                let exit = trade.exit_price.map(|p| p.to_string()).unwrap_or_default();
                let side = match trade.side {
                    Side::Buy => "Buy",
                    Side::Sell => "Sell",
                };

                wtr.write_record([
                    trade.date.format("%Y-%m-%d").to_string(),
                    side.to_string(),
                    entry,
                    exit,
                    trade.portfolio_value_after.to_string(),
                    trade.exit_reason.to_string(),
                ])?;
            }

            wtr.flush()?;
            written.push(path);
        }

        info!(dir = %dir.display(), files = written.len(), "거래 로그 저장");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use edge_core::{ExitReason, Trade};
    use std::collections::BTreeMap;

    fn report(symbol: &str, cumulative_return: f64, trades: Vec<Trade>) -> MetricsReport {
        MetricsReport {
            symbol: symbol.to_string(),
            starting_capital: 100_000.0,
            final_value: 100_000.0 * (1.0 + cumulative_return),
            cumulative_return,
            max_drawdown: 0.05,
            sharpe_ratio: 1.25,
            hit_ratio: 0.5,
            total_trades: trades.len(),
            winning_trades: 1,
            trades,
            trades_per_day: BTreeMap::new(),
            daily_values: vec![],
        }
    }

    fn round_trip() -> Vec<Trade> {
        let buy_date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let sell_date = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        vec![
            Trade {
                date: buy_date,
                side: Side::Buy,
                entry_price: 100.0,
                exit_price: None,
                portfolio_value_after: 100_000.0,
                exit_reason: ExitReason::None,
            },
            Trade {
                date: sell_date,
                side: Side::Sell,
                entry_price: 100.0,
                exit_price: Some(104.0),
                portfolio_value_after: 104_000.0,
                exit_reason: ExitReason::Target,
            },
        ]
    }

    #[test]
    fn test_rows_preserve_push_order() {
        let mut agg = MetricsAggregator::new();
        agg.push(report("MSFT", 0.1, vec![]));
        agg.push(report("AAPL", -0.02, vec![]));

        let symbols: Vec<_> = agg.rows().into_iter().map(|r| r.symbol).collect();
        assert_eq!(symbols, vec!["MSFT", "AAPL"]);
    }

    #[test]
    fn test_render_table_lists_skips() {
        let mut agg = MetricsAggregator::new();
        agg.push(report("AAPL", 0.04, round_trip()));
        agg.record_skip("TSLA", "매수 신호 없음");

        let table = agg.render_table();
        assert!(table.contains("AAPL"));
        assert!(table.contains("4.00%"));
        assert!(table.contains("TSLA"));
        assert!(table.contains("매수 신호 없음"));
    }

    #[test]
    fn test_write_csv_header() {
        let mut agg = MetricsAggregator::new();
        agg.push(report("AAPL", 0.04, vec![]));

        let mut buf = Vec::new();
        agg.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Symbol,Cumulative Return,Max Drawdown,Sharpe Ratio,Hit Ratio,Trades"
        );
        assert!(lines.next().unwrap().starts_with("AAPL,"));
    }

    #[test]
    fn test_to_json_includes_skipped() {
        let mut agg = MetricsAggregator::new();
        agg.push(report("AAPL", 0.04, vec![]));
        agg.record_skip("TSLA", "이력 부족");

        let json: serde_json::Value = serde_json::from_str(&agg.to_json().unwrap()).unwrap();
        assert_eq!(json["results"][0]["Symbol"], "AAPL");
        assert_eq!(json["skipped"][0]["symbol"], "TSLA");
    }

    #[test]
    fn test_write_trade_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut agg = MetricsAggregator::new();
        agg.push(report("AAPL", 0.04, round_trip()));
        agg.push(report("MSFT", 0.0, vec![]));

        let written = agg.write_trade_log(dir.path()).unwrap();
        assert_eq!(written.len(), 1);

        let text = std::fs::read_to_string(&written[0]).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Date,Trade Type,Entry Price,Exit Price,Portfolio Value,Reason"
        );
        assert_eq!(lines[1], "2024-03-01,Buy,100,,100000,");
        assert_eq!(lines[2], "2024-03-04,Sell,,104,104000,Target");
    }
}
