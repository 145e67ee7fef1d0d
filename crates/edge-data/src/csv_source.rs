//! CSV 파일 기반 가격 소스.
//!
//! `<dir>/<SYMBOL>.csv` 파일에서 일봉 OHLCV를 읽습니다.
//!
//! # 파일 형식
//!
//! ```text
//! date,open,high,low,close,volume
//! 2024-01-02,187.15,188.44,183.89,185.64,82488700
//! 2024-01-03T00:00:00Z,184.22,185.88,183.43,184.25,58414500
//! ```
//!
//! 날짜는 `YYYY-MM-DD` 또는 RFC 3339 형식을 허용합니다.
//! 헤더는 `Date`, `Close` 처럼 첫 글자가 대문자여도 됩니다.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use edge_core::{PriceBar, PriceSeries};

use crate::error::{DataError, DataResult};
use crate::source::PriceSource;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "Date", alias = "datetime", alias = "Datetime")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

/// 디렉터리의 종목별 CSV 파일을 읽는 가격 소스.
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 종목의 CSV 파일 경로.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    /// CSV 텍스트를 파싱하여 정렬된 시계열을 만듭니다.
    pub fn parse(symbol: &str, text: &str) -> DataResult<PriceSeries> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut bars = Vec::new();
        for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
            let row = record?;
            let timestamp = parse_timestamp(&row.date).ok_or_else(|| {
                DataError::ParseError(format!(
                    "{}: invalid date '{}' at row {}",
                    symbol,
                    row.date,
                    line + 1
                ))
            })?;
            bars.push(PriceBar::new(
                timestamp, row.open, row.high, row.low, row.close, row.volume,
            ));
        }

        Ok(PriceSeries::from_unsorted(symbol, bars)?)
    }
}

/// `YYYY-MM-DD`(자정 UTC) 또는 RFC 3339 날짜를 파싱합니다.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[async_trait]
impl PriceSource for CsvPriceSource {
    fn name(&self) -> &str {
        "csv"
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn load(&self, symbol: &str, lookback_years: u32) -> DataResult<PriceSeries> {
        let path = self.path_for(symbol);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataError::NotFound(format!("{}", path.display())));
            }
            Err(e) => return Err(e.into()),
        };

        let series = Self::parse(symbol, &text)?.lookback(lookback_years);
        debug!(symbol, bars = series.len(), "CSV 가격 데이터 로드");
        Ok(series)
    }
}
