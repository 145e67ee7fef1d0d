//! 가격 시계열 타입.
//!
//! - `PriceBar` - 일봉 OHLCV
//! - `PriceSeries` - 종목별 시간순 봉 목록 (타임스탬프 엄격 증가)

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, EdgeResult};

/// OHLCV 봉.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 봉 시각
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: f64,
    /// 고가
    pub high: f64,
    /// 저가
    pub low: f64,
    /// 종가
    pub close: f64,
    /// 거래량
    pub volume: f64,
}

impl PriceBar {
    /// 새 봉을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 고가=저가=시가=종가인 봉을 생성합니다.
    pub fn flat(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self::new(timestamp, price, price, price, price, 0.0)
    }

    fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// 종목 하나의 시간순 가격 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 정렬된 봉 목록으로 시계열을 생성합니다.
    ///
    /// 타임스탬프가 엄격히 증가하지 않거나 값이 유한하지 않으면 에러입니다.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> EdgeResult<Self> {
        let symbol = symbol.into();

        if let Some(bad) = bars.iter().position(|b| !b.is_finite()) {
            return Err(EdgeError::InvalidInput(format!(
                "{}: non-finite value in bar {}",
                symbol, bad
            )));
        }
        if let Some(i) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(EdgeError::InvalidInput(format!(
                "{}: timestamps not strictly increasing at {} ({} -> {})",
                symbol,
                i + 1,
                bars[i].timestamp,
                bars[i + 1].timestamp
            )));
        }

        Ok(Self { symbol, bars })
    }

    /// 정렬되지 않은 봉 목록을 시간순으로 정렬한 뒤 생성합니다.
    ///
    /// 중복 타임스탬프는 여전히 에러입니다.
    pub fn from_unsorted(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> EdgeResult<Self> {
        bars.sort_by_key(|b| b.timestamp);
        Self::new(symbol, bars)
    }

    /// 종목 코드.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 봉 목록.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 고가 목록.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// 저가 목록.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// 타임스탬프 목록.
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// 마지막 봉 시각.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.bars.last().map(|b| b.timestamp)
    }

    /// 마지막 봉 시각에서 `years`년 이전 이후의 봉만 남깁니다.
    ///
    /// 2월 29일 기준일은 해당 월 말일로 맞춰집니다.
    pub fn lookback(self, years: u32) -> Self {
        let Some(latest) = self.last_timestamp() else {
            return self;
        };
        let Some(cutoff) = latest.checked_sub_months(Months::new(years.saturating_mul(12))) else {
            return self;
        };

        let bars = self
            .bars
            .into_iter()
            .filter(|b| b.timestamp >= cutoff)
            .collect();

        Self {
            symbol: self.symbol,
            bars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_timestamps() {
        let bars = vec![
            PriceBar::flat(day(2024, 1, 2), 10.0),
            PriceBar::flat(day(2024, 1, 2), 11.0),
        ];
        assert!(PriceSeries::new("AAPL", bars.clone()).is_err());
        assert!(PriceSeries::from_unsorted("AAPL", bars).is_err());
    }

    #[test]
    fn test_from_unsorted_sorts() {
        let bars = vec![
            PriceBar::flat(day(2024, 1, 3), 11.0),
            PriceBar::flat(day(2024, 1, 2), 10.0),
        ];
        let series = PriceSeries::from_unsorted("AAPL", bars).unwrap();
        assert_eq!(series.closes(), vec![10.0, 11.0]);
    }

    #[test]
    fn test_rejects_nan() {
        let bars = vec![PriceBar::flat(day(2024, 1, 2), f64::NAN)];
        assert!(PriceSeries::new("AAPL", bars).is_err());
    }

    #[test]
    fn test_lookback_cutoff() {
        let bars = vec![
            PriceBar::flat(day(2010, 6, 1), 1.0),
            PriceBar::flat(day(2014, 6, 1), 2.0),
            PriceBar::flat(day(2015, 6, 1), 3.0),
            PriceBar::flat(day(2024, 6, 1), 4.0),
        ];
        let series = PriceSeries::new("MSFT", bars).unwrap().lookback(10);
        // 2014-06-01 은 경계값이므로 포함
        assert_eq!(series.closes(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_lookback_leap_day() {
        let bars = vec![
            PriceBar::flat(day(2023, 2, 27), 1.0),
            PriceBar::flat(day(2023, 2, 28), 2.0),
            PriceBar::flat(day(2024, 2, 29), 3.0),
        ];
        let series = PriceSeries::new("MSFT", bars).unwrap().lookback(1);
        assert_eq!(series.closes(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_lookback_empty() {
        let series = PriceSeries::new("X", vec![]).unwrap().lookback(5);
        assert!(series.is_empty());
    }
}
