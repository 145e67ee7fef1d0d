//! 지표 조회 명령어.
//!
//! 한 종목의 마지막 RSI, MACD, ATR 값을 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! edge indicators --symbol AAPL
//! edge indicators --symbol MSFT --data-dir data/daily --window 21
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use edge_analytics::indicators::latest_defined;
use edge_analytics::{AtrParams, IndicatorEngine, MacdParams, RsiParams};
use edge_core::{PipelineConfig, PriceSeries};

/// 마지막 지표 값 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub symbol: String,
    /// 마지막 봉 시각
    pub as_of: DateTime<Utc>,
    pub close: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub atr: f64,
}

impl IndicatorSnapshot {
    /// 시계열의 마지막 지표 값을 계산합니다.
    ///
    /// `window`가 주어지면 RSI, ATR 기간을 재정의합니다.
    pub fn compute(
        series: &PriceSeries,
        config: &PipelineConfig,
        window: Option<usize>,
    ) -> Result<Self> {
        let last = series
            .bars()
            .last()
            .context("가격 데이터가 비어 있습니다")?;

        let engine = IndicatorEngine::new();
        let closes = series.closes();

        let rsi_params = RsiParams {
            period: window.unwrap_or(config.rsi_window),
        };
        let atr_params = AtrParams {
            period: window.unwrap_or(config.atr_window),
        };
        let macd_params = MacdParams {
            fast_period: config.macd_short,
            slow_period: config.macd_long,
            signal_period: config.macd_signal,
        };

        let rsi = engine.rsi(&closes, rsi_params)?;
        let macd = engine.macd(&closes, macd_params)?;
        let atr = engine.atr_for_series(series, atr_params)?;

        Ok(Self {
            symbol: series.symbol().to_string(),
            as_of: last.timestamp,
            close: last.close,
            rsi: latest_defined(&rsi, rsi_params.period).context("RSI")?,
            macd: latest_defined(&macd.macd, macd_params.slow_period).context("MACD")?,
            macd_signal: latest_defined(
                &macd.signal,
                macd_params.slow_period + macd_params.signal_period - 1,
            )
            .context("MACD signal")?,
            macd_histogram: latest_defined(
                &macd.histogram,
                macd_params.slow_period + macd_params.signal_period - 1,
            )
            .context("MACD histogram")?,
            atr: latest_defined(&atr, atr_params.period).context("ATR")?,
        })
    }

    /// 터미널 출력용 문자열.
    pub fn render(&self) -> String {
        format!(
            "📈 {} ({})\n\
             종가:        {:>12.4}\n\
             RSI:         {:>12.4}\n\
             MACD:        {:>12.4}\n\
             시그널:      {:>12.4}\n\
             히스토그램:  {:>12.4}\n\
             ATR:         {:>12.4}",
            self.symbol,
            self.as_of.format("%Y-%m-%d"),
            self.close,
            self.rsi,
            self.macd,
            self.macd_signal,
            self.macd_histogram,
            self.atr,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use edge_core::PriceBar;

    fn series(len: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..len)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1;
                PriceBar::new(
                    start + Duration::days(i as i64),
                    close - 0.5,
                    close + 1.0,
                    close - 1.0,
                    close,
                    1_000.0,
                )
            })
            .collect();
        PriceSeries::new("AAPL", bars).unwrap()
    }

    #[test]
    fn test_snapshot_defined_values() {
        let snapshot =
            IndicatorSnapshot::compute(&series(60), &PipelineConfig::default(), None).unwrap();
        assert_eq!(snapshot.symbol, "AAPL");
        assert!((0.0..=100.0).contains(&snapshot.rsi));
        assert!(snapshot.atr > 0.0);
        assert!((snapshot.macd - snapshot.macd_signal - snapshot.macd_histogram).abs() < 1e-9);
        assert!(snapshot.render().contains("RSI"));
    }

    #[test]
    fn test_snapshot_window_override() {
        let config = PipelineConfig::default();
        let short = IndicatorSnapshot::compute(&series(60), &config, Some(5)).unwrap();
        let long = IndicatorSnapshot::compute(&series(60), &config, None).unwrap();
        assert_ne!(short.atr, long.atr);
    }

    #[test]
    fn test_snapshot_short_history_fails() {
        let result = IndicatorSnapshot::compute(&series(10), &PipelineConfig::default(), None);
        assert!(result.is_err());
    }
}
