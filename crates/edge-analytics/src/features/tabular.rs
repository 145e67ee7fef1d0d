//! OHLCV + 펀더멘털 테이블형 피처.

use edge_core::{FundamentalRatios, PriceSeries};

use super::dataset::Dataset;
use super::{FeatureError, FeatureResult};
use crate::indicators::{MacdParams, MomentumCalculator, RsiParams, TrendIndicators};

const PRICE_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];
const INDICATOR_COLUMNS: [&str; 3] = ["RSI", "MACD", "MACDSignal"];

/// 행마다 당일 OHLCV와 종목 펀더멘털을 피처로, 다음 봉 종가를 타깃으로 삼습니다.
///
/// 다음 종가가 없는 마지막 봉은 제외됩니다.
#[derive(Debug, Clone, Default)]
pub struct TabularFeatureBuilder {
    indicators: Option<(RsiParams, MacdParams)>,
}

impl TabularFeatureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// RSI, MACD, MACD 시그널 컬럼을 추가합니다.
    ///
    /// 지표가 정의되지 않은 워밍업 행은 제외됩니다.
    pub fn with_indicators(mut self, rsi: RsiParams, macd: MacdParams) -> Self {
        self.indicators = Some((rsi, macd));
        self
    }

    /// 컬럼 이름.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = PRICE_COLUMNS.iter().map(|s| s.to_string()).collect();
        names.extend(FundamentalRatios::FIELD_NAMES.iter().map(|s| s.to_string()));
        if self.indicators.is_some() {
            names.extend(INDICATOR_COLUMNS.iter().map(|s| s.to_string()));
        }
        names
    }

    /// 데이터셋을 만듭니다. `atr`는 시계열과 같은 길이여야 합니다.
    pub fn build(
        &self,
        series: &PriceSeries,
        fundamentals: &FundamentalRatios,
        atr: &[Option<f64>],
    ) -> FeatureResult<Dataset> {
        if atr.len() != series.len() {
            return Err(FeatureError::DimensionMismatch {
                expected: series.len(),
                actual: atr.len(),
            });
        }

        let closes = series.closes();
        let indicator_columns = match self.indicators {
            Some((rsi_params, macd_params)) => {
                let rsi = MomentumCalculator::new().rsi(&closes, rsi_params)?;
                let macd = TrendIndicators::new().macd(&closes, macd_params)?;
                Some((rsi, macd.macd, macd.signal))
            }
            None => None,
        };

        let ratios = fundamentals.to_features();
        let bars = series.bars();
        let rows = bars.len().saturating_sub(1);

        let mut features = Vec::with_capacity(rows);
        let mut targets = Vec::with_capacity(rows);
        let mut reference_prices = Vec::with_capacity(rows);
        let mut timestamps = Vec::with_capacity(rows);
        let mut atr_rows = Vec::with_capacity(rows);

        for i in 0..rows {
            let bar = &bars[i];
            let mut row = vec![bar.open, bar.high, bar.low, bar.close, bar.volume];
            row.extend_from_slice(&ratios);

            if let Some((rsi, macd, signal)) = &indicator_columns {
                match (rsi[i], macd[i], signal[i]) {
                    (Some(r), Some(m), Some(s)) => row.extend_from_slice(&[r, m, s]),
                    _ => continue,
                }
            }

            features.push(row);
            targets.push(bars[i + 1].close);
            reference_prices.push(bar.close);
            timestamps.push(bar.timestamp);
            atr_rows.push(atr[i]);
        }

        Dataset::new(
            self.feature_names(),
            features,
            targets,
            reference_prices,
            timestamps,
            atr_rows,
        )
    }
}
