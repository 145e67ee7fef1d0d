//! 변동성 지표 (Volatility Indicators).
//!
//! - True Range
//! - ATR (Average True Range, 단순 롤링 평균)

use serde::{Deserialize, Serialize};

use super::{ensure_period, rolling_mean, IndicatorError, IndicatorResult};

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 봉별 실제 범위.
    ///
    /// `max(high-low, |high-prev_close|, |low-prev_close|)`,
    /// 첫 봉은 직전 종가가 없으므로 `high-low`.
    pub fn true_range(&self, high: &[f64], low: &[f64], close: &[f64]) -> IndicatorResult<Vec<f64>> {
        if high.len() != low.len() || high.len() != close.len() {
            return Err(IndicatorError::CalculationError(format!(
                "high/low/close length mismatch: {}/{}/{}",
                high.len(),
                low.len(),
                close.len()
            )));
        }

        let mut ranges = Vec::with_capacity(high.len());
        for i in 0..high.len() {
            let hl = high[i] - low[i];
            if i == 0 {
                ranges.push(hl);
                continue;
            }
            let hc = (high[i] - close[i - 1]).abs();
            let lc = (low[i] - close[i - 1]).abs();
            ranges.push(hl.max(hc).max(lc));
        }

        Ok(ranges)
    }

    /// ATR 계산 (실제 범위의 단순 롤링 평균).
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        ensure_period("ATR", params.period)?;
        let ranges = self.true_range(high, low, close)?;
        Ok(rolling_mean(&ranges, params.period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_range_first_bar() {
        let tr = VolatilityIndicators::new()
            .true_range(&[12.0, 15.0], &[10.0, 13.0], &[11.0, 14.0])
            .unwrap();
        // 첫 봉 12-10, 둘째 봉 max(2, 4, 2)
        assert_eq!(tr, vec![2.0, 4.0]);
    }

    #[test]
    fn test_atr_constant_series_is_zero() {
        let prices = vec![42.0; 20];
        let atr = VolatilityIndicators::new()
            .atr(&prices, &prices, &prices, AtrParams { period: 14 })
            .unwrap();

        assert!(atr[..13].iter().all(|v| v.is_none()));
        assert!(atr[13..].iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn test_atr_mismatched_lengths() {
        let result = VolatilityIndicators::new().atr(&[1.0, 2.0], &[1.0], &[1.0, 2.0], AtrParams::default());
        assert!(result.is_err());
    }
}
