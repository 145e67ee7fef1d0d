//! 모멘텀 지표 (Momentum Indicators).
//!
//! - RSI (Relative Strength Index)

use serde::{Deserialize, Serialize};

use super::{ensure_period, rolling_mean, IndicatorResult};

/// 손실 평균이 0이고 이득도 없을 때(가격 변화 없음)의 RSI 값.
pub const FLAT_RSI: f64 = 50.0;

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    pub fn new() -> Self {
        Self
    }

    /// RSI 계산.
    ///
    /// 가격 변화량의 이득/손실을 `period` 창에서 단순 평균합니다.
    /// 첫 변화량은 0으로 취급하므로 첫 유효값은 인덱스 `period - 1`입니다.
    ///
    /// 손실 평균이 0이면 이득 평균이 양수일 때 100, 둘 다 0이면 [`FLAT_RSI`].
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        ensure_period("RSI", params.period)?;

        let mut gains = Vec::with_capacity(prices.len());
        let mut losses = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            let delta = if i == 0 { 0.0 } else { prices[i] - prices[i - 1] };
            gains.push(delta.max(0.0));
            losses.push((-delta).max(0.0));
        }

        let avg_gain = rolling_mean(&gains, params.period);
        let avg_loss = rolling_mean(&losses, params.period);

        let result = avg_gain
            .iter()
            .zip(avg_loss.iter())
            .map(|(gain, loss)| match (gain, loss) {
                (Some(g), Some(l)) => Some(rsi_value(*g, *l)),
                _ => None,
            })
            .collect();

        Ok(result)
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { FLAT_RSI };
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prices() -> Vec<f64> {
        vec![
            100.0, 102.0, 101.0, 103.0, 105.0, 104.0, 106.0, 108.0, 107.0, 109.0, 111.0, 110.0,
            112.0, 114.0, 113.0, 115.0,
        ]
    }

    #[test]
    fn test_rsi_range_and_warmup() {
        let rsi = MomentumCalculator::new()
            .rsi(&sample_prices(), RsiParams { period: 14 })
            .unwrap();

        assert_eq!(rsi.len(), 16);
        assert!(rsi[..13].iter().all(|v| v.is_none()));
        for value in rsi.iter().flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn test_rsi_all_gains_saturates() {
        let prices: Vec<f64> = (0..30).map(|i| 10.0 + i as f64).collect();
        let rsi = MomentumCalculator::new()
            .rsi(&prices, RsiParams { period: 14 })
            .unwrap();

        for value in rsi.iter().skip(13) {
            assert_eq!(*value, Some(100.0));
        }
    }

    #[test]
    fn test_rsi_flat_prices() {
        let rsi = MomentumCalculator::new()
            .rsi(&[5.0; 10], RsiParams { period: 3 })
            .unwrap();
        assert_eq!(rsi[2], Some(FLAT_RSI));
    }

    #[test]
    fn test_rsi_known_value() {
        // 변화량: 0, +2, -1, +1 → 창 3: 이득 (2+0+1)/3, 손실 1/3
        let rsi = MomentumCalculator::new()
            .rsi(&[10.0, 12.0, 11.0, 12.0], RsiParams { period: 3 })
            .unwrap();
        let expected = 100.0 - 100.0 / (1.0 + 3.0);
        assert!((rsi[3].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_zero_period() {
        assert!(MomentumCalculator::new()
            .rsi(&sample_prices(), RsiParams { period: 0 })
            .is_err());
    }
}
