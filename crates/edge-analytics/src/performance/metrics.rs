//! 성과 지표 계산 모듈
//!
//! 일별 포트폴리오 가치 곡선으로부터 다음 지표를 계산합니다:
//! - 누적 수익률 (Cumulative Return)
//! - 최대 낙폭 (Maximum Drawdown)
//! - 샤프 비율 (Sharpe Ratio, 무위험 이자율 0)
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use edge_analytics::performance::metrics::{sharpe_ratio, DrawdownTracker};
//!
//! let values = vec![100_000.0, 101_000.0, 99_500.0];
//! let sharpe = sharpe_ratio(&values, 252.0);
//!
//! let mut tracker = DrawdownTracker::new(100_000.0);
//! for v in &values {
//!     tracker.update(*v);
//! }
//! println!("MDD: {:.4}", tracker.max_drawdown());
//! ```

/// 연간 거래일 수 (연율화 계산에 사용)
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 표준편차가 이 값(평균 대비 상대값) 이하이면 분산이 없는 것으로 봅니다.
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// 연속한 가치 사이의 단순 수익률 `v[i+1] / v[i] - 1`.
///
/// 이전 값이 0 이하인 구간은 건너뜁니다.
pub fn daily_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect()
}

/// 누적 수익률 `(final - initial) / initial`.
pub fn cumulative_return(initial: f64, final_value: f64) -> f64 {
    if initial <= 0.0 {
        return 0.0;
    }
    (final_value - initial) / initial
}

/// 일별 가치 곡선의 연율화 샤프 비율.
///
/// # 계산 공식
///
/// Sharpe = mean(r) / std(r) × √(annualization)
///
/// 표준편차는 모집단 표준편차(자유도 0)를 사용합니다.
/// 가치가 2개 미만이거나 수익률 분산이 0이면 0을 반환합니다.
pub fn sharpe_ratio(values: &[f64], annualization: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let returns = daily_returns(values);
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if !std_dev.is_finite() || std_dev <= ZERO_VARIANCE_TOLERANCE * mean.abs().max(1.0) {
        return 0.0;
    }

    mean / std_dev * annualization.sqrt()
}

/// 고점 대비 낙폭을 순차적으로 추적합니다.
///
/// 고점은 초기 자본에서 시작하므로 첫 거래일에 손실이 나도 낙폭으로 집계됩니다.
#[derive(Debug, Clone, Copy)]
pub struct DrawdownTracker {
    peak: f64,
    max_drawdown: f64,
}

impl DrawdownTracker {
    pub fn new(initial: f64) -> Self {
        Self {
            peak: initial,
            max_drawdown: 0.0,
        }
    }

    /// 새 가치를 반영하고 현재 낙폭을 반환합니다.
    pub fn update(&mut self, value: f64) -> f64 {
        if value > self.peak {
            self.peak = value;
        }

        let drawdown = if self.peak > 0.0 {
            (self.peak - value) / self.peak
        } else {
            0.0
        };

        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        drawdown
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// 지금까지의 최대 낙폭 (0.0 ~ 1.0 비율)
    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }
}

/// 가치 곡선 전체의 최대 낙폭을 한 번에 계산합니다.
pub fn max_drawdown(initial: f64, values: &[f64]) -> f64 {
    let mut tracker = DrawdownTracker::new(initial);
    for value in values {
        tracker.update(*value);
    }
    tracker.max_drawdown()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharpe_requires_two_values() {
        assert_eq!(sharpe_ratio(&[], 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[100.0], 252.0), 0.0);
    }

    #[test]
    fn test_sharpe_zero_for_constant_curve() {
        let values = vec![100_000.0; 10];
        assert_eq!(sharpe_ratio(&values, 252.0), 0.0);
    }

    #[test]
    fn test_sharpe_zero_for_constant_growth_rate() {
        // 매일 정확히 1% 성장 → 분산 0
        let mut values = vec![100.0];
        for _ in 0..20 {
            let last = *values.last().unwrap();
            values.push(last * 1.01);
        }
        assert_eq!(sharpe_ratio(&values, 252.0), 0.0);
    }

    #[test]
    fn test_sharpe_matches_population_formula() {
        let values = vec![100.0, 110.0, 99.0, 108.9];
        // returns: 0.1, -0.1, 0.1
        let returns = [0.1, -0.1, 0.1];
        let mean: f64 = returns.iter().sum::<f64>() / 3.0;
        let var: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 3.0;
        let expected = mean / var.sqrt() * 252f64.sqrt();

        let actual = sharpe_ratio(&values, 252.0);
        assert!((actual - expected).abs() < 1e-9, "{actual} vs {expected}");
    }

    #[test]
    fn test_max_drawdown_uses_initial_as_peak() {
        // 초기 100 → 90: 10% 낙폭
        assert!((max_drawdown(100.0, &[90.0, 95.0]) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_max_drawdown_tracks_new_peak() {
        let mdd = max_drawdown(1000.0, &[1200.0, 1080.0, 1300.0]);
        assert!((mdd - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_max_drawdown_monotonic_curve_is_zero() {
        assert_eq!(max_drawdown(100.0, &[100.0, 101.0, 102.0]), 0.0);
    }

    #[test]
    fn test_cumulative_return() {
        assert!((cumulative_return(100_000.0, 98_600.0) + 0.014).abs() < 1e-12);
        assert_eq!(cumulative_return(0.0, 10.0), 0.0);
    }
}
