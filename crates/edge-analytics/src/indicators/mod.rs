//! 기술적 지표 모듈.
//!
//! 가격 시계열에서 파생 시계열을 계산하는 순수 함수들을 제공합니다.
//! 모든 지표는 입력과 같은 길이의 `Vec<Option<f64>>`를 반환하며,
//! 워밍업 구간은 `None`으로 남겨 둡니다 (역방향 채움 없음).
//!
//! # 지원 지표
//!
//! - **RSI**: 단순 롤링 평균 기반 상대강도지수 (Wilder 평활 아님)
//! - **MACD**: 조정 없는 재귀 EMA 기반 MACD/시그널/히스토그램
//! - **ATR**: 실제 범위의 단순 롤링 평균
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use edge_analytics::indicators::{IndicatorEngine, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//! let rsi = engine.rsi(&closes, RsiParams { period: 14 })?;
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;

use thiserror::Error;

use edge_core::PriceSeries;

pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{EmaParams, MacdParams, MacdResult, TrendIndicators};
pub use volatility::{AtrParams, VolatilityIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// RSI 계산.
    ///
    /// 0-100 범위 값. 처음 `period - 1`개는 `None`.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        self.momentum.rsi(prices, params)
    }

    /// 조정 없는 재귀 EMA 계산.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
        self.trend.ema(prices, params)
    }

    /// MACD 라인, 시그널 라인, 히스토그램 계산.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<MacdResult> {
        self.trend.macd(prices, params)
    }

    /// 실제 범위(True Range) 계산.
    pub fn true_range(&self, high: &[f64], low: &[f64], close: &[f64]) -> IndicatorResult<Vec<f64>> {
        self.volatility.true_range(high, low, close)
    }

    /// ATR 계산.
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.volatility.atr(high, low, close, params)
    }

    /// 가격 시계열에서 직접 ATR을 계산합니다.
    pub fn atr_for_series(
        &self,
        series: &PriceSeries,
        params: AtrParams,
    ) -> IndicatorResult<Vec<Option<f64>>> {
        self.atr(&series.highs(), &series.lows(), &series.closes(), params)
    }
}

/// 마지막으로 정의된 값을 반환합니다.
///
/// 정의된 값이 없으면 `InsufficientData`.
pub fn latest_defined(values: &[Option<f64>], required: usize) -> IndicatorResult<f64> {
    values
        .iter()
        .rev()
        .find_map(|v| *v)
        .ok_or(IndicatorError::InsufficientData {
            required,
            provided: values.len(),
        })
}

/// `period` 길이 창의 단순 롤링 평균.
///
/// 처음 `period - 1`개는 `None`.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    let divisor = period as f64;
    for i in (period - 1)..values.len() {
        let sum: f64 = values[i + 1 - period..=i].iter().sum();
        result[i] = Some(sum / divisor);
    }
    result
}

pub(crate) fn ensure_period(name: &str, period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} period must be positive",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean() {
        let result = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(result, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
    }

    #[test]
    fn test_rolling_mean_short_input() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 3), vec![None, None]);
    }

    #[test]
    fn test_latest_defined() {
        assert_eq!(latest_defined(&[None, Some(1.0), Some(2.0)], 2).unwrap(), 2.0);
        assert!(matches!(
            latest_defined(&[None, None], 3),
            Err(IndicatorError::InsufficientData { required: 3, provided: 2 })
        ));
    }

    #[test]
    fn test_engine_lengths_match_input() {
        let engine = IndicatorEngine::new();
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64).sin()).collect();

        assert_eq!(engine.rsi(&prices, RsiParams::default()).unwrap().len(), 40);
        let macd = engine.macd(&prices, MacdParams::default()).unwrap();
        assert_eq!(macd.macd.len(), 40);
        assert_eq!(macd.signal.len(), 40);
        assert_eq!(
            engine
                .atr(&prices, &prices, &prices, AtrParams::default())
                .unwrap()
                .len(),
            40
        );
    }
}
