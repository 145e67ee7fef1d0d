//! 추세 지표 (Trend Indicators).
//!
//! - EMA (조정 없는 재귀 지수 이동평균)
//! - MACD (Moving Average Convergence Divergence)

use serde::{Deserialize, Serialize};

use super::{ensure_period, IndicatorError, IndicatorResult};

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// span (평활 계수 α = 2 / (span + 1)).
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 계산 결과. 세 시계열 모두 입력과 같은 길이.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (처음 `slow - 1`개는 None)
    pub macd: Vec<Option<f64>>,
    /// 시그널 라인 (처음 `slow + signal - 2`개는 None)
    pub signal: Vec<Option<f64>>,
    /// MACD - 시그널
    pub histogram: Vec<Option<f64>>,
}

/// 추세 지표 계산기.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    pub fn new() -> Self {
        Self
    }

    /// 조정 없는 재귀 EMA.
    ///
    /// `ema[0] = p[0]`, `ema[i] = α·p[i] + (1-α)·ema[i-1]`.
    /// 첫 값으로 시드하므로 워밍업 구간이 없습니다.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<f64>> {
        ensure_period("EMA", params.period)?;

        let alpha = 2.0 / (params.period as f64 + 1.0);
        let mut result = Vec::with_capacity(prices.len());
        let mut prev: Option<f64> = None;

        for &price in prices {
            let value = match prev {
                None => price,
                Some(p) => alpha * price + (1.0 - alpha) * p,
            };
            result.push(value);
            prev = Some(value);
        }

        Ok(result)
    }

    /// MACD 계산.
    ///
    /// 재귀 자체는 첫 값부터 수행하고, 출력에서 워밍업 구간만 가립니다.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<MacdResult> {
        ensure_period("MACD signal", params.signal_period)?;
        if params.fast_period == 0 || params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD fast period ({}) must be positive and below slow period ({})",
                params.fast_period, params.slow_period
            )));
        }

        let fast = self.ema(prices, EmaParams { period: params.fast_period })?;
        let slow = self.ema(prices, EmaParams { period: params.slow_period })?;
        let raw_macd: Vec<f64> = fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect();
        let raw_signal = self.ema(&raw_macd, EmaParams { period: params.signal_period })?;

        let macd_warmup = params.slow_period - 1;
        let signal_warmup = params.slow_period + params.signal_period - 2;

        let mut macd = Vec::with_capacity(prices.len());
        let mut signal = Vec::with_capacity(prices.len());
        let mut histogram = Vec::with_capacity(prices.len());

        for i in 0..prices.len() {
            let m = (i >= macd_warmup).then_some(raw_macd[i]);
            let s = (i >= signal_warmup).then_some(raw_signal[i]);
            macd.push(m);
            signal.push(s);
            histogram.push(match (m, s) {
                (Some(m), Some(s)) => Some(m - s),
                _ => None,
            });
        }

        Ok(MacdResult {
            macd,
            signal,
            histogram,
        })
    }
}
