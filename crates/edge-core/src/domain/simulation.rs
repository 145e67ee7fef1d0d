//! 시뮬레이터 입력.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, EdgeResult};

/// 시뮬레이터가 한 번에 처리하는 (예측, 실제, 시각, ATR) 튜플.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStep {
    /// 예측 가격
    pub predicted: f64,
    /// 실제 가격
    pub actual: f64,
    /// 봉 시각
    pub timestamp: DateTime<Utc>,
    /// ATR 값
    pub atr: f64,
}

/// 검증된 시간순 시뮬레이션 입력.
///
/// 불변식:
/// - 타임스탬프 엄격 증가
/// - `atr`는 유한하고 0 이상
/// - `actual`은 유한하고 0 초과, `predicted`는 유한
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    steps: Vec<SimulationStep>,
}

impl SimulationInput {
    /// 튜플 목록을 검증하여 입력을 생성합니다.
    pub fn new(steps: Vec<SimulationStep>) -> EdgeResult<Self> {
        for (i, step) in steps.iter().enumerate() {
            if !step.predicted.is_finite() {
                return Err(EdgeError::InvalidInput(format!(
                    "predicted price at {} is not finite",
                    i
                )));
            }
            if !(step.actual.is_finite() && step.actual > 0.0) {
                return Err(EdgeError::InvalidInput(format!(
                    "actual price at {} must be positive, got {}",
                    i, step.actual
                )));
            }
            if !(step.atr.is_finite() && step.atr >= 0.0) {
                return Err(EdgeError::InvalidInput(format!(
                    "atr at {} must be finite and >= 0, got {}",
                    i, step.atr
                )));
            }
        }
        if let Some(i) = steps
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(EdgeError::InvalidInput(format!(
                "timestamps not strictly increasing at {}",
                i + 1
            )));
        }

        Ok(Self { steps })
    }

    /// 네 개의 정렬된 컬럼에서 입력을 생성합니다.
    pub fn from_columns(
        predicted: &[f64],
        actual: &[f64],
        timestamps: &[DateTime<Utc>],
        atr: &[f64],
    ) -> EdgeResult<Self> {
        let n = predicted.len();
        if actual.len() != n || timestamps.len() != n || atr.len() != n {
            return Err(EdgeError::InvalidInput(format!(
                "column length mismatch: predicted={}, actual={}, timestamps={}, atr={}",
                n,
                actual.len(),
                timestamps.len(),
                atr.len()
            )));
        }

        let steps = (0..n)
            .map(|i| SimulationStep {
                predicted: predicted[i],
                actual: actual[i],
                timestamp: timestamps[i],
                atr: atr[i],
            })
            .collect();

        Self::new(steps)
    }

    pub fn steps(&self) -> &[SimulationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(i)
    }

    #[test]
    fn test_from_columns() {
        let input = SimulationInput::from_columns(
            &[101.0, 99.0],
            &[100.0, 100.0],
            &[ts(0), ts(1)],
            &[0.01, 0.02],
        )
        .unwrap();
        assert_eq!(input.len(), 2);
        assert_eq!(input.steps()[1].predicted, 99.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = SimulationInput::from_columns(&[1.0], &[1.0, 2.0], &[ts(0)], &[0.0]);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_negative_atr() {
        let err = SimulationInput::from_columns(&[1.0], &[1.0], &[ts(0)], &[-0.1]);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_non_increasing_timestamps() {
        let err =
            SimulationInput::from_columns(&[1.0, 1.0], &[1.0, 1.0], &[ts(1), ts(1)], &[0.0, 0.0]);
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_is_allowed() {
        let input = SimulationInput::from_columns(&[], &[], &[], &[]).unwrap();
        assert!(input.is_empty());
    }
}
