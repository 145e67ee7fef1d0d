//! ML 모듈 에러 타입.

use thiserror::Error;

/// 예측기 학습/추론에서 발생할 수 있는 에러.
#[derive(Debug, Error)]
pub enum MlError {
    /// 학습 전에 추론을 호출함
    #[error("Model not trained: {0}")]
    NotTrained(String),

    /// 유효하지 않은 입력 데이터
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 행/열 수 불일치
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// 학습 데이터 부족
    #[error("Insufficient data: need {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// 학습 중 수치 오류
    #[error("Training error: {0}")]
    Training(String),

    /// 잘못된 하이퍼파라미터
    #[error("Config error: {0}")]
    Config(String),
}

/// ML 작업을 위한 Result 타입.
pub type MlResult<T> = Result<T, MlError>;

impl MlError {
    /// 다른 데이터로 재시도하면 복구 가능한 에러인지 확인.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MlError::InsufficientData { .. } | MlError::InvalidInput(_)
        )
    }
}

/// 학습 입력을 검증합니다. 행 폭을 반환합니다.
pub(crate) fn check_training_input(features: &[Vec<f64>], targets: &[f64]) -> MlResult<usize> {
    if features.is_empty() {
        return Err(MlError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if features.len() != targets.len() {
        return Err(MlError::DimensionMismatch {
            expected: features.len(),
            actual: targets.len(),
        });
    }
    let width = features[0].len();
    check_rows(features, width)?;
    if targets.iter().any(|t| !t.is_finite()) {
        return Err(MlError::InvalidInput("non-finite target".to_string()));
    }
    Ok(width)
}

/// 모든 행이 `width` 폭이고 유한한지 확인합니다.
pub(crate) fn check_rows(features: &[Vec<f64>], width: usize) -> MlResult<()> {
    for row in features {
        if row.len() != width {
            return Err(MlError::DimensionMismatch {
                expected: width,
                actual: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(MlError::InvalidInput("non-finite feature value".to_string()));
        }
    }
    Ok(())
}
