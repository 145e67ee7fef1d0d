//! 백테스트 시스템의 공통 에러 타입.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum EdgeError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 데이터 부족
    #[error("데이터 부족: {required}개 필요, {provided}개 제공")]
    InsufficientData { required: usize, provided: usize },

    /// 모델 에러
    #[error("모델 에러: {0}")]
    Model(String),

    /// 주문 실행 에러
    #[error("실행 에러: {0}")]
    Execution(String),

    /// 네트워크 에러
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 공통 Result 타입.
pub type EdgeResult<T> = Result<T, EdgeError>;

impl EdgeError {
    /// 재시도 가능한 에러인지 확인합니다.
    ///
    /// 재시도는 호출자 책임이며 엔진 내부에서는 재시도하지 않습니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EdgeError::Network(_) | EdgeError::Execution(_))
    }

    /// 종목 하나만 건너뛰면 되는 에러인지 확인합니다.
    pub fn is_instrument_local(&self) -> bool {
        matches!(
            self,
            EdgeError::Data(_) | EdgeError::InvalidInput(_) | EdgeError::InsufficientData { .. }
        )
    }
}

impl From<serde_json::Error> for EdgeError {
    fn from(err: serde_json::Error) -> Self {
        EdgeError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for EdgeError {
    fn from(err: config::ConfigError) -> Self {
        EdgeError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        assert!(EdgeError::Network("timeout".to_string()).is_retryable());
        assert!(!EdgeError::Config("bad".to_string()).is_retryable());
    }

    #[test]
    fn test_instrument_local() {
        let err = EdgeError::InsufficientData {
            required: 20,
            provided: 3,
        };
        assert!(err.is_instrument_local());
        assert!(err.to_string().contains("20"));
        assert!(!EdgeError::Internal("x".to_string()).is_instrument_local());
    }
}
