//! 지도학습용 피처/타깃 구성.
//!
//! # 주요 기능
//!
//! - [`SlidingWindowBuilder`]: 직전 N개 가격 → 현재 가격
//! - [`TabularFeatureBuilder`]: OHLCV + 펀더멘털 (+ 선택적 RSI/MACD) → 다음 봉 종가
//! - [`Dataset`]: 행별 기준가/시각/ATR을 함께 보관하는 학습 데이터
//! - [`StandardScaler`]: 컬럼별 표준화

mod dataset;
mod scaler;
mod tabular;
mod window;

use thiserror::Error;

use crate::indicators::IndicatorError;

pub use dataset::{Dataset, DatasetSplit};
pub use scaler::StandardScaler;
pub use tabular::TabularFeatureBuilder;
pub use window::{SlidingWindowBuilder, WindowedDataset};

/// 피처 구성 오류.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// 행 수 부족
    #[error("행이 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientRows { required: usize, provided: usize },

    /// 차원 불일치
    #[error("차원 불일치: 기대 {expected}, 실제 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 지표 계산 오류
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// 피처 구성 결과 타입.
pub type FeatureResult<T> = Result<T, FeatureError>;
