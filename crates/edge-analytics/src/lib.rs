//! 신호 분석 및 백테스팅 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (RSI, MACD, ATR)
//! - 피처 생성 (슬라이딩 윈도우, OHLCV + 펀더멘털 테이블)
//! - 가격 예측기와 가중 앙상블
//! - Flat/Long 백테스트 시뮬레이터
//! - 성과 지표 계산 및 리포트 집계
//! - 종목 단위 파이프라인
//!
//! # Re-exports
//!
//! - [`backtest`]: 시뮬레이터 (BacktestSimulator, MetricsReport)
//! - [`performance`]: 성과 지표 및 집계 (MetricsAggregator, SummaryRow)
//! - [`ml`]: 예측기 (PricePredictor, PredictorSet, WeightedEnsemble)

pub mod backtest;
pub mod features;
pub mod indicators;
pub mod ml;
pub mod performance;
pub mod pipeline;

// Backtest 모듈 re-exports
pub use backtest::{
    BacktestError, BacktestOutcome, BacktestResult, BacktestSimulator, MetricsReport,
    PortfolioState, StepRecord,
};

// Performance 모듈 re-exports
pub use performance::{
    MetricsAggregator, ReportError, ReportResult, SkippedInstrument, SummaryRow,
    TRADING_DAYS_PER_YEAR,
};

// Indicators 모듈 re-exports
pub use indicators::{
    AtrParams, EmaParams, IndicatorEngine, IndicatorError, IndicatorResult, MacdParams,
    MacdResult, MomentumCalculator, RsiParams, TrendIndicators, VolatilityIndicators,
};

// Features 모듈 re-exports
pub use features::{
    Dataset, DatasetSplit, FeatureError, FeatureResult, SlidingWindowBuilder, StandardScaler,
    TabularFeatureBuilder, WindowedDataset,
};

// ML 모듈 re-exports
pub use ml::{
    BenchmarkPredictor, ConstantPredictor, EnsembleOutput, FeedForwardRegressor, FnPredictor,
    MlError, MlResult, PredictorKind, PredictorSet, PricePredictor, RandomForestRegressor,
    WeightedEnsemble,
};

// Pipeline re-exports
pub use pipeline::{
    InstrumentOutcome, InstrumentPipeline, PipelineError, PipelineResult, SkipReason,
};
