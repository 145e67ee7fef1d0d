//! 백테스팅 모듈
//!
//! 예측 신호 시퀀스를 재생하여 단일 종목 롱 전략의 성과를 시뮬레이션합니다.
//!
//! # 주요 구성요소
//!
//! - [`BacktestSimulator`]: Flat/Long 상태 기계 기반 시뮬레이터
//! - [`MetricsReport`]: 종목별 성과 리포트 (누적 수익률, MDD, 샤프, 적중률)
//! - [`BacktestOutcome`]: 리포트와 주문 의도(`OrderIntent`) 시퀀스

pub mod engine;

pub use engine::{
    BacktestError, BacktestOutcome, BacktestResult, BacktestSimulator, MetricsReport,
    PortfolioState, StepRecord,
};
