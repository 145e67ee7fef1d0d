//! 성과 분석 모듈
//!
//! 시뮬레이션 결과의 성과를 측정하고 내보내기 위한 도구를 제공합니다.
//!
//! # 모듈 구성
//!
//! - [`metrics`]: 성과 지표 계산 (샤프 비율, 최대 낙폭, 누적 수익률)
//! - [`summary`]: 종목별 리포트 집계 및 표/CSV/JSON 내보내기

pub mod metrics;
pub mod summary;

pub use metrics::*;
pub use summary::*;
