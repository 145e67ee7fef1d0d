//! 주문 의도 실행.
//!
//! 이 crate는 다음을 제공합니다:
//! - 브로커 연결을 추상화한 주문 게이트웨이 트레이트
//! - 시뮬레이터의 주문 의도를 분할/복제하여 제출하는 실행 어댑터
//! - 메모리 기반 모의 게이트웨이 (dry-run, 테스트)
//!
//! # 예제
//!
//! ```rust,ignore
//! use edge_execution::{ExecutionAdapter, PaperGateway};
//!
//! let gateway = Arc::new(PaperGateway::new());
//! let adapter = ExecutionAdapter::new(gateway, config.execution.clone())?;
//! let report = adapter.execute(&outcome.intents).await;
//! ```

pub mod executor;
pub mod paper;

// 주요 타입 재내보내기
pub use executor::{
    ExecutionAdapter, ExecutionError, ExecutionReport, ExecutionResult, IntentOutcome,
    OrderGateway, OrderRequest, PlacedOrder,
};
pub use paper::PaperGateway;
