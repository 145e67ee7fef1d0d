//! 가격 예측 모델과 가중 앙상블.
//!
//! ```text
//!   train rows ─┬─► FeedForwardRegressor (표준화 입력) ──┐ 0.3
//!               ├─► RandomForestRegressor (원본 입력)  ──┤ 0.4 ─► combined
//!               └─► BenchmarkPredictor (N(μ, σ) 추출)  ──┘ 0.3
//! ```
//!
//! 세 예측기 모두 [`PricePredictor`]를 구현하며, 테스트에서는
//! [`FnPredictor`]/[`ConstantPredictor`] 같은 결정적 스텁을 주입합니다.

pub mod benchmark;
pub mod ensemble;
pub mod error;
pub mod forest;
pub mod neural;
pub mod predictor;

pub use benchmark::BenchmarkPredictor;
pub use ensemble::{EnsembleOutput, PredictorSet, WeightedEnsemble, DEFAULT_WEIGHTS};
pub use error::{MlError, MlResult};
pub use forest::{ForestConfig, RandomForestRegressor, RegressionTree};
pub use neural::{FeedForwardConfig, FeedForwardRegressor};
pub use predictor::{ConstantPredictor, FnPredictor, PricePredictor, PredictorKind};
