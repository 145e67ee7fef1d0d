//! 백테스트 도메인 모델.

mod fundamental;
mod market_data;
mod order;
mod simulation;
mod trade;

pub use fundamental::*;
pub use market_data::*;
pub use order::*;
pub use simulation::*;
pub use trade::*;
