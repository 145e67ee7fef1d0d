//! 주문 방향과 주문 의도.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 주문 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// 시뮬레이터가 방출하는 주문 의도.
///
/// 시뮬레이션 상태와 분리되어 있으며, 실행 어댑터가 순서대로 소비합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// 종목 코드
    pub symbol: String,
    /// 방향
    pub side: Side,
    /// 신호가 발생한 봉 시각
    pub timestamp: DateTime<Utc>,
    /// 시뮬레이션상 포지션 수량
    pub units: f64,
    /// 신호 시점 가격
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Buy.to_string(), "BUY");
        assert_eq!(Side::Sell.to_string(), "SELL");
        assert_eq!(Side::Buy.opposite(), Side::Sell);
    }
}
