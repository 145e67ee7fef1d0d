//! 시뮬레이션 거래 기록.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order::Side;

/// 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExitReason {
    /// 청산 아님 (매수 기록)
    #[default]
    None,
    /// 손절
    StopLoss,
    /// 목표가 도달
    Target,
    /// 보유 기간 만료
    HoldingPeriod,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExitReason::None => "",
            ExitReason::StopLoss => "Stop Loss",
            ExitReason::Target => "Target",
            ExitReason::HoldingPeriod => "Holding Period",
        };
        f.write_str(s)
    }
}

/// 불변 거래 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// 거래 시각
    pub date: DateTime<Utc>,
    /// 방향
    pub side: Side,
    /// 진입가 (매도 기록에서는 해당 포지션의 진입가)
    pub entry_price: f64,
    /// 청산가 (매도 기록에만 존재)
    pub exit_price: Option<f64>,
    /// 거래 직후 평가금액
    pub portfolio_value_after: f64,
    /// 청산 사유
    pub exit_reason: ExitReason,
}

impl Trade {
    /// 매도 기록의 수익률을 반환합니다.
    pub fn return_pct(&self) -> Option<f64> {
        match (self.side, self.exit_price) {
            (Side::Sell, Some(exit)) if self.entry_price > 0.0 => {
                Some((exit - self.entry_price) / self.entry_price)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_return_pct() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let sell = Trade {
            date,
            side: Side::Sell,
            entry_price: 100.0,
            exit_price: Some(110.0),
            portfolio_value_after: 110_000.0,
            exit_reason: ExitReason::Target,
        };
        assert!((sell.return_pct().unwrap() - 0.1).abs() < 1e-12);

        let buy = Trade {
            side: Side::Buy,
            exit_price: None,
            exit_reason: ExitReason::None,
            ..sell
        };
        assert!(buy.return_pct().is_none());
        assert_eq!(ExitReason::HoldingPeriod.to_string(), "Holding Period");
    }
}
