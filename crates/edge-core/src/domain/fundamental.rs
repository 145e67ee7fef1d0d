//! 펀더멘털 비율.

use serde::{Deserialize, Serialize};

/// 종목별 펀더멘털 비율.
///
/// 조회 실패 시 모든 필드는 0.0 입니다.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FundamentalRatios {
    /// 주가수익비율
    pub pe: f64,
    /// 주당 장부가치
    pub book_value: f64,
    /// 최근 12개월 매출
    pub revenue: f64,
    /// 주가순자산비율
    pub price_to_book: f64,
    /// 순이익률
    pub net_margin: f64,
    /// 총자산이익률
    pub roa: f64,
    /// 주당순이익
    pub eps: f64,
    /// 배당수익률
    pub dividend_yield: f64,
}

impl FundamentalRatios {
    /// 피처 컬럼 이름 (`to_features` 순서와 동일).
    pub const FIELD_NAMES: [&'static str; 8] = [
        "PE",
        "BookValue",
        "Revenue",
        "PriceToBook",
        "NetMargin",
        "ROA",
        "EPS",
        "DividendYield",
    ];

    /// 고정 순서의 피처 벡터로 변환합니다.
    pub fn to_features(&self) -> [f64; 8] {
        [
            self.pe,
            self.book_value,
            self.revenue,
            self.price_to_book,
            self.net_margin,
            self.roa,
            self.eps,
            self.dividend_yield,
        ]
    }

    /// 모든 값이 0인지 확인합니다.
    pub fn is_zero(&self) -> bool {
        self.to_features().iter().all(|v| *v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero() {
        let ratios = FundamentalRatios::default();
        assert!(ratios.is_zero());
        assert_eq!(ratios.to_features().len(), FundamentalRatios::FIELD_NAMES.len());
    }

    #[test]
    fn test_feature_order() {
        let ratios = FundamentalRatios {
            pe: 1.0,
            dividend_yield: 8.0,
            ..Default::default()
        };
        let features = ratios.to_features();
        assert_eq!(features[0], 1.0);
        assert_eq!(features[7], 8.0);
        assert!(!ratios.is_zero());
    }
}
