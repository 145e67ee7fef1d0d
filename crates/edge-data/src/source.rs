//! 가격 데이터 소스 추상화.

use async_trait::async_trait;
use edge_core::PriceSeries;

use crate::error::DataResult;

/// 종목별 과거 가격 시계열 제공자.
///
/// 반환되는 시계열은 시간순으로 정렬되어 있고,
/// 마지막 봉 기준 `lookback_years` 년 이전 데이터는 제외됩니다.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 소스 이름 (로그용)
    fn name(&self) -> &str;

    /// 종목의 가격 시계열을 로드합니다.
    async fn load(&self, symbol: &str, lookback_years: u32) -> DataResult<PriceSeries>;
}
