//! 가격 시계열/시뮬레이션 입력 통합 테스트
//!
//! 무작위 봉 목록에 대해 정렬·검증 불변식을 확인합니다.

use chrono::{DateTime, Duration, TimeZone, Utc};
use edge_core::{PriceBar, PriceSeries, SimulationInput};
use proptest::prelude::*;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap()
}

proptest! {
    #[test]
    fn from_unsorted_yields_strictly_increasing(offsets in proptest::collection::hash_set(0i64..5000, 0..200)) {
        let bars: Vec<PriceBar> = offsets
            .iter()
            .map(|d| PriceBar::flat(base() + Duration::days(*d), 100.0 + *d as f64))
            .collect();
        let series = PriceSeries::from_unsorted("AAPL", bars).unwrap();

        prop_assert_eq!(series.len(), offsets.len());
        for w in series.bars().windows(2) {
            prop_assert!(w[0].timestamp < w[1].timestamp);
        }
    }

    #[test]
    fn lookback_keeps_suffix(n in 1usize..400, years in 1u32..5) {
        let bars: Vec<PriceBar> = (0..n)
            .map(|i| PriceBar::flat(base() + Duration::days(i as i64 * 7), 50.0))
            .collect();
        let series = PriceSeries::new("MSFT", bars).unwrap();
        let last = series.last_timestamp().unwrap();
        let trimmed = series.clone().lookback(years);

        prop_assert!(!trimmed.is_empty());
        prop_assert_eq!(trimmed.last_timestamp(), Some(last));
        // 잘린 결과는 원본의 접미사
        let offset = series.len() - trimmed.len();
        prop_assert_eq!(&series.bars()[offset..], trimmed.bars());
    }
}

#[test]
fn simulation_input_from_series_columns() {
    let bars: Vec<PriceBar> = (0..5)
        .map(|i| PriceBar::flat(base() + Duration::days(i), 10.0 + i as f64))
        .collect();
    let series = PriceSeries::new("KO", bars).unwrap();
    let closes = series.closes();
    let predicted: Vec<f64> = closes.iter().map(|c| c + 1.0).collect();
    let atr = vec![0.0; closes.len()];

    let input =
        SimulationInput::from_columns(&predicted, &closes, &series.timestamps(), &atr).unwrap();
    assert_eq!(input.len(), 5);
    assert!(input.steps().iter().all(|s| s.predicted > s.actual));
}
