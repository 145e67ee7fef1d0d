//! 슬라이딩 윈도우 빌더.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// 슬라이딩 윈도우 결과.
///
/// 행 `k`는 원본 인덱스 `window_size + k`에 대응합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowedDataset {
    /// 컬럼 이름 (`price_t-N` … `price_t-1`)
    pub columns: Vec<String>,
    /// 피처 행 (오래된 가격부터)
    pub features: Vec<Vec<f64>>,
    /// 타깃 가격
    pub targets: Vec<f64>,
}

impl WindowedDataset {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// 가격 시계열을 (직전 N개 가격, 현재 가격) 쌍으로 변환합니다.
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindowBuilder {
    window_size: usize,
}

impl SlidingWindowBuilder {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// 윈도우 데이터셋을 만듭니다.
    ///
    /// 길이가 `window_size` 이하이거나 `window_size`가 0이면 빈 결과를 반환합니다.
    pub fn build(&self, prices: &[f64]) -> WindowedDataset {
        let w = self.window_size;
        if w == 0 || prices.len() <= w {
            debug!(
                window_size = w,
                provided = prices.len(),
                "Not enough data for sliding window"
            );
            return WindowedDataset::default();
        }

        let columns = (1..=w).rev().map(|j| format!("price_t-{}", j)).collect();
        let (features, targets) = (w..prices.len())
            .map(|i| (prices[i - w..i].to_vec(), prices[i]))
            .unzip();

        WindowedDataset {
            columns,
            features,
            targets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_rows() {
        let ds = SlidingWindowBuilder::new(2).build(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(ds.columns, vec!["price_t-2", "price_t-1"]);
        assert_eq!(ds.features, vec![vec![1.0, 2.0], vec![2.0, 3.0]]);
        assert_eq!(ds.targets, vec![3.0, 4.0]);
    }

    #[test]
    fn test_short_input_is_empty_not_error() {
        let builder = SlidingWindowBuilder::new(3);
        assert!(builder.build(&[1.0, 2.0, 3.0]).is_empty());
        assert!(builder.build(&[]).is_empty());
        assert_eq!(builder.build(&[1.0, 2.0, 3.0, 4.0]).len(), 1);
    }
}
