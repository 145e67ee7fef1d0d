//! 학습 데이터셋과 시간순 분할.

use chrono::{DateTime, Utc};
use edge_core::PriceSeries;

use super::window::SlidingWindowBuilder;
use super::{FeatureError, FeatureResult};

/// 피처 행렬과 행별 정렬 정보.
///
/// `reference_prices[i]`, `timestamps[i]`, `atr[i]`는 행 `i`의 예측 시점에
/// 관측된 봉의 종가/시각/ATR 입니다. 예측값은 이 기준가와 비교됩니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// 피처 컬럼 이름
    pub feature_names: Vec<String>,
    /// 피처 행
    pub features: Vec<Vec<f64>>,
    /// 타깃
    pub targets: Vec<f64>,
    /// 행별 기준가
    pub reference_prices: Vec<f64>,
    /// 행별 시각
    pub timestamps: Vec<DateTime<Utc>>,
    /// 행별 ATR (워밍업 구간은 None)
    pub atr: Vec<Option<f64>>,
}

/// 학습/테스트 분할 결과.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    /// 컬럼 길이와 행 폭을 검증하여 생성합니다.
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        targets: Vec<f64>,
        reference_prices: Vec<f64>,
        timestamps: Vec<DateTime<Utc>>,
        atr: Vec<Option<f64>>,
    ) -> FeatureResult<Self> {
        let n = features.len();
        for len in [targets.len(), reference_prices.len(), timestamps.len(), atr.len()] {
            if len != n {
                return Err(FeatureError::DimensionMismatch {
                    expected: n,
                    actual: len,
                });
            }
        }
        if let Some(row) = features.iter().find(|r| r.len() != feature_names.len()) {
            return Err(FeatureError::DimensionMismatch {
                expected: feature_names.len(),
                actual: row.len(),
            });
        }

        Ok(Self {
            feature_names,
            features,
            targets,
            reference_prices,
            timestamps,
            atr,
        })
    }

    /// 종가 슬라이딩 윈도우로 데이터셋을 만듭니다.
    ///
    /// 타깃 인덱스 `i`의 행은 직전 봉 `i-1`을 기준으로 정렬됩니다.
    /// 데이터가 부족하면 빈 데이터셋입니다.
    pub fn from_window(
        series: &PriceSeries,
        atr: &[Option<f64>],
        window_size: usize,
    ) -> FeatureResult<Self> {
        if atr.len() != series.len() {
            return Err(FeatureError::DimensionMismatch {
                expected: series.len(),
                actual: atr.len(),
            });
        }

        let closes = series.closes();
        let windowed = SlidingWindowBuilder::new(window_size).build(&closes);
        if windowed.is_empty() {
            return Ok(Self {
                feature_names: windowed.columns,
                ..Default::default()
            });
        }

        let bars = series.bars();
        let reference: Vec<usize> = (window_size..closes.len()).map(|i| i - 1).collect();

        Self::new(
            windowed.columns,
            windowed.features,
            windowed.targets,
            reference.iter().map(|&i| closes[i]).collect(),
            reference.iter().map(|&i| bars[i].timestamp).collect(),
            reference.iter().map(|&i| atr[i]).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// 섞지 않고 앞쪽을 학습, 뒤쪽 `ceil(n * test_fraction)`행을 테스트로 나눕니다.
    pub fn chronological_split(&self, test_fraction: f64) -> FeatureResult<DatasetSplit> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(FeatureError::InvalidParameter(format!(
                "test_fraction must be in (0, 1), got {}",
                test_fraction
            )));
        }

        let n = self.len();
        let n_test = (n as f64 * test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(FeatureError::InsufficientRows {
                required: 2,
                provided: n,
            });
        }
        let n_train = n - n_test;

        Ok(DatasetSplit {
            train: self.slice(0, n_train),
            test: self.slice(n_train, n),
        })
    }

    fn slice(&self, start: usize, end: usize) -> Self {
        Self {
            feature_names: self.feature_names.clone(),
            features: self.features[start..end].to_vec(),
            targets: self.targets[start..end].to_vec(),
            reference_prices: self.reference_prices[start..end].to_vec(),
            timestamps: self.timestamps[start..end].to_vec(),
            atr: self.atr[start..end].to_vec(),
        }
    }
}
