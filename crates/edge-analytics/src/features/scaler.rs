//! 컬럼별 표준화.

use serde::{Deserialize, Serialize};

use super::{FeatureError, FeatureResult};

/// 평균 0, 분산 1로 변환하는 스케일러.
///
/// 모집단 표준편차를 사용하며, 분산이 0인 컬럼은 1로 나눕니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// 학습 행렬에서 평균/표준편차를 구합니다.
    pub fn fit(rows: &[Vec<f64>]) -> FeatureResult<Self> {
        let Some(first) = rows.first() else {
            return Err(FeatureError::InsufficientRows {
                required: 1,
                provided: 0,
            });
        };
        let width = first.len();
        let n = rows.len() as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            if row.len() != width {
                return Err(FeatureError::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0; width];
        for row in rows {
            for ((var, v), m) in variances.iter_mut().zip(row).zip(&means) {
                *var += (v - m).powi(2);
            }
        }
        let scales = variances
            .into_iter()
            .map(|var| {
                let std = (var / n).sqrt();
                if std > f64::EPSILON && std.is_finite() {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { means, scales })
    }

    /// 학습된 통계로 행렬을 변환합니다.
    pub fn transform(&self, rows: &[Vec<f64>]) -> FeatureResult<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    /// 한 행을 변환합니다.
    pub fn transform_row(&self, row: &[f64]) -> FeatureResult<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(FeatureError::DimensionMismatch {
                expected: self.means.len(),
                actual: row.len(),
            });
        }
        Ok(row
            .iter()
            .zip(&self.means)
            .zip(&self.scales)
            .map(|((v, m), s)| (v - m) / s)
            .collect())
    }

    /// 학습 후 바로 변환합니다.
    pub fn fit_transform(rows: &[Vec<f64>]) -> FeatureResult<(Self, Vec<Vec<f64>>)> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        Ok((scaler, scaled))
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_transform() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&rows).unwrap();

        assert_eq!(scaler.means(), &[2.0, 5.0]);
        assert_eq!(scaler.scales(), &[1.0, 1.0]);
        assert_eq!(scaled, vec![vec![-1.0, 0.0], vec![1.0, 0.0]]);
    }

    #[test]
    fn test_population_std() {
        let rows = vec![vec![0.0], vec![4.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.scales(), &[2.0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
        assert!(StandardScaler::fit(&[]).is_err());
    }
}
