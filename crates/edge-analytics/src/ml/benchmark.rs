//! 벤치마크 예측기.
//!
//! 학습 타깃의 평균/표본 표준편차를 갖는 정규분포에서 행마다 값을 뽑습니다.
//! 난수원은 외부에서 주입합니다.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use super::error::{check_rows, check_training_input, MlError, MlResult};
use super::predictor::{PricePredictor, PredictorKind};

/// 정규분포 벤치마크 예측기.
pub struct BenchmarkPredictor<R = StdRng> {
    rng: R,
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone, Copy)]
struct Fitted {
    mean: f64,
    std: f64,
    width: usize,
}

impl BenchmarkPredictor<StdRng> {
    /// 시드 고정 난수원으로 생성합니다.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send + Sync> BenchmarkPredictor<R> {
    /// 주입된 난수원으로 생성합니다.
    pub fn with_rng(rng: R) -> Self {
        Self { rng, fitted: None }
    }

    /// 학습된 (평균, 표준편차).
    pub fn distribution(&self) -> Option<(f64, f64)> {
        self.fitted.map(|f| (f.mean, f.std))
    }
}

impl<R: Rng + Send + Sync> PricePredictor for BenchmarkPredictor<R> {
    fn name(&self) -> &str {
        "benchmark"
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::Benchmark
    }

    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> MlResult<()> {
        let width = check_training_input(features, targets)?;
        let n = targets.len() as f64;
        let mean = targets.iter().sum::<f64>() / n;
        let std = if targets.len() > 1 {
            (targets.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        self.fitted = Some(Fitted { mean, std, width });
        Ok(())
    }

    fn predict(&mut self, features: &[Vec<f64>]) -> MlResult<Vec<f64>> {
        let fitted = self
            .fitted
            .ok_or_else(|| MlError::NotTrained("benchmark".to_string()))?;
        check_rows(features, fitted.width)?;

        if !(fitted.std > 0.0 && fitted.std.is_finite()) {
            return Ok(vec![fitted.mean; features.len()]);
        }
        let normal =
            Normal::new(fitted.mean, fitted.std).map_err(|e| MlError::Training(e.to_string()))?;
        Ok((0..features.len())
            .map(|_| normal.sample(&mut self.rng))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_std() {
        let mut p = BenchmarkPredictor::seeded(1);
        p.train(&[vec![0.0], vec![0.0]], &[1.0, 3.0]).unwrap();
        let (mean, std) = p.distribution().unwrap();
        assert_eq!(mean, 2.0);
        assert!((std - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_constant_targets_return_mean() {
        let mut p = BenchmarkPredictor::seeded(1);
        p.train(&[vec![0.0], vec![0.0]], &[5.0, 5.0]).unwrap();
        assert_eq!(p.predict(&vec![vec![0.0]; 3]).unwrap(), vec![5.0; 3]);
    }

    #[test]
    fn test_same_seed_same_draws() {
        let features = vec![vec![0.0]; 10];
        let targets: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let mut a = BenchmarkPredictor::seeded(42);
        let mut b = BenchmarkPredictor::seeded(42);
        a.train(&features, &targets).unwrap();
        b.train(&features, &targets).unwrap();
        assert_eq!(a.predict(&features).unwrap(), b.predict(&features).unwrap());
    }
}
