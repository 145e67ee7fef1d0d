//! 고정 가중 앙상블.
//!
//! `0.3·신경망 + 0.4·트리 앙상블 + 0.3·벤치마크` (가중치는 설정 가능).

use edge_core::{ModelConfig, PipelineConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::benchmark::BenchmarkPredictor;
use super::error::{MlError, MlResult};
use super::forest::{ForestConfig, RandomForestRegressor};
use super::neural::{FeedForwardConfig, FeedForwardRegressor};
use super::predictor::{PricePredictor, PredictorKind};

/// 기본 가중치 (신경망, 트리 앙상블, 벤치마크).
pub const DEFAULT_WEIGHTS: [f64; 3] = [0.3, 0.4, 0.3];

/// 세 예측 시계열의 가중 평균.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedEnsemble {
    weights: [f64; 3],
}

impl Default for WeightedEnsemble {
    fn default() -> Self {
        Self {
            weights: DEFAULT_WEIGHTS,
        }
    }
}

impl WeightedEnsemble {
    /// 가중치를 지정합니다. 음수가 없고 합이 1이어야 합니다.
    pub fn new(weights: [f64; 3]) -> MlResult<Self> {
        let sum: f64 = weights.iter().sum();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || (sum - 1.0).abs() > 1e-9 {
            return Err(MlError::Config(format!(
                "ensemble weights must be non-negative and sum to 1, got {:?}",
                weights
            )));
        }
        Ok(Self { weights })
    }

    pub fn weights(&self) -> [f64; 3] {
        self.weights
    }

    /// 행 순서가 같은 세 시계열을 결합합니다.
    pub fn combine(&self, neural: &[f64], tree: &[f64], benchmark: &[f64]) -> MlResult<Vec<f64>> {
        let n = neural.len();
        for other in [tree.len(), benchmark.len()] {
            if other != n {
                return Err(MlError::DimensionMismatch {
                    expected: n,
                    actual: other,
                });
            }
        }

        let [wa, wb, wc] = self.weights;
        Ok((0..n)
            .map(|i| wa * neural[i] + wb * tree[i] + wc * benchmark[i])
            .collect())
    }
}

/// 구성요소별 예측과 결합 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleOutput {
    pub neural: Vec<f64>,
    pub tree: Vec<f64>,
    pub benchmark: Vec<f64>,
    pub combined: Vec<f64>,
}

/// 앙상블을 구성하는 세 예측기.
pub struct PredictorSet {
    neural: Box<dyn PricePredictor>,
    tree: Box<dyn PricePredictor>,
    benchmark: Box<dyn PricePredictor>,
    ensemble: WeightedEnsemble,
}

impl PredictorSet {
    /// 세 슬롯을 채웁니다. 각 예측기의 종류가 슬롯과 일치해야 합니다.
    pub fn new(
        neural: Box<dyn PricePredictor>,
        tree: Box<dyn PricePredictor>,
        benchmark: Box<dyn PricePredictor>,
        ensemble: WeightedEnsemble,
    ) -> MlResult<Self> {
        for (predictor, expected) in [
            (&neural, PredictorKind::NeuralNet),
            (&tree, PredictorKind::TreeEnsemble),
            (&benchmark, PredictorKind::Benchmark),
        ] {
            if predictor.kind() != expected {
                return Err(MlError::Config(format!(
                    "predictor '{}' is {}, expected {}",
                    predictor.name(),
                    predictor.kind(),
                    expected
                )));
            }
        }

        Ok(Self {
            neural,
            tree,
            benchmark,
            ensemble,
        })
    }

    /// 설정에서 기본 예측기들을 만듭니다.
    pub fn from_config(model: &ModelConfig, pipeline: &PipelineConfig) -> MlResult<Self> {
        let seed = pipeline.seed;
        Self::new(
            Box::new(FeedForwardRegressor::new(FeedForwardConfig::from_model_config(
                model, seed,
            ))),
            Box::new(RandomForestRegressor::new(ForestConfig::from_model_config(
                model, seed,
            ))),
            Box::new(BenchmarkPredictor::seeded(seed)),
            WeightedEnsemble::new(pipeline.ensemble_weights)?,
        )
    }

    pub fn ensemble(&self) -> &WeightedEnsemble {
        &self.ensemble
    }

    /// 세 예측기를 학습하고 테스트 행을 예측해 결합합니다.
    pub fn fit_predict(
        &mut self,
        train_x: &[Vec<f64>],
        train_y: &[f64],
        test_x: &[Vec<f64>],
    ) -> MlResult<EnsembleOutput> {
        let mut outputs = Vec::with_capacity(3);
        for predictor in [&mut self.neural, &mut self.tree, &mut self.benchmark] {
            predictor.train(train_x, train_y)?;
            let preds = predictor.predict(test_x)?;
            if preds.len() != test_x.len() {
                return Err(MlError::DimensionMismatch {
                    expected: test_x.len(),
                    actual: preds.len(),
                });
            }
            debug!(
                predictor = predictor.name(),
                rows = preds.len(),
                "predictor finished"
            );
            outputs.push(preds);
        }

        let benchmark = outputs.pop().unwrap_or_default();
        let tree = outputs.pop().unwrap_or_default();
        let neural = outputs.pop().unwrap_or_default();
        let combined = self.ensemble.combine(&neural, &tree, &benchmark)?;

        Ok(EnsembleOutput {
            neural,
            tree,
            benchmark,
            combined,
        })
    }
}
