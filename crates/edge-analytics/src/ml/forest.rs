//! 회귀 트리와 랜덤 포레스트.
//!
//! 분산 감소(SSE 최소화) 기준 CART 트리를 부트스트랩 표본으로 학습하고
//! 트리 예측의 평균을 반환합니다. 피처는 스케일링 없이 그대로 사용합니다.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use edge_core::ModelConfig;

use super::error::{check_rows, check_training_input, MlError, MlResult};
use super::predictor::{PricePredictor, PredictorKind};

/// 포레스트 하이퍼파라미터.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// 분할마다 고려할 피처 수 (None이면 전체)
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::from_model_config(&ModelConfig::default(), 42)
    }
}

impl ForestConfig {
    /// 공통 모델 설정에서 생성합니다.
    pub fn from_model_config(config: &ModelConfig, seed: u64) -> Self {
        Self {
            n_trees: config.forest_trees,
            max_depth: config.forest_max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: config.max_features,
            bootstrap: config.bootstrap,
            seed,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// 단일 회귀 트리.
#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    config: &'a ForestConfig,
    n_candidates: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

impl TreeBuilder<'_> {
    fn build(&self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> Node {
        let n = indices.len();
        let mean = indices.iter().map(|&i| self.targets[i]).sum::<f64>() / n as f64;

        if depth >= self.config.max_depth || n < self.config.min_samples_split {
            return Node::Leaf(mean);
        }
        let parent_sse: f64 = indices
            .iter()
            .map(|&i| (self.targets[i] - mean).powi(2))
            .sum();
        if parent_sse <= 1e-12 {
            return Node::Leaf(mean);
        }

        let Some(best) = self.find_best_split(indices, rng) else {
            return Node::Leaf(mean);
        };
        if best.sse >= parent_sse - 1e-12 {
            return Node::Leaf(mean);
        }

        let split_at = partition(indices, |i| self.features[i][best.feature] <= best.threshold);
        let (left_idx, right_idx) = indices.split_at_mut(split_at);
        let left = self.build(left_idx, depth + 1, rng);
        let right = self.build(right_idx, depth + 1, rng);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// 정렬 후 누적합으로 각 피처의 최적 임계값을 찾습니다.
    fn find_best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<BestSplit> {
        let n_features = self.features[indices[0]].len();
        let mut candidates: Vec<usize> = (0..n_features).collect();
        if self.n_candidates < n_features {
            candidates.shuffle(rng);
            candidates.truncate(self.n_candidates);
        }

        let min_leaf = self.config.min_samples_leaf;
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| self.targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.targets[i].powi(2)).sum();

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();

        for feature in candidates {
            sorted.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..n - 1 {
                let y = self.targets[sorted[k]];
                left_sum += y;
                left_sq += y * y;

                let x_here = self.features[sorted[k]][feature];
                let x_next = self.features[sorted[k + 1]][feature];
                let n_left = k + 1;
                let n_right = n - n_left;
                if x_here == x_next || n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);

                if best.as_ref().map_or(true, |b| sse < b.sse) {
                    best = Some(BestSplit {
                        feature,
                        threshold: (x_here + x_next) / 2.0,
                        sse,
                    });
                }
            }
        }

        best
    }
}

/// `pred`가 참인 원소를 앞으로 모으고 그 개수를 반환합니다.
fn partition(indices: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut next = 0;
    for k in 0..indices.len() {
        if pred(indices[k]) {
            indices.swap(next, k);
            next += 1;
        }
    }
    next
}

impl RegressionTree {
    fn predict_one(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// 트리 깊이.
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf(_) => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }
}

/// 랜덤 포레스트 회귀.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    trees: Vec<RegressionTree>,
    width: usize,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            width: 0,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl PricePredictor for RandomForestRegressor {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::TreeEnsemble
    }

    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> MlResult<()> {
        if self.config.n_trees == 0 || self.config.max_depth == 0 {
            return Err(MlError::Config("n_trees and max_depth must be positive".to_string()));
        }
        if self.config.min_samples_split < 2 || self.config.min_samples_leaf == 0 {
            return Err(MlError::Config(
                "min_samples_split must be >= 2 and min_samples_leaf >= 1".to_string(),
            ));
        }
        let width = check_training_input(features, targets)?;
        let n = features.len();
        let n_candidates = self.config.max_features.unwrap_or(width).clamp(1, width.max(1));

        let builder = TreeBuilder {
            features,
            targets,
            config: &self.config,
            n_candidates,
        };

        let trees = (0..self.config.n_trees)
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(t as u64));
                let mut indices: Vec<usize> = if self.config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree {
                    root: builder.build(&mut indices, 0, &mut rng),
                }
            })
            .collect();

        self.trees = trees;
        self.width = width;
        debug!(rows = n, trees = self.trees.len(), "random forest trained");
        Ok(())
    }

    fn predict(&mut self, features: &[Vec<f64>]) -> MlResult<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(MlError::NotTrained(self.name().to_string()));
        }
        check_rows(features, self.width)?;

        let count = self.trees.len() as f64;
        Ok(features
            .iter()
            .map(|row| self.trees.iter().map(|t| t.predict_one(row)).sum::<f64>() / count)
            .collect())
    }
}
