//! 피드포워드 회귀 신경망.
//!
//! ReLU 은닉층 + 선형 출력, 역드롭아웃, Adam, 미니배치 MSE.
//! 입력 피처와 타깃을 내부적으로 표준화하고 추론 시 역변환합니다.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use edge_core::ModelConfig;

use super::error::{check_rows, check_training_input, MlError, MlResult};
use super::predictor::{PricePredictor, PredictorKind};
use crate::features::StandardScaler;

const ADAM_BETA1: f64 = 0.9;
const ADAM_BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-7;

/// 신경망 하이퍼파라미터.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedForwardConfig {
    /// 은닉층 크기
    pub hidden_layers: Vec<usize>,
    /// 은닉층별 드롭아웃 (부족하면 0)
    pub dropout: Vec<f64>,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for FeedForwardConfig {
    fn default() -> Self {
        Self::from_model_config(&ModelConfig::default(), 42)
    }
}

impl FeedForwardConfig {
    /// 공통 모델 설정에서 생성합니다.
    pub fn from_model_config(config: &ModelConfig, seed: u64) -> Self {
        Self {
            hidden_layers: config.hidden_layers.clone(),
            dropout: config.dropout.clone(),
            epochs: config.epochs,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            seed,
        }
    }

    fn dropout_for(&self, layer: usize) -> f64 {
        self.dropout.get(layer).copied().unwrap_or(0.0)
    }

    fn validate(&self) -> MlResult<()> {
        if self.epochs == 0 || self.batch_size == 0 || !(self.learning_rate > 0.0) {
            return Err(MlError::Config(
                "epochs, batch_size and learning_rate must be positive".to_string(),
            ));
        }
        if self.hidden_layers.iter().any(|&n| n == 0) {
            return Err(MlError::Config("hidden layer of size 0".to_string()));
        }
        if self.dropout.iter().any(|p| !(0.0..1.0).contains(p)) {
            return Err(MlError::Config("dropout must be in [0, 1)".to_string()));
        }
        Ok(())
    }
}

/// 완전연결층과 Adam 모멘트.
#[derive(Debug, Clone)]
struct Dense {
    inputs: usize,
    outputs: usize,
    /// 행 우선 `[output][input]`
    weights: Vec<f64>,
    biases: Vec<f64>,
    m_w: Vec<f64>,
    v_w: Vec<f64>,
    m_b: Vec<f64>,
    v_b: Vec<f64>,
}

impl Dense {
    /// He 초기화.
    fn new(inputs: usize, outputs: usize, rng: &mut StdRng) -> MlResult<Self> {
        let std = (2.0 / inputs as f64).sqrt();
        let normal = Normal::new(0.0, std).map_err(|e| MlError::Config(e.to_string()))?;
        let weights = (0..inputs * outputs).map(|_| normal.sample(rng)).collect();

        Ok(Self {
            inputs,
            outputs,
            weights,
            biases: vec![0.0; outputs],
            m_w: vec![0.0; inputs * outputs],
            v_w: vec![0.0; inputs * outputs],
            m_b: vec![0.0; outputs],
            v_b: vec![0.0; outputs],
        })
    }

    fn affine(&self, input: &[f64]) -> Vec<f64> {
        (0..self.outputs)
            .map(|j| {
                let row = &self.weights[j * self.inputs..(j + 1) * self.inputs];
                row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + self.biases[j]
            })
            .collect()
    }

    fn adam_step(&mut self, grad_w: &[f64], grad_b: &[f64], lr: f64, t: i32) {
        let bias1 = 1.0 - ADAM_BETA1.powi(t);
        let bias2 = 1.0 - ADAM_BETA2.powi(t);

        let update = |param: &mut f64, m: &mut f64, v: &mut f64, g: f64| {
            *m = ADAM_BETA1 * *m + (1.0 - ADAM_BETA1) * g;
            *v = ADAM_BETA2 * *v + (1.0 - ADAM_BETA2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *param -= lr * m_hat / (v_hat.sqrt() + ADAM_EPSILON);
        };

        for i in 0..self.weights.len() {
            update(&mut self.weights[i], &mut self.m_w[i], &mut self.v_w[i], grad_w[i]);
        }
        for j in 0..self.biases.len() {
            update(&mut self.biases[j], &mut self.m_b[j], &mut self.v_b[j], grad_b[j]);
        }
    }
}

/// 학습된 상태.
#[derive(Debug, Clone)]
struct Trained {
    layers: Vec<Dense>,
    scaler: StandardScaler,
    target_mean: f64,
    target_scale: f64,
}

/// 피드포워드 회귀 신경망 (기본 128-64-32-1).
#[derive(Debug, Clone)]
pub struct FeedForwardRegressor {
    config: FeedForwardConfig,
    state: Option<Trained>,
}

impl FeedForwardRegressor {
    pub fn new(config: FeedForwardConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &FeedForwardConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// 순전파. `masks`가 있으면 은닉층 출력에 곱합니다.
    fn forward(
        layers: &[Dense],
        input: &[f64],
        masks: Option<&[Vec<f64>]>,
    ) -> Vec<Vec<f64>> {
        let mut activations = Vec::with_capacity(layers.len() + 1);
        activations.push(input.to_vec());

        for (l, layer) in layers.iter().enumerate() {
            let mut a = layer.affine(&activations[l]);
            if l + 1 < layers.len() {
                a.iter_mut().for_each(|v| *v = v.max(0.0));
                if let Some(mask) = masks.map(|m| &m[l]) {
                    a.iter_mut().zip(mask).for_each(|(v, k)| *v *= k);
                }
            }
            activations.push(a);
        }
        activations
    }

    fn dropout_masks(&self, layers: &[Dense], rng: &mut StdRng) -> Vec<Vec<f64>> {
        layers[..layers.len() - 1]
            .iter()
            .enumerate()
            .map(|(l, layer)| {
                let p = self.config.dropout_for(l);
                if p <= 0.0 {
                    return vec![1.0; layer.outputs];
                }
                let keep = 1.0 / (1.0 - p);
                (0..layer.outputs)
                    .map(|_| if rng.gen::<f64>() < p { 0.0 } else { keep })
                    .collect()
            })
            .collect()
    }
}

impl PricePredictor for FeedForwardRegressor {
    fn name(&self) -> &str {
        "feed_forward"
    }

    fn kind(&self) -> PredictorKind {
        PredictorKind::NeuralNet
    }

    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> MlResult<()> {
        self.config.validate()?;
        let width = check_training_input(features, targets)?;

        let (scaler, x) = StandardScaler::fit_transform(features)
            .map_err(|e| MlError::InvalidInput(e.to_string()))?;
        let n = targets.len() as f64;
        let target_mean = targets.iter().sum::<f64>() / n;
        let target_std = (targets.iter().map(|t| (t - target_mean).powi(2)).sum::<f64>() / n).sqrt();
        let target_scale = if target_std > f64::EPSILON { target_std } else { 1.0 };
        let y: Vec<f64> = targets.iter().map(|t| (t - target_mean) / target_scale).collect();

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut sizes = vec![width];
        sizes.extend(&self.config.hidden_layers);
        sizes.push(1);
        let mut layers = sizes
            .windows(2)
            .map(|w| Dense::new(w[0], w[1], &mut rng))
            .collect::<MlResult<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..x.len()).collect();
        let mut step = 0i32;

        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(self.config.batch_size) {
                let mut grad_w: Vec<Vec<f64>> = layers.iter().map(|l| vec![0.0; l.weights.len()]).collect();
                let mut grad_b: Vec<Vec<f64>> = layers.iter().map(|l| vec![0.0; l.outputs]).collect();

                for &i in batch {
                    let masks = self.dropout_masks(&layers, &mut rng);
                    let acts = Self::forward(&layers, &x[i], Some(masks.as_slice()));
                    let err = acts[layers.len()][0] - y[i];
                    epoch_loss += err * err;

                    // dL/dz, 출력층은 선형
                    let mut delta = vec![err];
                    for l in (0..layers.len()).rev() {
                        let layer = &layers[l];
                        let input = &acts[l];
                        for j in 0..layer.outputs {
                            let d = delta[j];
                            if d == 0.0 {
                                continue;
                            }
                            let row = &mut grad_w[l][j * layer.inputs..(j + 1) * layer.inputs];
                            row.iter_mut().zip(input).for_each(|(g, a)| *g += d * a);
                            grad_b[l][j] += d;
                        }
                        if l == 0 {
                            break;
                        }
                        let mut prev = vec![0.0; layer.inputs];
                        for j in 0..layer.outputs {
                            let d = delta[j];
                            if d == 0.0 {
                                continue;
                            }
                            let row = &layer.weights[j * layer.inputs..(j + 1) * layer.inputs];
                            prev.iter_mut().zip(row).for_each(|(p, w)| *p += w * d);
                        }
                        // ReLU와 드롭아웃 마스크를 통과
                        let mask = &masks[l - 1];
                        for k in 0..prev.len() {
                            prev[k] = if input[k] > 0.0 { prev[k] * mask[k] } else { 0.0 };
                        }
                        delta = prev;
                    }
                }

                let scale = 1.0 / batch.len() as f64;
                step += 1;
                for (l, layer) in layers.iter_mut().enumerate() {
                    grad_w[l].iter_mut().for_each(|g| *g *= scale);
                    grad_b[l].iter_mut().for_each(|g| *g *= scale);
                    layer.adam_step(&grad_w[l], &grad_b[l], self.config.learning_rate, step);
                }
            }

            let mse = epoch_loss / n;
            if !mse.is_finite() {
                return Err(MlError::Training(format!("loss diverged at epoch {}", epoch)));
            }
            trace!(epoch, mse, "feed-forward epoch finished");
        }

        debug!(
            rows = x.len(),
            inputs = width,
            epochs = self.config.epochs,
            "feed-forward regressor trained"
        );

        self.state = Some(Trained {
            layers,
            scaler,
            target_mean,
            target_scale,
        });
        Ok(())
    }

    fn predict(&mut self, features: &[Vec<f64>]) -> MlResult<Vec<f64>> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| MlError::NotTrained(self.name().to_string()))?;
        check_rows(features, state.scaler.means().len())?;

        features
            .iter()
            .map(|row| {
                let scaled = state
                    .scaler
                    .transform_row(row)
                    .map_err(|e| MlError::InvalidInput(e.to_string()))?;
                let acts = Self::forward(&state.layers, &scaled, None);
                let out = acts[state.layers.len()][0];
                Ok(out * state.target_scale + state.target_mean)
            })
            .collect()
    }
}
