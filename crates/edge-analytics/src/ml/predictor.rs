//! 가격 예측기 인터페이스.
//!
//! 앙상블의 세 구성요소(신경망, 트리 앙상블, 벤치마크)는 모두 이 trait을 구현하며
//! 테스트에서는 결정적 스텁으로 교체할 수 있습니다.

use serde::{Deserialize, Serialize};

use super::error::{check_rows, check_training_input, MlError, MlResult};

/// 예측기 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictorKind {
    /// 피드포워드 신경망
    NeuralNet,
    /// 트리 앙상블
    TreeEnsemble,
    /// 벤치마크/플레이스홀더
    Benchmark,
}

impl std::fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredictorKind::NeuralNet => write!(f, "neural_net"),
            PredictorKind::TreeEnsemble => write!(f, "tree_ensemble"),
            PredictorKind::Benchmark => write!(f, "benchmark"),
        }
    }
}

/// 회귀 예측기.
///
/// `predict`는 입력 행마다 하나의 값을 같은 순서로 반환해야 합니다.
pub trait PricePredictor: Send + Sync {
    /// 로깅/식별용 이름.
    fn name(&self) -> &str;

    /// 예측기 종류.
    fn kind(&self) -> PredictorKind;

    /// 학습.
    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> MlResult<()>;

    /// 추론.
    fn predict(&mut self, features: &[Vec<f64>]) -> MlResult<Vec<f64>>;
}

/// 행마다 클로저 결과를 반환하는 결정적 예측기.
///
/// 학습은 입력 검증만 수행합니다.
pub struct FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    name: String,
    kind: PredictorKind,
    f: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, kind: PredictorKind, f: F) -> Self {
        Self {
            name: name.into(),
            kind,
            f,
        }
    }
}

impl<F> PricePredictor for FnPredictor<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> PredictorKind {
        self.kind
    }

    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> MlResult<()> {
        check_training_input(features, targets).map(|_| ())
    }

    fn predict(&mut self, features: &[Vec<f64>]) -> MlResult<Vec<f64>> {
        Ok(features.iter().map(|row| (self.f)(row)).collect())
    }
}

/// 항상 같은 값을 반환하는 예측기.
#[derive(Debug, Clone)]
pub struct ConstantPredictor {
    kind: PredictorKind,
    value: f64,
    width: Option<usize>,
}

impl ConstantPredictor {
    pub fn new(kind: PredictorKind, value: f64) -> Self {
        Self {
            kind,
            value,
            width: None,
        }
    }
}

impl PricePredictor for ConstantPredictor {
    fn name(&self) -> &str {
        "constant"
    }

    fn kind(&self) -> PredictorKind {
        self.kind
    }

    fn train(&mut self, features: &[Vec<f64>], targets: &[f64]) -> MlResult<()> {
        self.width = Some(check_training_input(features, targets)?);
        Ok(())
    }

    fn predict(&mut self, features: &[Vec<f64>]) -> MlResult<Vec<f64>> {
        let width = self
            .width
            .ok_or_else(|| MlError::NotTrained(self.name().to_string()))?;
        check_rows(features, width)?;
        Ok(vec![self.value; features.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_predictor() {
        let mut p = FnPredictor::new("last", PredictorKind::NeuralNet, |row: &[f64]| row[0] * 2.0);
        p.train(&[vec![1.0]], &[2.0]).unwrap();
        assert_eq!(p.predict(&[vec![1.0], vec![3.0]]).unwrap(), vec![2.0, 6.0]);
        assert_eq!(p.kind(), PredictorKind::NeuralNet);
    }

    #[test]
    fn test_constant_requires_training() {
        let mut p = ConstantPredictor::new(PredictorKind::Benchmark, 7.0);
        assert!(matches!(p.predict(&[vec![1.0]]), Err(MlError::NotTrained(_))));

        p.train(&[vec![1.0, 2.0]], &[1.0]).unwrap();
        assert_eq!(p.predict(&[vec![0.0, 0.0]]).unwrap(), vec![7.0]);
        assert!(p.predict(&[vec![0.0]]).is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PredictorKind::TreeEnsemble.to_string(), "tree_ensemble");
    }
}
