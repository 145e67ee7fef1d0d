//! 종목 단위 신호-거래 파이프라인.
//!
//! 한 종목의 전체 처리를 순서대로 수행합니다:
//! ATR 계산 → 피처 생성 → 시간순 분할 → 예측기 학습 → 앙상블 → 신호 필터 → 백테스트.
//!
//! 종목 간 공유 상태가 없으므로 한 종목의 실패가 다른 종목에 영향을 주지 않습니다.
//! 이력 부족이나 매수 신호 없음은 [`PipelineError::Skipped`]로 구분되어
//! 배치 실행기가 건너뛰고 계속 진행할 수 있습니다.
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let pipeline = InstrumentPipeline::new(config.pipeline.clone(), config.simulation.clone());
//! let mut predictors = PredictorSet::from_config(&config.model, &config.pipeline)?;
//!
//! match pipeline.run(&series, &fundamentals, &mut predictors) {
//!     Ok(outcome) => aggregator.push(outcome.report),
//!     Err(PipelineError::Skipped(reason)) => aggregator.record_skip(series.symbol(), reason.to_string()),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

use thiserror::Error;
use tracing::{debug, info};

use edge_core::{
    EdgeError, FeatureMode, FundamentalRatios, OrderIntent, PipelineConfig, PriceSeries,
    SignalFilter, SimulationConfig, SimulationInput, SimulationStep,
};

use crate::backtest::{BacktestError, BacktestSimulator, MetricsReport};
use crate::features::{Dataset, FeatureError, TabularFeatureBuilder};
use crate::indicators::{AtrParams, IndicatorEngine, IndicatorError, MacdParams, RsiParams};
use crate::ml::{EnsembleOutput, MlError, PredictorSet};

/// 종목을 건너뛴 사유
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 피처/분할에 필요한 행 수 부족
    InsufficientHistory { required: usize, provided: usize },
    /// 테스트 구간에 매수 신호 없음
    NoBuySignals,
    /// 신호 행 모두 ATR 워밍업 구간
    UndefinedAtr,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InsufficientHistory { required, provided } => {
                write!(f, "이력 부족 (최소 {}행 필요, {}행 제공)", required, provided)
            }
            SkipReason::NoBuySignals => write!(f, "매수 신호 없음"),
            SkipReason::UndefinedAtr => write!(f, "ATR 미정의 구간만 존재"),
        }
    }
}

/// 파이프라인 에러
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("종목 건너뜀: {0}")]
    Skipped(SkipReason),

    #[error("지표 계산 실패: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("피처 생성 실패: {0}")]
    Feature(#[from] FeatureError),

    #[error("모델 오류: {0}")]
    Model(#[from] MlError),

    #[error("백테스트 실패: {0}")]
    Backtest(#[from] BacktestError),

    #[error(transparent)]
    Core(#[from] EdgeError),
}

impl PipelineError {
    /// 건너뛰기(정상 흐름)인지 여부
    pub fn is_skip(&self) -> bool {
        matches!(self, PipelineError::Skipped(_))
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// 종목 하나의 처리 결과
#[derive(Debug, Clone)]
pub struct InstrumentOutcome {
    pub symbol: String,
    pub report: MetricsReport,
    pub intents: Vec<OrderIntent>,
    /// 테스트 구간 앙상블 출력
    pub ensemble: EnsembleOutput,
    /// 테스트 행 수
    pub test_rows: usize,
    /// 시뮬레이터에 전달된 행 수
    pub signal_rows: usize,
}

/// 종목 단위 파이프라인
#[derive(Debug, Clone)]
pub struct InstrumentPipeline {
    config: PipelineConfig,
    simulator: BacktestSimulator,
    indicators: IndicatorEngine,
}

impl InstrumentPipeline {
    pub fn new(config: PipelineConfig, simulation: SimulationConfig) -> Self {
        Self {
            config,
            simulator: BacktestSimulator::new(simulation),
            indicators: IndicatorEngine::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 설정된 피처 모드로 데이터셋을 만듭니다.
    pub fn build_dataset(
        &self,
        series: &PriceSeries,
        fundamentals: &FundamentalRatios,
    ) -> PipelineResult<Dataset> {
        let atr = self.indicators.atr_for_series(
            series,
            AtrParams {
                period: self.config.atr_window,
            },
        )?;

        let dataset = match self.config.feature_mode {
            FeatureMode::Tabular => {
                let mut builder = TabularFeatureBuilder::new();
                if self.config.include_indicators {
                    builder = builder.with_indicators(
                        RsiParams {
                            period: self.config.rsi_window,
                        },
                        MacdParams {
                            fast_period: self.config.macd_short,
                            slow_period: self.config.macd_long,
                            signal_period: self.config.macd_signal,
                        },
                    );
                }
                builder.build(series, fundamentals, &atr)?
            }
            FeatureMode::SlidingWindow => {
                Dataset::from_window(series, &atr, self.config.window_size)?
            }
        };

        Ok(dataset)
    }

    /// 한 종목을 끝까지 처리합니다.
    pub fn run(
        &self,
        series: &PriceSeries,
        fundamentals: &FundamentalRatios,
        predictors: &mut PredictorSet,
    ) -> PipelineResult<InstrumentOutcome> {
        let symbol = series.symbol();
        let span = edge_core::instrument_span!("pipeline", symbol);
        let _guard = span.enter();

        let dataset = self.build_dataset(series, fundamentals)?;
        let split = match dataset.chronological_split(self.config.test_fraction) {
            Ok(split) => split,
            Err(FeatureError::InsufficientRows { required, provided }) => {
                return Err(PipelineError::Skipped(SkipReason::InsufficientHistory {
                    required,
                    provided,
                }));
            }
            Err(e) => return Err(e.into()),
        };

        debug!(
            train = split.train.len(),
            test = split.test.len(),
            features = dataset.n_features(),
            "데이터셋 분할"
        );

        let ensemble = predictors.fit_predict(
            &split.train.features,
            &split.train.targets,
            &split.test.features,
        )?;

        let steps = self.select_steps(&split.test, &ensemble.combined)?;
        let input = SimulationInput::new(steps)?;
        let outcome = self.simulator.run(symbol, &input)?;

        info!(
            test_rows = split.test.len(),
            signal_rows = input.len(),
            trades = outcome.report.total_trades,
            cumulative_return = outcome.report.cumulative_return,
            "종목 처리 완료"
        );

        Ok(InstrumentOutcome {
            symbol: symbol.to_string(),
            report: outcome.report,
            intents: outcome.intents,
            ensemble,
            test_rows: split.test.len(),
            signal_rows: input.len(),
        })
    }

    /// 신호 필터를 적용하고 ATR이 정의된 행만 시뮬레이션 스텝으로 만듭니다.
    fn select_steps(&self, test: &Dataset, combined: &[f64]) -> PipelineResult<Vec<SimulationStep>> {
        let candidates: Vec<usize> = (0..test.len())
            .filter(|&i| match self.config.signal_filter {
                SignalFilter::BuySignalsOnly => combined[i] > test.reference_prices[i],
                SignalFilter::AllRows => true,
            })
            .collect();

        if candidates.is_empty() {
            return Err(PipelineError::Skipped(SkipReason::NoBuySignals));
        }

        let steps: Vec<SimulationStep> = candidates
            .iter()
            .filter_map(|&i| {
                test.atr[i].map(|atr| SimulationStep {
                    predicted: combined[i],
                    actual: test.reference_prices[i],
                    timestamp: test.timestamps[i],
                    atr,
                })
            })
            .collect();

        if steps.len() < candidates.len() {
            debug!(
                dropped = candidates.len() - steps.len(),
                "ATR 미정의 행 제외"
            );
        }
        if steps.is_empty() {
            return Err(PipelineError::Skipped(SkipReason::UndefinedAtr));
        }

        Ok(steps)
    }
}
