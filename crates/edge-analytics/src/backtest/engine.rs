//! 백테스트 시뮬레이터
//!
//! 예측가/실제가/ATR 시퀀스를 시간 순서대로 재생하며 Flat/Long 상태 기계를 구동합니다.
//!
//! # 주요 기능
//!
//! - 예측가 > 실제가일 때 전액 매수 (부분 체결 없음)
//! - 손절 / 목표가 / 보유 기간 만료 청산
//! - 일별 평가금액, 최대 낙폭, 샤프 비율, 적중률 계산
//! - 브로커 호출 대신 주문 의도(`OrderIntent`) 시퀀스 생성
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use edge_analytics::backtest::BacktestSimulator;
//! use edge_core::{SimulationConfig, SimulationInput};
//!
//! let simulator = BacktestSimulator::new(SimulationConfig::default());
//! let outcome = simulator.run("AAPL", &input)?;
//!
//! println!("{}", outcome.report.summary());
//! for intent in &outcome.intents {
//!     println!("{} {} @ {}", intent.side, intent.symbol, intent.price);
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use edge_core::{
    ExitReason, OrderIntent, Side, SimulationConfig, SimulationInput, SimulationStep,
    ThresholdMode, Trade,
};

use crate::performance::metrics::{cumulative_return, sharpe_ratio, DrawdownTracker};

/// 백테스트 관련 에러
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("백테스트 설정 오류: {0}")]
    ConfigError(String),

    #[error("데이터 부족: 최소 {required}개 필요, {provided}개 제공")]
    InsufficientData { required: usize, provided: usize },

    #[error("잘못된 입력: {0}")]
    InvalidInput(String),
}

/// 백테스트 결과 타입
pub type BacktestResult<T> = Result<T, BacktestError>;

/// 시뮬레이션 중 포트폴리오 상태.
///
/// Flat 상태에서는 `cash > 0, position_size == 0`,
/// Long 상태에서는 `cash == 0, position_size > 0` 입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub cash: f64,
    pub position_size: f64,
    pub entry_price: Option<f64>,
    pub holding_days: u32,
}

impl PortfolioState {
    fn new(capital: f64) -> Self {
        Self {
            cash: capital,
            position_size: 0.0,
            entry_price: None,
            holding_days: 0,
        }
    }

    /// 포지션 보유 여부
    pub fn is_long(&self) -> bool {
        self.position_size > 0.0
    }

    /// 주어진 가격 기준 평가금액
    pub fn value_at(&self, price: f64) -> f64 {
        if self.is_long() {
            self.cash + self.position_size * price
        } else {
            self.cash
        }
    }

    fn enter_long(&mut self, price: f64) -> f64 {
        let units = self.cash / price;
        self.position_size = units;
        self.cash = 0.0;
        self.entry_price = Some(price);
        self.holding_days = 0;
        units
    }

    fn exit_long(&mut self, price: f64) -> f64 {
        let units = self.position_size;
        self.cash = units * price;
        self.position_size = 0.0;
        self.entry_price = None;
        units
    }
}

/// 한 스텝 처리 후의 상태 스냅샷.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub timestamp: DateTime<Utc>,
    pub cash: f64,
    pub position_size: f64,
    pub holding_days: u32,
    pub daily_value: f64,
    pub drawdown: f64,
}

/// 종목별 성과 리포트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// 종목 심볼
    pub symbol: String,
    /// 시작 자본
    pub starting_capital: f64,
    /// 최종 평가금액
    pub final_value: f64,
    /// 누적 수익률 (비율)
    pub cumulative_return: f64,
    /// 최대 낙폭 (비율)
    pub max_drawdown: f64,
    /// 연율화 샤프 비율
    pub sharpe_ratio: f64,
    /// 적중률 = 수익 매도 / 전체 거래 기록 (매수 + 매도)
    pub hit_ratio: f64,
    /// 전체 거래 기록 수
    pub total_trades: usize,
    /// 수익으로 청산된 매도 수
    pub winning_trades: usize,
    /// 거래 로그
    pub trades: Vec<Trade>,
    /// 일자별 거래 횟수
    pub trades_per_day: BTreeMap<NaiveDate, usize>,
    /// 일별 평가금액
    pub daily_values: Vec<f64>,
}

impl MetricsReport {
    /// 청산(매도) 기록만 반환합니다.
    pub fn closed_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter().filter(|t| t.side == Side::Sell)
    }

    /// 리포트 요약을 문자열로 반환합니다.
    pub fn summary(&self) -> String {
        format!(
            r#"
╔══════════════════════════════════════════════════════════════╗
║                    백테스트 결과 리포트                        ║
╠══════════════════════════════════════════════════════════════╣
║ 종목: {:<54} ║
╠══════════════════════════════════════════════════════════════╣
║ 시작 자본:     {:>20.2}                          ║
║ 최종 평가금액: {:>20.2}                          ║
║ 누적 수익률:   {:>19.2}%                          ║
╠══════════════════════════════════════════════════════════════╣
║ 최대 낙폭:     {:>19.2}%                          ║
║ 샤프 비율:     {:>20.4}                          ║
║ 적중률:        {:>19.2}%                          ║
║ 거래 기록:     {:>20}                          ║
║ 수익 청산:     {:>20}                          ║
╚══════════════════════════════════════════════════════════════╝
"#,
            self.symbol,
            self.starting_capital,
            self.final_value,
            self.cumulative_return * 100.0,
            self.max_drawdown * 100.0,
            self.sharpe_ratio,
            self.hit_ratio * 100.0,
            self.total_trades,
            self.winning_trades,
        )
    }
}

/// 시뮬레이션 결과: 리포트 + 주문 의도 + 스텝별 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub report: MetricsReport,
    /// 시간 순서대로 정렬된 주문 의도
    pub intents: Vec<OrderIntent>,
    /// 스텝별 상태 스냅샷
    pub steps: Vec<StepRecord>,
}

/// 백테스트 시뮬레이터
///
/// 실행 간 공유 상태가 없으므로 같은 입력을 여러 번 재생해도 같은 결과를 냅니다.
#[derive(Debug, Clone)]
pub struct BacktestSimulator {
    config: SimulationConfig,
}

impl BacktestSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 시뮬레이션을 실행합니다.
    ///
    /// # Errors
    ///
    /// - 설정이 유효하지 않으면 [`BacktestError::ConfigError`]
    /// - 입력이 비어 있으면 [`BacktestError::InsufficientData`]
    pub fn run(&self, symbol: &str, input: &SimulationInput) -> BacktestResult<BacktestOutcome> {
        self.config
            .validate()
            .map_err(|e| BacktestError::ConfigError(e.to_string()))?;

        if input.is_empty() {
            return Err(BacktestError::InsufficientData {
                required: 1,
                provided: 0,
            });
        }

        let capital = self.config.starting_capital;
        let mut state = PortfolioState::new(capital);
        let mut drawdown = DrawdownTracker::new(capital);

        let mut trades = Vec::new();
        let mut intents = Vec::new();
        let mut steps = Vec::with_capacity(input.len());
        let mut daily_values = Vec::with_capacity(input.len());
        let mut trades_per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        let mut winning_trades = 0usize;

        for step in input.steps() {
            let fill = self.advance(&mut state, step);

            let daily_value = state.value_at(step.actual);
            let current_drawdown = drawdown.update(daily_value);
            daily_values.push(daily_value);

            if let Some((side, units, entry_price, reason)) = fill {
                let exit_price = match side {
                    Side::Buy => None,
                    Side::Sell => Some(step.actual),
                };
                if side == Side::Sell && daily_value > capital {
                    winning_trades += 1;
                }

                debug!(
                    symbol,
                    side = %side,
                    price = step.actual,
                    units,
                    reason = %reason,
                    value = daily_value,
                    "시뮬레이션 체결"
                );

                trades.push(Trade {
                    date: step.timestamp,
                    side,
                    entry_price,
                    exit_price,
                    portfolio_value_after: daily_value,
                    exit_reason: reason,
                });
                intents.push(OrderIntent {
                    symbol: symbol.to_string(),
                    side,
                    timestamp: step.timestamp,
                    units,
                    price: step.actual,
                });
                *trades_per_day.entry(step.timestamp.date_naive()).or_insert(0) += 1;
            }

            steps.push(StepRecord {
                timestamp: step.timestamp,
                cash: state.cash,
                position_size: state.position_size,
                holding_days: state.holding_days,
                daily_value,
                drawdown: current_drawdown,
            });
        }

        let final_value = daily_values.last().copied().unwrap_or(capital);
        let total_trades = trades.len();
        let hit_ratio = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64
        } else {
            0.0
        };

        let report = MetricsReport {
            symbol: symbol.to_string(),
            starting_capital: capital,
            final_value,
            cumulative_return: cumulative_return(capital, final_value),
            max_drawdown: drawdown.max_drawdown(),
            sharpe_ratio: sharpe_ratio(&daily_values, self.config.annualization_factor),
            hit_ratio,
            total_trades,
            winning_trades,
            trades,
            trades_per_day,
            daily_values,
        };

        info!(
            symbol,
            steps = input.len(),
            trades = report.total_trades,
            cumulative_return = report.cumulative_return,
            sharpe = report.sharpe_ratio,
            "백테스트 완료"
        );

        Ok(BacktestOutcome {
            report,
            intents,
            steps,
        })
    }

    /// 한 스텝의 상태 전이를 적용하고 체결 정보 `(방향, 수량, 진입가, 사유)`를 반환합니다.
    fn advance(
        &self,
        state: &mut PortfolioState,
        step: &SimulationStep,
    ) -> Option<(Side, f64, f64, ExitReason)> {
        match state.entry_price {
            Some(entry) if state.is_long() => {
                state.holding_days += 1;
                let reason = self.exit_reason(entry, state.holding_days, step)?;
                let units = state.exit_long(step.actual);
                Some((Side::Sell, units, entry, reason))
            }
            _ if step.predicted > step.actual => {
                let units = state.enter_long(step.actual);
                Some((Side::Buy, units, step.actual, ExitReason::None))
            }
            _ => None,
        }
    }

    fn exit_reason(&self, entry: f64, holding_days: u32, step: &SimulationStep) -> Option<ExitReason> {
        let (stop, target) = self.thresholds(entry, step.atr);

        if step.actual <= stop {
            Some(ExitReason::StopLoss)
        } else if step.actual >= target {
            Some(ExitReason::Target)
        } else if holding_days >= self.config.holding_period {
            Some(ExitReason::HoldingPeriod)
        } else {
            None
        }
    }

    /// 손절가와 목표가.
    ///
    /// `Literal` 모드는 ATR 값을 비율 배수로 그대로 곱합니다. ATR은 가격 단위이므로
    /// 가격이 큰 종목에서는 손절가가 음수가 되어 사실상 발동하지 않습니다.
    fn thresholds(&self, entry: f64, atr: f64) -> (f64, f64) {
        let stop_mult = self.config.atr_stop_mult;
        let target_mult = self.config.atr_target_mult;
        match self.config.threshold_mode {
            ThresholdMode::Literal => (
                entry * (1.0 - atr * stop_mult),
                entry * (1.0 + atr * target_mult),
            ),
            ThresholdMode::PriceOffset => (entry - atr * stop_mult, entry + atr * target_mult),
        }
    }
}
