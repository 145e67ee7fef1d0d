//! 설정 관리.
//!
//! 기본값 → TOML 파일 → `EDGE__` 환경 변수 순서로 설정을 병합합니다.
//! 모든 엔진은 이 설정 객체를 생성 시점에 명시적으로 전달받습니다.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EdgeError, EdgeResult};
use crate::logging::LogFormat;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 가격 데이터 설정
    #[serde(default)]
    pub data: DataConfig,
    /// 펀더멘털 API 설정
    #[serde(default)]
    pub fundamentals: FundamentalConfig,
    /// 피처/신호 파이프라인 설정
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// 예측 모델 하이퍼파라미터
    #[serde(default)]
    pub model: ModelConfig,
    /// 백테스트 시뮬레이션 설정
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// 주문 실행 설정
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> EdgeResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("EDGE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("pipeline.symbols")
                    .with_list_parse_key("execution.accounts")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// `config/default.toml`에서 로드합니다.
    pub fn load_default() -> EdgeResult<Self> {
        Self::load("config/default.toml")
    }

    /// 모든 섹션을 검증합니다.
    pub fn validate(&self) -> EdgeResult<()> {
        self.data.validate()?;
        self.pipeline.validate()?;
        self.model.validate()?;
        self.simulation.validate()?;
        self.execution.validate()?;
        Ok(())
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// 가격 데이터 소스 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// `<dir>/<SYMBOL>.csv` 파일
    #[default]
    Csv,
    /// PostgreSQL/TimescaleDB `ohlcv` 테이블
    Postgres,
}

/// 가격 데이터 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// 데이터 소스 종류
    #[serde(default)]
    pub source: DataSourceKind,
    /// CSV 디렉토리
    #[serde(default = "default_csv_dir")]
    pub csv_dir: PathBuf,
    /// 데이터베이스 URL (postgres 소스 전용)
    #[serde(default)]
    pub database_url: Option<String>,
    /// 최대 연결 수
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 마지막 날짜 기준 조회 기간 (년)
    #[serde(default = "default_lookback_years")]
    pub lookback_years: u32,
}

fn default_csv_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_connections() -> u32 {
    5
}

fn default_lookback_years() -> u32 {
    10
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::default(),
            csv_dir: default_csv_dir(),
            database_url: None,
            max_connections: default_max_connections(),
            lookback_years: default_lookback_years(),
        }
    }
}

impl DataConfig {
    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> EdgeResult<()> {
        if self.lookback_years == 0 {
            return Err(EdgeError::Config(
                "data.lookback_years must be positive".to_string(),
            ));
        }
        if self.source == DataSourceKind::Postgres && self.database_url.is_none() {
            return Err(EdgeError::Config(
                "data.database_url is required for the postgres source".to_string(),
            ));
        }
        Ok(())
    }
}

/// 펀더멘털 API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FundamentalConfig {
    /// API 조회 활성화 여부 (비활성 시 전부 0)
    #[serde(default)]
    pub enabled: bool,
    /// API 기본 URL
    #[serde(default = "default_fundamental_url")]
    pub base_url: String,
    /// API 키
    #[serde(default)]
    pub api_key: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_fundamental_timeout")]
    pub timeout_secs: u64,
}

fn default_fundamental_url() -> String {
    "https://www.alphavantage.co".to_string()
}

fn default_fundamental_timeout() -> u64 {
    10
}

impl Default for FundamentalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_fundamental_url(),
            api_key: String::new(),
            timeout_secs: default_fundamental_timeout(),
        }
    }
}

/// 피처 구성 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureMode {
    /// OHLCV + 펀더멘털 비율, 타깃은 다음 봉 종가
    #[default]
    Tabular,
    /// 직전 N개 종가, 타깃은 현재 종가
    SlidingWindow,
}

/// 시뮬레이터에 넘길 테스트 구간 행 선택 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFilter {
    /// 앙상블 예측 > 종가 인 행만
    #[default]
    BuySignalsOnly,
    /// 테스트 구간 전체
    AllRows,
}

/// 피처/신호 파이프라인 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// 대상 종목
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// 피처 구성 방식
    #[serde(default)]
    pub feature_mode: FeatureMode,
    /// 슬라이딩 윈도우 크기
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// 테스트 구간 비율 (시간 순서 유지)
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// ATR 기간
    #[serde(default = "default_indicator_window")]
    pub atr_window: usize,
    /// RSI 기간
    #[serde(default = "default_indicator_window")]
    pub rsi_window: usize,
    /// MACD 단기 EMA
    #[serde(default = "default_macd_short")]
    pub macd_short: usize,
    /// MACD 장기 EMA
    #[serde(default = "default_macd_long")]
    pub macd_long: usize,
    /// MACD 시그널 EMA
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
    /// RSI/MACD 컬럼을 피처에 포함할지 여부
    #[serde(default)]
    pub include_indicators: bool,
    /// 신호 필터
    #[serde(default)]
    pub signal_filter: SignalFilter,
    /// 난수 시드
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// 앙상블 가중치 (신경망, 트리 앙상블, 벤치마크)
    #[serde(default = "default_ensemble_weights")]
    pub ensemble_weights: [f64; 3],
}

fn default_symbols() -> Vec<String> {
    [
        "AAPL", "MSFT", "NVDA", "GOOGL", "GOOG", "AMZN", "META", "BRK.B", "TSLA", "UNH", "JNJ",
        "JPM", "V", "PG", "MA", "HD", "CVX", "LLY", "PFE", "ABBV", "MRK", "PEP", "KO", "AVGO",
        "CSCO", "XOM", "CMCSA", "DIS", "INTC", "VZ", "T", "TMO", "ABT", "CRM", "ADBE", "NFLX",
        "PYPL", "ACN", "NKE", "MCD", "COST", "BMY", "AMGN", "HON", "BA", "IBM", "MMM", "UNP",
        "NEE", "LIN",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_window_size() -> usize {
    20
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_indicator_window() -> usize {
    14
}

fn default_macd_short() -> usize {
    12
}

fn default_macd_long() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_seed() -> u64 {
    42
}

fn default_ensemble_weights() -> [f64; 3] {
    [0.3, 0.4, 0.3]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            feature_mode: FeatureMode::default(),
            window_size: default_window_size(),
            test_fraction: default_test_fraction(),
            atr_window: default_indicator_window(),
            rsi_window: default_indicator_window(),
            macd_short: default_macd_short(),
            macd_long: default_macd_long(),
            macd_signal: default_macd_signal(),
            include_indicators: false,
            signal_filter: SignalFilter::default(),
            seed: default_seed(),
            ensemble_weights: default_ensemble_weights(),
        }
    }
}

impl PipelineConfig {
    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> EdgeResult<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(EdgeError::Config(format!(
                "pipeline.test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.window_size == 0 || self.atr_window == 0 || self.rsi_window == 0 {
            return Err(EdgeError::Config(
                "pipeline windows must be positive".to_string(),
            ));
        }
        if self.macd_short == 0 || self.macd_short >= self.macd_long || self.macd_signal == 0 {
            return Err(EdgeError::Config(format!(
                "pipeline MACD windows invalid: short={}, long={}, signal={}",
                self.macd_short, self.macd_long, self.macd_signal
            )));
        }
        let weight_sum: f64 = self.ensemble_weights.iter().sum();
        if self.ensemble_weights.iter().any(|w| *w < 0.0) || (weight_sum - 1.0).abs() > 1e-9 {
            return Err(EdgeError::Config(format!(
                "pipeline.ensemble_weights must be non-negative and sum to 1, got {:?}",
                self.ensemble_weights
            )));
        }
        Ok(())
    }
}

/// 예측 모델 하이퍼파라미터.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// 은닉층 크기
    #[serde(default = "default_hidden_layers")]
    pub hidden_layers: Vec<usize>,
    /// 은닉층별 드롭아웃 비율
    #[serde(default = "default_dropout")]
    pub dropout: Vec<f64>,
    /// 학습 에폭
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// 미니배치 크기
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Adam 학습률
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// 트리 개수
    #[serde(default = "default_forest_trees")]
    pub forest_trees: usize,
    /// 트리 최대 깊이
    #[serde(default = "default_forest_max_depth")]
    pub forest_max_depth: usize,
    /// 분할 최소 샘플 수
    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,
    /// 리프 최소 샘플 수
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// 분할마다 고려할 피처 수 (없으면 전체)
    #[serde(default)]
    pub max_features: Option<usize>,
    /// 부트스트랩 샘플링 여부
    #[serde(default = "default_bootstrap")]
    pub bootstrap: bool,
}

fn default_hidden_layers() -> Vec<usize> {
    vec![128, 64, 32]
}

fn default_dropout() -> Vec<f64> {
    vec![0.3, 0.2, 0.0]
}

fn default_epochs() -> usize {
    10
}

fn default_batch_size() -> usize {
    32
}

fn default_learning_rate() -> f64 {
    0.001
}

fn default_forest_trees() -> usize {
    100
}

fn default_forest_max_depth() -> usize {
    5
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

fn default_bootstrap() -> bool {
    true
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hidden_layers: default_hidden_layers(),
            dropout: default_dropout(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            forest_trees: default_forest_trees(),
            forest_max_depth: default_forest_max_depth(),
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            max_features: None,
            bootstrap: default_bootstrap(),
        }
    }
}

impl ModelConfig {
    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> EdgeResult<()> {
        if self.hidden_layers.iter().any(|&n| n == 0) {
            return Err(EdgeError::Config(
                "model.hidden_layers must not contain zero-sized layers".to_string(),
            ));
        }
        if self.dropout.iter().any(|p| !(0.0..1.0).contains(p)) {
            return Err(EdgeError::Config(
                "model.dropout values must be in [0, 1)".to_string(),
            ));
        }
        if self.epochs == 0 || self.batch_size == 0 || self.learning_rate <= 0.0 {
            return Err(EdgeError::Config(
                "model.epochs, batch_size and learning_rate must be positive".to_string(),
            ));
        }
        if self.forest_trees == 0 || self.forest_max_depth == 0 {
            return Err(EdgeError::Config(
                "model.forest_trees and forest_max_depth must be positive".to_string(),
            ));
        }
        if self.min_samples_split < 2 || self.min_samples_leaf == 0 {
            return Err(EdgeError::Config(
                "model.min_samples_split must be >= 2 and min_samples_leaf >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// 손절/목표가 임계값 계산 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// `entry * (1 - atr * mult)`: ATR을 비율로 그대로 사용 (기존 동작)
    #[default]
    Literal,
    /// `entry - atr * mult`: ATR을 가격 오프셋으로 사용
    PriceOffset,
}

/// 백테스트 시뮬레이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// 시작 자본
    #[serde(default = "default_starting_capital")]
    pub starting_capital: f64,
    /// 손절 ATR 배수
    #[serde(default = "default_atr_stop_mult")]
    pub atr_stop_mult: f64,
    /// 목표가 ATR 배수
    #[serde(default = "default_atr_target_mult")]
    pub atr_target_mult: f64,
    /// 최대 보유 기간 (봉)
    #[serde(default = "default_holding_period")]
    pub holding_period: u32,
    /// 임계값 계산 방식
    #[serde(default)]
    pub threshold_mode: ThresholdMode,
    /// 샤프 비율 연율화 계수
    #[serde(default = "default_annualization_factor")]
    pub annualization_factor: f64,
}

fn default_starting_capital() -> f64 {
    100_000.0
}

fn default_atr_stop_mult() -> f64 {
    1.5
}

fn default_atr_target_mult() -> f64 {
    3.0
}

fn default_holding_period() -> u32 {
    5
}

fn default_annualization_factor() -> f64 {
    252.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            starting_capital: default_starting_capital(),
            atr_stop_mult: default_atr_stop_mult(),
            atr_target_mult: default_atr_target_mult(),
            holding_period: default_holding_period(),
            threshold_mode: ThresholdMode::default(),
            annualization_factor: default_annualization_factor(),
        }
    }
}

impl SimulationConfig {
    /// 시작 자본을 지정합니다.
    pub fn with_starting_capital(mut self, capital: f64) -> Self {
        self.starting_capital = capital;
        self
    }

    /// 보유 기간을 지정합니다.
    pub fn with_holding_period(mut self, bars: u32) -> Self {
        self.holding_period = bars;
        self
    }

    /// 손절/목표가 ATR 배수를 지정합니다.
    pub fn with_atr_multipliers(mut self, stop: f64, target: f64) -> Self {
        self.atr_stop_mult = stop;
        self.atr_target_mult = target;
        self
    }

    /// 임계값 계산 방식을 지정합니다.
    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.threshold_mode = mode;
        self
    }

    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> EdgeResult<()> {
        if !(self.starting_capital.is_finite() && self.starting_capital > 0.0) {
            return Err(EdgeError::Config(
                "simulation.starting_capital must be positive".to_string(),
            ));
        }
        let non_negative = |x: f64| x.is_finite() && x >= 0.0;
        if !(non_negative(self.atr_stop_mult) && non_negative(self.atr_target_mult)) {
            return Err(EdgeError::Config(
                "simulation ATR multipliers must be non-negative".to_string(),
            ));
        }
        if !(self.annualization_factor.is_finite() && self.annualization_factor > 0.0) {
            return Err(EdgeError::Config(
                "simulation.annualization_factor must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// 주문 수량 결정 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityMode {
    /// 매 의도마다 고정 수량
    #[default]
    Fixed,
    /// 시뮬레이션 포지션 수량 (정수 내림)
    Position,
}

/// 주문 실행 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExecutionConfig {
    /// 주문 실행 활성화
    #[serde(default)]
    pub enabled: bool,
    /// 모의 게이트웨이 사용 여부
    #[serde(default = "default_dry_run")]
    pub dry_run: bool,
    /// 주문을 복제할 계좌 목록
    #[serde(default = "default_accounts")]
    pub accounts: Vec<String>,
    /// 매수 주문 1건당 최대 수량
    #[serde(default = "default_buy_chunk_cap")]
    pub buy_chunk_cap: u64,
    /// 매도 주문 1건당 최대 수량
    #[serde(default = "default_sell_chunk_cap")]
    pub sell_chunk_cap: u64,
    /// 수량 결정 방식
    #[serde(default)]
    pub quantity_mode: QuantityMode,
    /// 고정 수량
    #[serde(default = "default_fixed_quantity")]
    pub fixed_quantity: u64,
    /// 매수 지정가 = 현재가 + offset
    #[serde(default = "default_buy_limit_offset")]
    pub buy_limit_offset: f64,
}

fn default_dry_run() -> bool {
    true
}

fn default_accounts() -> Vec<String> {
    vec!["default".to_string()]
}

fn default_buy_chunk_cap() -> u64 {
    10_000
}

fn default_sell_chunk_cap() -> u64 {
    500
}

fn default_fixed_quantity() -> u64 {
    1
}

fn default_buy_limit_offset() -> f64 {
    5.0
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dry_run: default_dry_run(),
            accounts: default_accounts(),
            buy_chunk_cap: default_buy_chunk_cap(),
            sell_chunk_cap: default_sell_chunk_cap(),
            quantity_mode: QuantityMode::default(),
            fixed_quantity: default_fixed_quantity(),
            buy_limit_offset: default_buy_limit_offset(),
        }
    }
}

impl ExecutionConfig {
    /// 설정 유효성을 검증합니다.
    pub fn validate(&self) -> EdgeResult<()> {
        if self.buy_chunk_cap == 0 || self.sell_chunk_cap == 0 {
            return Err(EdgeError::Config(
                "execution chunk caps must be positive".to_string(),
            ));
        }
        if self.accounts.is_empty() {
            return Err(EdgeError::Config(
                "execution.accounts must not be empty".to_string(),
            ));
        }
        if !self.buy_limit_offset.is_finite() {
            return Err(EdgeError::Config(
                "execution.buy_limit_offset must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.symbols.len(), 50);
        assert_eq!(config.pipeline.ensemble_weights, [0.3, 0.4, 0.3]);
        assert_eq!(config.simulation.holding_period, 5);
        assert_eq!(config.simulation.threshold_mode, ThresholdMode::Literal);
        assert_eq!(config.execution.buy_chunk_cap, 10_000);
        assert_eq!(config.execution.sell_chunk_cap, 500);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[pipeline]
symbols = ["AAPL", "MSFT"]
signal_filter = "all_rows"

[simulation]
holding_period = 7
threshold_mode = "price_offset"
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.pipeline.symbols, vec!["AAPL", "MSFT"]);
        assert_eq!(config.pipeline.signal_filter, SignalFilter::AllRows);
        assert_eq!(config.simulation.holding_period, 7);
        assert_eq!(config.simulation.threshold_mode, ThresholdMode::PriceOffset);
        // 지정하지 않은 값은 기본값
        assert_eq!(config.simulation.starting_capital, 100_000.0);
        assert_eq!(config.data.lookback_years, 10);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.pipeline.test_fraction, 0.2);
    }

    #[test]
    fn test_shipped_default_file_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        let config = AppConfig::load(path).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.pipeline.symbols, defaults.pipeline.symbols);
        assert_eq!(config.model.hidden_layers, defaults.model.hidden_layers);
        assert_eq!(config.simulation.holding_period, defaults.simulation.holding_period);
        assert_eq!(config.execution.accounts, defaults.execution.accounts);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut config = PipelineConfig::default();
        config.ensemble_weights = [0.5, 0.5, 0.5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_postgres_requires_url() {
        let config = DataConfig {
            source: DataSourceKind::Postgres,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulation_builder() {
        let config = SimulationConfig::default()
            .with_starting_capital(50_000.0)
            .with_holding_period(3)
            .with_atr_multipliers(2.0, 4.0);
        assert_eq!(config.starting_capital, 50_000.0);
        assert_eq!(config.holding_period, 3);
        assert_eq!(config.atr_stop_mult, 2.0);
        assert!(config.validate().is_ok());
        assert!(config.with_starting_capital(0.0).validate().is_err());
    }

    #[test]
    fn test_simulation_rejects_non_finite() {
        let nan_stop = SimulationConfig::default().with_atr_multipliers(f64::NAN, 3.0);
        assert!(nan_stop.validate().is_err());

        let inf_target = SimulationConfig::default().with_atr_multipliers(1.5, f64::INFINITY);
        assert!(inf_target.validate().is_err());

        let negative = SimulationConfig::default().with_atr_multipliers(-0.5, 3.0);
        assert!(negative.validate().is_err());

        let mut config = SimulationConfig::default();
        config.annualization_factor = f64::NAN;
        assert!(config.validate().is_err());
    }
}
