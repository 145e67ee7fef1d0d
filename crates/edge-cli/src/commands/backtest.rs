//! 백테스트 명령어.
//!
//! 설정된 종목 목록을 순서대로 처리하여 종목별 성과 지표를 집계합니다.
//! 한 종목의 실패는 기록만 하고 다음 종목으로 넘어갑니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 설정(config/default.toml)으로 전체 종목 백테스트
//! edge backtest
//!
//! # 일부 종목만, CSV 디렉터리 지정
//! edge backtest --symbols AAPL,MSFT --data-dir data/daily
//!
//! # 결과를 CSV로 저장하고 거래 로그 출력
//! edge backtest --format csv --output results.csv --trades-dir trades
//!
//! # 생성된 주문 의도를 모의 게이트웨이로 전달
//! edge backtest --symbols AAPL --execute
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use edge_analytics::{
    InstrumentOutcome, InstrumentPipeline, MetricsAggregator, PipelineError, PredictorSet,
};
use edge_core::{AppConfig, OrderIntent};
use edge_data::{
    fundamental_source_from_config, price_source_from_config, FundamentalSource, PriceSource,
};
use edge_execution::{ExecutionAdapter, ExecutionReport, PaperGateway};

/// 결과 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// 터미널 표
    #[default]
    Table,
    /// CSV (요약 행)
    Csv,
    /// JSON (결과 + 건너뛴 종목)
    Json,
}

/// 백테스트 CLI 옵션.
#[derive(Debug, Clone, Default)]
pub struct BacktestCliConfig {
    /// 종목 목록 (없으면 설정 파일의 목록)
    pub symbols: Option<Vec<String>>,
    /// CSV 가격 디렉터리 재정의
    pub data_dir: Option<PathBuf>,
    /// 결과 저장 경로
    pub output: Option<PathBuf>,
    /// 출력 형식
    pub format: OutputFormat,
    /// 종목별 거래 로그 디렉터리
    pub trades_dir: Option<PathBuf>,
    /// 주문 의도를 실행 어댑터로 전달
    pub execute: bool,
    /// 진행률 표시
    pub progress: bool,
}

/// 배치 실행 결과.
#[derive(Debug, Default)]
pub struct BatchRun {
    /// 성과 지표 집계
    pub aggregator: MetricsAggregator,
    /// 성공한 종목의 전체 결과 (처리 순서)
    pub outcomes: Vec<InstrumentOutcome>,
}

impl BatchRun {
    /// 모든 종목의 주문 의도를 처리 순서대로 모읍니다.
    pub fn intents(&self) -> Vec<OrderIntent> {
        self.outcomes
            .iter()
            .flat_map(|outcome| outcome.intents.iter().cloned())
            .collect()
    }
}

/// CLI 옵션을 설정에 반영합니다.
pub fn apply_overrides(config: &mut AppConfig, cli: &BacktestCliConfig) {
    if let Some(symbols) = &cli.symbols {
        config.pipeline.symbols = symbols.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data.csv_dir = dir.clone();
    }
}

/// 쉼표로 구분된 종목 목록을 파싱합니다. 공백과 빈 항목은 무시하고 대문자로 변환합니다.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// 백테스트 명령 진입점.
pub async fn run_backtest(mut config: AppConfig, cli: BacktestCliConfig) -> Result<BatchRun> {
    apply_overrides(&mut config, &cli);
    config.validate().context("설정 검증 실패")?;

    if config.pipeline.symbols.is_empty() {
        bail!("처리할 종목이 없습니다");
    }

    println!("\n📊 백테스트 실행 중...");
    println!("종목 수: {}", config.pipeline.symbols.len());
    println!("데이터 소스: {:?}", config.data.source);
    println!("초기 자본: {:.2}", config.simulation.starting_capital);

    let prices = price_source_from_config(&config.data)
        .await
        .context("가격 소스 생성 실패")?;
    let fundamentals =
        fundamental_source_from_config(&config.fundamentals).context("펀더멘털 소스 생성 실패")?;

    let progress = cli
        .progress
        .then(|| progress_bar(config.pipeline.symbols.len() as u64));

    let batch = run_batch(
        &config,
        prices.as_ref(),
        fundamentals.as_ref(),
        progress.as_ref(),
    )
    .await;

    if let Some(pb) = &progress {
        pb.finish_with_message("완료");
    }

    emit_results(&batch.aggregator, &cli)?;

    if cli.execute || config.execution.enabled {
        let report = execute_intents(&config, &batch.intents()).await?;
        println!(
            "\n🧾 주문 실행: 완료 {} / 실패 {} (제출 주문 {}건)",
            report.completed(),
            report.failed(),
            report.orders.len()
        );
    }

    Ok(batch)
}

/// 종목 목록을 순서대로 처리합니다.
///
/// 실패한 종목은 사유와 함께 집계기에 기록하고 계속 진행합니다.
pub async fn run_batch(
    config: &AppConfig,
    prices: &dyn PriceSource,
    fundamentals: &dyn FundamentalSource,
    progress: Option<&ProgressBar>,
) -> BatchRun {
    let pipeline = InstrumentPipeline::new(config.pipeline.clone(), config.simulation.clone());
    let mut batch = BatchRun::default();

    for symbol in &config.pipeline.symbols {
        if let Some(pb) = progress {
            pb.set_message(symbol.clone());
        }

        match process_symbol(config, &pipeline, prices, fundamentals, symbol).await {
            Ok(outcome) => {
                batch.aggregator.push(outcome.report.clone());
                batch.outcomes.push(outcome);
            }
            Err(e) => {
                let skipped = e
                    .downcast_ref::<PipelineError>()
                    .is_some_and(PipelineError::is_skip);
                if skipped {
                    warn!(symbol = %symbol, reason = %e, "종목 건너뜀");
                } else {
                    error!(symbol = %symbol, error = %format!("{:#}", e), "종목 처리 실패");
                }
                batch.aggregator.record_skip(symbol.clone(), format!("{:#}", e));
            }
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    info!(
        succeeded = batch.aggregator.len(),
        skipped = batch.aggregator.skipped().len(),
        "배치 처리 완료"
    );
    batch
}

async fn process_symbol(
    config: &AppConfig,
    pipeline: &InstrumentPipeline,
    prices: &dyn PriceSource,
    fundamentals: &dyn FundamentalSource,
    symbol: &str,
) -> Result<InstrumentOutcome> {
    let series = prices
        .load(symbol, config.data.lookback_years)
        .await
        .with_context(|| format!("{} 가격 데이터 로드 실패", symbol))?;
    let ratios = fundamentals.fetch(symbol).await;

    // 종목마다 새 예측기를 만들어 학습 상태를 공유하지 않는다
    let mut predictors = PredictorSet::from_config(&config.model, &config.pipeline)?;
    let outcome = pipeline.run(&series, &ratios, &mut predictors)?;
    Ok(outcome)
}

/// 집계 결과를 출력하거나 저장합니다.
pub fn emit_results(aggregator: &MetricsAggregator, cli: &BacktestCliConfig) -> Result<()> {
    match (cli.format, &cli.output) {
        (OutputFormat::Table, None) => println!("\n{}", aggregator.render_table()),
        (OutputFormat::Table, Some(path)) => {
            std::fs::write(path, aggregator.render_table())
                .with_context(|| format!("결과 저장 실패: {}", path.display()))?;
            println!("\n📁 결과 저장됨: {}", path.display());
        }
        (OutputFormat::Csv, None) => {
            aggregator.write_csv(std::io::stdout().lock())?;
        }
        (OutputFormat::Csv, Some(path)) => {
            aggregator
                .write_csv_path(path)
                .with_context(|| format!("결과 저장 실패: {}", path.display()))?;
            println!("\n📁 결과 저장됨: {}", path.display());
        }
        (OutputFormat::Json, None) => println!("{}", aggregator.to_json()?),
        (OutputFormat::Json, Some(path)) => {
            std::fs::write(path, aggregator.to_json()?)
                .with_context(|| format!("결과 저장 실패: {}", path.display()))?;
            println!("\n📁 결과 저장됨: {}", path.display());
        }
    }

    if !aggregator.skipped().is_empty() {
        println!("\n⚠️  건너뛴 종목: {}", aggregator.skipped().len());
        for skip in aggregator.skipped() {
            println!("  {} - {}", skip.symbol, skip.reason);
        }
    }

    if let Some(dir) = &cli.trades_dir {
        let written = aggregator
            .write_trade_log(dir)
            .with_context(|| format!("거래 로그 저장 실패: {}", dir.display()))?;
        println!("\n📁 거래 로그 {}개 저장됨: {}", written.len(), dir.display());
    }

    Ok(())
}

/// 주문 의도를 실행 어댑터로 전달합니다.
///
/// `dry_run`이면 신호 시점 가격으로 시세를 채운 모의 게이트웨이를 사용합니다.
pub async fn execute_intents(config: &AppConfig, intents: &[OrderIntent]) -> Result<ExecutionReport> {
    if !config.execution.dry_run {
        bail!("실제 주문 게이트웨이가 구성되지 않았습니다. execution.dry_run = true 로 실행하세요");
    }

    let gateway = Arc::new(paper_gateway_for(intents));
    let adapter = ExecutionAdapter::new(gateway.clone(), config.execution.clone())
        .context("실행 어댑터 생성 실패")?;

    println!("\n🔒 드라이런 모드: 실제 주문이 실행되지 않습니다.");
    info!(intents = intents.len(), "주문 의도 전달");

    Ok(adapter.execute(intents).await)
}

/// 종목별 마지막 신호 가격을 현재가로 갖는 모의 게이트웨이.
fn paper_gateway_for(intents: &[OrderIntent]) -> PaperGateway {
    let last_prices: HashMap<&str, f64> = intents
        .iter()
        .map(|intent| (intent.symbol.as_str(), intent.price))
        .collect();

    last_prices
        .into_iter()
        .fold(PaperGateway::new(), |gateway, (symbol, price)| {
            match Decimal::from_f64_retain(price) {
                Some(price) => gateway.with_price(symbol, price.round_dp(4)),
                None => {
                    warn!(symbol, price, "가격을 Decimal로 변환할 수 없음");
                    gateway
                }
            }
        })
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
