//! 신호 기반 백테스터 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일의 종목 전체 백테스트
//! edge backtest -c config/default.toml
//!
//! # 일부 종목, JSON 결과 저장
//! edge backtest --symbols AAPL,MSFT --format json --output results.json
//!
//! # 마지막 지표 값 확인
//! edge indicators --symbol AAPL
//!
//! # 유효 설정 출력
//! edge config
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use edge_cli::commands::backtest::{parse_symbols, run_backtest, BacktestCliConfig, OutputFormat};
use edge_cli::commands::indicators::IndicatorSnapshot;
use edge_cli::commands::show_config::render_config;
use edge_core::{init_logging, AppConfig, LogConfig};
use edge_data::CsvPriceSource;
use edge_data::PriceSource;

#[derive(Parser)]
#[command(name = "edge")]
#[command(about = "Signal edge - 예측 신호 기반 백테스트 CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 종목 배치 백테스트 실행
    Backtest {
        /// 쉼표로 구분된 종목 목록 (예: AAPL,MSFT). 없으면 설정 파일 목록
        #[arg(short, long)]
        symbols: Option<String>,

        /// CSV 가격 데이터 디렉터리
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// 결과 저장 경로
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 출력 형식
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// 종목별 거래 로그 디렉터리
        #[arg(long)]
        trades_dir: Option<PathBuf>,

        /// 주문 의도를 실행 어댑터로 전달
        #[arg(long)]
        execute: bool,

        /// 진행률 표시 끄기
        #[arg(long)]
        no_progress: bool,
    },

    /// 한 종목의 마지막 RSI, MACD, ATR 출력
    Indicators {
        /// 종목 코드
        #[arg(short, long)]
        symbol: String,

        /// CSV 가격 데이터 디렉터리
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// RSI/ATR 기간 재정의
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// 유효 설정을 TOML로 출력
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env는 없어도 된다
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;

    init_logging(LogConfig::from(&config.logging)).context("로깅 초기화 실패")?;
    info!(config = %cli.config.display(), "edge 시작");

    match cli.command {
        Commands::Backtest {
            symbols,
            data_dir,
            output,
            format,
            trades_dir,
            execute,
            no_progress,
        } => {
            let options = BacktestCliConfig {
                symbols: symbols.as_deref().map(parse_symbols),
                data_dir,
                output,
                format,
                trades_dir,
                execute,
                progress: !no_progress,
            };

            let batch = run_backtest(config, options).await?;
            info!(
                succeeded = batch.aggregator.len(),
                skipped = batch.aggregator.skipped().len(),
                "✅ 백테스트 완료"
            );
        }

        Commands::Indicators {
            symbol,
            data_dir,
            window,
        } => {
            let symbol = symbol.to_uppercase();
            let dir = data_dir.unwrap_or_else(|| config.data.csv_dir.clone());
            let source = CsvPriceSource::new(dir);
            let series = source
                .load(&symbol, config.data.lookback_years)
                .await
                .with_context(|| format!("{} 가격 데이터 로드 실패", symbol))?;

            let snapshot = IndicatorSnapshot::compute(&series, &config.pipeline, window)?;
            println!("\n{}", snapshot.render());
        }

        Commands::Config => {
            println!("{}", render_config(&config)?);
        }
    }

    Ok(())
}
