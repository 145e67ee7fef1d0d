//! 가격 및 펀더멘털 데이터 소스.
//!
//! 이 crate는 다음을 제공합니다:
//! - 종목별 과거 가격 시계열 로더 (CSV 디렉터리, PostgreSQL)
//! - 회사 개요 API 기반 펀더멘털 지표 클라이언트 (실패 시 0값)
//! - 설정 기반 소스 생성

pub mod csv_source;
pub mod error;
pub mod fundamental;
pub mod postgres;
pub mod source;

pub use csv_source::CsvPriceSource;
pub use error::{DataError, DataResult};
pub use fundamental::{
    parse_overview, AlphaVantageClient, FundamentalSource, StaticFundamentalSource,
};
pub use postgres::{OhlcvRecord, PostgresPriceSource};
pub use source::PriceSource;

use edge_core::{DataConfig, DataSourceKind, FundamentalConfig};

/// 설정에 따라 가격 소스를 생성합니다.
pub async fn price_source_from_config(config: &DataConfig) -> DataResult<Box<dyn PriceSource>> {
    match config.source {
        DataSourceKind::Csv => Ok(Box::new(CsvPriceSource::new(config.csv_dir.clone()))),
        DataSourceKind::Postgres => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                DataError::ConfigError("data.database_url is required for postgres".to_string())
            })?;
            let source = PostgresPriceSource::connect(url, config.max_connections).await?;
            Ok(Box::new(source))
        }
    }
}

/// 설정에 따라 펀더멘털 소스를 생성합니다. 비활성화 시 0값 소스.
pub fn fundamental_source_from_config(
    config: &FundamentalConfig,
) -> DataResult<Box<dyn FundamentalSource>> {
    if config.enabled {
        Ok(Box::new(AlphaVantageClient::new(config)?))
    } else {
        Ok(Box::new(StaticFundamentalSource::new()))
    }
}
