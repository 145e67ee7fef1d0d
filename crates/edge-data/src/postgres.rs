//! PostgreSQL(TimescaleDB) 기반 가격 소스.
//!
//! `ohlcv` 테이블의 일봉 데이터를 읽습니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use edge_data::{PostgresPriceSource, PriceSource};
//!
//! let source = PostgresPriceSource::connect(&database_url, 5).await?;
//! let series = source.load("AAPL", 10).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use edge_core::{PriceBar, PriceSeries};

use crate::error::{DataError, DataResult};
use crate::source::PriceSource;

/// 일봉 타임프레임 식별자
const DAILY_TIMEFRAME: &str = "1d";

/// OHLCV 캔들 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct OhlcvRecord {
    pub open_time: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl OhlcvRecord {
    /// 가격 봉으로 변환합니다.
    pub fn to_bar(&self) -> DataResult<PriceBar> {
        let convert = |value: Decimal, field: &str| {
            value.to_f64().ok_or_else(|| {
                DataError::ParseError(format!("{} at {} is out of range", field, self.open_time))
            })
        };

        Ok(PriceBar::new(
            self.open_time,
            convert(self.open, "open")?,
            convert(self.high, "high")?,
            convert(self.low, "low")?,
            convert(self.close, "close")?,
            convert(self.volume, "volume")?,
        ))
    }
}

/// 데이터베이스 가격 소스.
#[derive(Clone)]
pub struct PostgresPriceSource {
    pool: PgPool,
}

impl PostgresPriceSource {
    /// 새로운 연결 풀을 생성합니다.
    pub async fn connect(url: &str, max_connections: u32) -> DataResult<Self> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("Database connection established");
        Ok(Self { pool })
    }

    /// 기존 연결 풀에서 생성합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PriceSource for PostgresPriceSource {
    fn name(&self) -> &str {
        "postgres"
    }

    #[instrument(skip(self))]
    async fn load(&self, symbol: &str, lookback_years: u32) -> DataResult<PriceSeries> {
        let records: Vec<OhlcvRecord> = sqlx::query_as(
            r#"
            SELECT open_time, open, high, low, close, volume
            FROM ohlcv
            WHERE symbol = $1 AND timeframe = $2
            ORDER BY open_time ASC
            "#,
        )
        .bind(symbol)
        .bind(DAILY_TIMEFRAME)
        .fetch_all(&self.pool)
        .await?;

        if records.is_empty() {
            return Err(DataError::NotFound(format!("no ohlcv rows for {}", symbol)));
        }

        let bars = records
            .iter()
            .map(OhlcvRecord::to_bar)
            .collect::<DataResult<Vec<_>>>()?;
        let series = PriceSeries::from_unsorted(symbol, bars)?.lookback(lookback_years);

        debug!(symbol, bars = series.len(), "DB 가격 데이터 로드");
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_record_to_bar() {
        let record = OhlcvRecord {
            open_time: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            open: dec!(187.15),
            high: dec!(188.44),
            low: dec!(183.89),
            close: dec!(185.64),
            volume: dec!(82488700),
        };
        let bar = record.to_bar().unwrap();
        assert!((bar.close - 185.64).abs() < 1e-9);
        assert!((bar.volume - 82_488_700.0).abs() < 1e-6);
    }
}
