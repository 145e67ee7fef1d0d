//! 펀더멘털 지표 소스.
//!
//! 종목별 8개 재무 비율(PE, BookValue, Revenue, PriceToBook, NetMargin, ROA, EPS,
//! DividendYield)을 제공합니다. 외부 API 오류는 전파하지 않고 0값으로 대체합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use edge_data::{AlphaVantageClient, FundamentalSource};
//!
//! let client = AlphaVantageClient::new(&config.fundamentals)?;
//! let ratios = client.fetch("AAPL").await; // 실패 시 모두 0.0
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use edge_core::{FundamentalConfig, FundamentalRatios};

use crate::error::{DataError, DataResult};

/// 종목별 펀더멘털 지표 제공자.
///
/// 실패하지 않습니다. 데이터를 얻지 못하면 모든 필드가 0.0인 값을 반환합니다.
#[async_trait]
pub trait FundamentalSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> FundamentalRatios;
}

/// 고정 값을 반환하는 소스 (펀더멘털 비활성화 시 / 테스트용).
#[derive(Debug, Clone, Default)]
pub struct StaticFundamentalSource {
    fallback: FundamentalRatios,
    overrides: HashMap<String, FundamentalRatios>,
}

impl StaticFundamentalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 특정 종목의 값을 지정합니다.
    pub fn with_symbol(mut self, symbol: impl Into<String>, ratios: FundamentalRatios) -> Self {
        self.overrides.insert(symbol.into(), ratios);
        self
    }
}

#[async_trait]
impl FundamentalSource for StaticFundamentalSource {
    async fn fetch(&self, symbol: &str) -> FundamentalRatios {
        self.overrides
            .get(symbol)
            .copied()
            .unwrap_or(self.fallback)
    }
}

/// Alpha Vantage `OVERVIEW` 응답 필드 → 비율 매핑 (FIELD_NAMES 순서)
const OVERVIEW_FIELDS: [&str; 8] = [
    "PERatio",
    "BookValue",
    "RevenueTTM",
    "PriceToBookRatio",
    "ProfitMargin",
    "ReturnOnAssetsTTM",
    "EPS",
    "DividendYield",
];

/// Alpha Vantage 회사 개요 API 클라이언트.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &FundamentalConfig) -> DataResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// 개요를 조회하여 비율로 변환합니다. 실패를 그대로 반환합니다.
    pub async fn fetch_overview(&self, symbol: &str) -> DataResult<FundamentalRatios> {
        let url = format!("{}/query", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "OVERVIEW"),
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: Value = response.json().await?;
        parse_overview(&body)
    }
}

#[async_trait]
impl FundamentalSource for AlphaVantageClient {
    async fn fetch(&self, symbol: &str) -> FundamentalRatios {
        match self.fetch_overview(symbol).await {
            Ok(ratios) => {
                debug!(symbol, "펀더멘털 조회 완료");
                ratios
            }
            Err(e) => {
                warn!(symbol, error = %e, "펀더멘털 조회 실패, 0값 사용");
                FundamentalRatios::default()
            }
        }
    }
}

/// `OVERVIEW` JSON을 비율로 변환합니다.
///
/// - `Symbol` 키가 없으면 [`DataError::NotFound`]
/// - 필드가 없거나 숫자로 해석할 수 없는 값이 하나라도 있으면 [`DataError::ParseError`]
///   (호출 측에서 모든 필드 0.0으로 대체)
/// - 예외: `DividendYield`는 없거나 `"None"`이면 0.0
pub fn parse_overview(body: &Value) -> DataResult<FundamentalRatios> {
    if body.get("Symbol").is_none() {
        return Err(DataError::NotFound("overview response has no Symbol".to_string()));
    }

    let mut values = [0.0; 8];
    for (slot, field) in values.iter_mut().zip(OVERVIEW_FIELDS) {
        *slot = if field == DIVIDEND_YIELD && is_absent(body.get(field)) {
            0.0
        } else {
            parse_field(body, field)?
        };
    }

    let [pe, book_value, revenue, price_to_book, net_margin, roa, eps, dividend_yield] = values;
    Ok(FundamentalRatios {
        pe,
        book_value,
        revenue,
        price_to_book,
        net_margin,
        roa,
        eps,
        dividend_yield,
    })
}

/// 배당이 없는 종목은 `"None"`으로 내려온다
const DIVIDEND_YIELD: &str = "DividendYield";

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim() == "None",
        Some(_) => false,
    }
}

fn parse_field(body: &Value, field: &str) -> DataResult<f64> {
    match body.get(field) {
        None | Some(Value::Null) => Err(DataError::ParseError(format!("{}: missing", field))),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| DataError::ParseError(format!("{}: {}", field, n))),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DataError::ParseError(format!("{}: '{}'", field, s)))
        }
        Some(other) => Err(DataError::ParseError(format!("{}: {}", field, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(base_url: String) -> FundamentalConfig {
        FundamentalConfig {
            enabled: true,
            base_url,
            api_key: "demo".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_parse_overview_full() {
        let body = json!({
            "Symbol": "IBM",
            "PERatio": "22.5",
            "BookValue": "24.8",
            "RevenueTTM": "61860000000",
            "PriceToBookRatio": "7.1",
            "ProfitMargin": "0.123",
            "ReturnOnAssetsTTM": "0.046",
            "EPS": "8.14",
            "DividendYield": "0.0345"
        });
        let ratios = parse_overview(&body).unwrap();
        assert_eq!(ratios.pe, 22.5);
        assert_eq!(ratios.revenue, 61_860_000_000.0);
        assert_eq!(ratios.dividend_yield, 0.0345);
    }

    fn overview(symbol: &str) -> Value {
        json!({
            "Symbol": symbol,
            "PERatio": "22.5",
            "BookValue": "24.8",
            "RevenueTTM": "1000",
            "PriceToBookRatio": "7.1",
            "ProfitMargin": "0.123",
            "ReturnOnAssetsTTM": "0.046",
            "EPS": "8.14",
            "DividendYield": "0.0345"
        })
    }

    #[test]
    fn test_parse_overview_dividend_none_is_zero() {
        let mut body = overview("TSLA");
        body["DividendYield"] = json!("None");
        let ratios = parse_overview(&body).unwrap();
        assert_eq!(ratios.dividend_yield, 0.0);
        assert_eq!(ratios.pe, 22.5);
        assert_eq!(ratios.book_value, 24.8);

        body.as_object_mut().unwrap().remove("DividendYield");
        assert_eq!(parse_overview(&body).unwrap().dividend_yield, 0.0);
    }

    #[test]
    fn test_parse_overview_none_field_fails() {
        for value in ["None", "-", ""] {
            let mut body = overview("TSLA");
            body["PERatio"] = json!(value);
            assert!(
                matches!(parse_overview(&body), Err(DataError::ParseError(_))),
                "PERatio {:?}",
                value
            );
        }
    }

    #[test]
    fn test_parse_overview_missing_field_fails() {
        let mut body = overview("TSLA");
        body.as_object_mut().unwrap().remove("EPS");
        assert!(matches!(parse_overview(&body), Err(DataError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_none_field_zeroes_every_ratio() {
        let mut body = overview("TSLA");
        body["PERatio"] = json!("None");

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = AlphaVantageClient::new(&config(server.url())).unwrap();
        assert_eq!(client.fetch("TSLA").await, FundamentalRatios::default());
    }

    #[test]
    fn test_parse_overview_without_symbol() {
        let body = json!({ "Note": "API call frequency exceeded" });
        assert!(matches!(parse_overview(&body), Err(DataError::NotFound(_))));
    }

    #[test]
    fn test_parse_overview_garbage_field() {
        let body = json!({ "Symbol": "IBM", "PERatio": "abc" });
        assert!(matches!(parse_overview(&body), Err(DataError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_static_source_overrides() {
        let ratios = FundamentalRatios {
            pe: 10.0,
            ..FundamentalRatios::default()
        };
        let source = StaticFundamentalSource::new().with_symbol("AAPL", ratios);
        assert_eq!(source.fetch("AAPL").await, ratios);
        assert!(source.fetch("MSFT").await.is_zero());
    }

    #[tokio::test]
    async fn test_client_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/query")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("function".into(), "OVERVIEW".into()),
                mockito::Matcher::UrlEncoded("symbol".into(), "IBM".into()),
                mockito::Matcher::UrlEncoded("apikey".into(), "demo".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(overview("IBM").to_string())
            .create_async()
            .await;

        let client = AlphaVantageClient::new(&config(server.url())).unwrap();
        let ratios = client.fetch("IBM").await;

        mock.assert_async().await;
        assert_eq!(ratios.pe, 22.5);
        assert_eq!(ratios.eps, 8.14);
    }

    #[tokio::test]
    async fn test_client_http_error_is_zero() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/query")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = AlphaVantageClient::new(&config(server.url())).unwrap();
        assert!(client.fetch_overview("IBM").await.is_err());
        assert!(client.fetch("IBM").await.is_zero());
    }

    #[tokio::test]
    async fn test_client_unparseable_is_zero() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/query")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"Symbol":"IBM","PERatio":"n/a"}"#)
            .create_async()
            .await;

        let client = AlphaVantageClient::new(&config(server.url())).unwrap();
        assert!(client.fetch("IBM").await.is_zero());
    }
}
