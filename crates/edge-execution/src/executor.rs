//! 주문 실행 어댑터 구현.
//!
//! 제공 기능:
//! - 시뮬레이터가 만든 주문 의도(`OrderIntent`)를 주문 요청으로 변환
//! - 거래소 한도에 맞춘 수량 분할 (매수 10,000 / 매도 500)
//! - 설정된 모든 계좌로 동일 주문 복제
//! - 실패 시 해당 의도의 남은 분할 주문 포기 후 다음 의도로 진행
//!
//! 재시도는 하지 않습니다. 필요하면 게이트웨이 구현에서 처리합니다.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use edge_core::{ExecutionConfig, OrderIntent, QuantityMode, Side};

/// 실행 오류 유형.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Symbol not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// 브로커로 전송되는 주문 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 클라이언트 주문 ID
    pub client_order_id: Uuid,
    /// 주문 계좌
    pub account: String,
    pub symbol: String,
    pub side: Side,
    pub quantity: Decimal,
    /// 지정가 (없으면 시장가)
    pub limit_price: Option<Decimal>,
}

impl OrderRequest {
    /// 지정가 매수 주문.
    pub fn limit_buy(
        account: impl Into<String>,
        symbol: impl Into<String>,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            client_order_id: Uuid::new_v4(),
            account: account.into(),
            symbol: symbol.into(),
            side: Side::Buy,
            quantity,
            limit_price: Some(price),
        }
    }

    /// 시장가 매도 주문.
    pub fn market_sell(
        account: impl Into<String>,
        symbol: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        Self {
            client_order_id: Uuid::new_v4(),
            account: account.into(),
            symbol: symbol.into(),
            side: Side::Sell,
            quantity,
            limit_price: None,
        }
    }
}

/// 주문 게이트웨이 (브로커 연결).
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// 게이트웨이 이름 (로그용)
    fn name(&self) -> &str;

    /// 최근 체결가를 조회합니다.
    async fn last_price(&self, symbol: &str) -> ExecutionResult<Decimal>;

    /// 주문을 제출하고 브로커 주문 ID를 반환합니다.
    async fn submit(&self, request: &OrderRequest) -> ExecutionResult<String>;
}

/// 제출된 주문.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub request: OrderRequest,
    pub broker_order_id: String,
}

/// 주문 의도 하나의 처리 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentOutcome {
    pub symbol: String,
    pub side: Side,
    /// 요청 수량
    pub requested: Decimal,
    /// 모든 계좌에 제출 완료된 수량
    pub placed: Decimal,
    /// 실패 사유 (있으면 남은 수량은 포기됨)
    pub error: Option<String>,
}

impl IntentOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && self.placed == self.requested
    }
}

/// 실행 결과 보고서.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub outcomes: Vec<IntentOutcome>,
    pub orders: Vec<PlacedOrder>,
}

impl ExecutionReport {
    /// 완전히 처리된 의도 수
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_complete()).count()
    }

    /// 실패한 의도 수
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }
}

/// 주문 의도 실행 어댑터.
///
/// 시뮬레이션 상태와 분리되어 있으므로 주문 실패가 백테스트 결과에 영향을 주지 않습니다.
pub struct ExecutionAdapter {
    gateway: Arc<dyn OrderGateway>,
    config: ExecutionConfig,
    buy_limit_offset: Decimal,
}

impl ExecutionAdapter {
    pub fn new(gateway: Arc<dyn OrderGateway>, config: ExecutionConfig) -> ExecutionResult<Self> {
        config
            .validate()
            .map_err(|e| ExecutionError::Config(e.to_string()))?;
        let buy_limit_offset = Decimal::from_f64(config.buy_limit_offset).ok_or_else(|| {
            ExecutionError::Config(format!(
                "buy_limit_offset {} is not representable",
                config.buy_limit_offset
            ))
        })?;

        Ok(Self {
            gateway,
            config,
            buy_limit_offset,
        })
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// 의도별 주문 수량.
    pub fn quantity_for(&self, intent: &OrderIntent) -> ExecutionResult<Decimal> {
        let quantity = match self.config.quantity_mode {
            QuantityMode::Fixed => Decimal::from(self.config.fixed_quantity),
            QuantityMode::Position => Decimal::from_f64(intent.units)
                .map(|units| units.floor())
                .ok_or_else(|| {
                    ExecutionError::InvalidQuantity(format!("units {} for {}", intent.units, intent.symbol))
                })?,
        };

        if quantity <= Decimal::ZERO {
            return Err(ExecutionError::InvalidQuantity(format!(
                "{} {} resolves to {}",
                intent.side, intent.symbol, quantity
            )));
        }
        Ok(quantity)
    }

    fn chunk_cap(&self, side: Side) -> Decimal {
        match side {
            Side::Buy => Decimal::from(self.config.buy_chunk_cap),
            Side::Sell => Decimal::from(self.config.sell_chunk_cap),
        }
    }

    /// 주문 의도를 순서대로 실행합니다.
    pub async fn execute(&self, intents: &[OrderIntent]) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        info!(
            gateway = self.gateway.name(),
            intents = intents.len(),
            accounts = self.config.accounts.len(),
            "주문 실행 시작"
        );

        for intent in intents {
            let outcome = self.execute_intent(intent, &mut report.orders).await;
            report.outcomes.push(outcome);
        }

        info!(
            completed = report.completed(),
            failed = report.failed(),
            orders = report.orders.len(),
            "주문 실행 완료"
        );
        report
    }

    async fn execute_intent(&self, intent: &OrderIntent, orders: &mut Vec<PlacedOrder>) -> IntentOutcome {
        let mut outcome = IntentOutcome {
            symbol: intent.symbol.clone(),
            side: intent.side,
            requested: Decimal::ZERO,
            placed: Decimal::ZERO,
            error: None,
        };

        let quantity = match self.quantity_for(intent) {
            Ok(q) => q,
            Err(e) => {
                warn!(symbol = %intent.symbol, side = %intent.side, error = %e, "주문 수량 계산 실패");
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };
        outcome.requested = quantity;

        let limit_price = match intent.side {
            Side::Buy => match self.gateway.last_price(&intent.symbol).await {
                Ok(price) => Some(price + self.buy_limit_offset),
                Err(e) => {
                    error!(symbol = %intent.symbol, error = %e, "현재가 조회 실패, 매수 주문 포기");
                    outcome.error = Some(e.to_string());
                    return outcome;
                }
            },
            Side::Sell => None,
        };

        let cap = self.chunk_cap(intent.side);
        let mut remaining = quantity;

        'chunks: while remaining > Decimal::ZERO {
            let chunk = remaining.min(cap);

            for account in &self.config.accounts {
                let request = match limit_price {
                    Some(price) => OrderRequest::limit_buy(account, &intent.symbol, chunk, price),
                    None => OrderRequest::market_sell(account, &intent.symbol, chunk),
                };

                match self.gateway.submit(&request).await {
                    Ok(broker_order_id) => {
                        debug!(
                            symbol = %request.symbol,
                            side = %request.side,
                            account = %request.account,
                            quantity = %request.quantity,
                            broker_order_id = %broker_order_id,
                            "주문 제출"
                        );
                        orders.push(PlacedOrder {
                            request,
                            broker_order_id,
                        });
                    }
                    Err(e) => {
                        error!(
                            symbol = %intent.symbol,
                            side = %intent.side,
                            account = %account,
                            quantity = %chunk,
                            error = %e,
                            "주문 제출 실패, 남은 수량 포기"
                        );
                        outcome.error = Some(e.to_string());
                        break 'chunks;
                    }
                }
            }

            remaining -= chunk;
            outcome.placed += chunk;
        }

        info!(
            symbol = %intent.symbol,
            side = %intent.side,
            placed = %outcome.placed,
            requested = %outcome.requested,
            "주문 의도 처리"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::PaperGateway;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn intent(side: Side, units: f64) -> OrderIntent {
        OrderIntent {
            symbol: "AAPL".to_string(),
            side,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            units,
            price: 185.0,
        }
    }

    fn config(mode: QuantityMode, accounts: &[&str]) -> ExecutionConfig {
        ExecutionConfig {
            enabled: true,
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            quantity_mode: mode,
            ..ExecutionConfig::default()
        }
    }

    fn adapter(gateway: &Arc<PaperGateway>, config: ExecutionConfig) -> ExecutionAdapter {
        let gateway: Arc<dyn OrderGateway> = gateway.clone();
        ExecutionAdapter::new(gateway, config).unwrap()
    }

    #[tokio::test]
    async fn test_fixed_quantity_buy_fans_out_to_accounts() {
        let gateway = Arc::new(PaperGateway::new().with_price("AAPL", dec!(185)));
        let adapter = adapter(&gateway, config(QuantityMode::Fixed, &["org-1", "org-2"]));

        let report = adapter.execute(&[intent(Side::Buy, 540.5)]).await;

        assert_eq!(report.completed(), 1);
        assert_eq!(report.orders.len(), 2);
        for order in &report.orders {
            assert_eq!(order.request.quantity, dec!(1));
            assert_eq!(order.request.limit_price, Some(dec!(190)));
        }
        let accounts: Vec<_> = report.orders.iter().map(|o| o.request.account.as_str()).collect();
        assert_eq!(accounts, vec!["org-1", "org-2"]);
    }

    #[tokio::test]
    async fn test_position_quantity_sell_is_chunked() {
        let gateway = Arc::new(PaperGateway::new());
        let adapter = adapter(&gateway, config(QuantityMode::Position, &["org-1"]));

        let report = adapter.execute(&[intent(Side::Sell, 1234.7)]).await;

        let quantities: Vec<_> = report.orders.iter().map(|o| o.request.quantity).collect();
        assert_eq!(quantities, vec![dec!(500), dec!(500), dec!(234)]);
        assert!(report.orders.iter().all(|o| o.request.limit_price.is_none()));
        assert_eq!(report.outcomes[0].placed, dec!(1234));
    }

    #[tokio::test]
    async fn test_buy_chunks_use_buy_cap() {
        let gateway = Arc::new(PaperGateway::new().with_price("AAPL", dec!(10)));
        let adapter = adapter(&gateway, config(QuantityMode::Position, &["org-1"]));

        let report = adapter.execute(&[intent(Side::Buy, 25_000.0)]).await;

        let quantities: Vec<_> = report.orders.iter().map(|o| o.request.quantity).collect();
        assert_eq!(quantities, vec![dec!(10000), dec!(10000), dec!(5000)]);
    }

    #[tokio::test]
    async fn test_failure_abandons_remaining_chunks_only() {
        let gateway = Arc::new(PaperGateway::new().with_price("AAPL", dec!(10)).fail_after(1));
        let adapter = adapter(&gateway, config(QuantityMode::Position, &["org-1"]));

        let report = adapter
            .execute(&[intent(Side::Buy, 25_000.0), intent(Side::Sell, 100.0)])
            .await;

        assert_eq!(report.orders.len(), 1);
        assert_eq!(report.outcomes[0].placed, dec!(10000));
        assert!(report.outcomes[0].error.is_some());
        // 다음 의도는 계속 시도됨
        assert_eq!(report.outcomes.len(), 2);
        assert!(report.outcomes[1].error.is_some());
        assert_eq!(report.failed(), 2);
    }

    #[tokio::test]
    async fn test_missing_price_skips_buy_but_not_sell() {
        let gateway = Arc::new(PaperGateway::new());
        let adapter = adapter(&gateway, config(QuantityMode::Fixed, &["org-1"]));

        let report = adapter
            .execute(&[intent(Side::Buy, 10.0), intent(Side::Sell, 10.0)])
            .await;

        assert!(report.outcomes[0].error.is_some());
        assert!(report.outcomes[1].is_complete());
        assert_eq!(report.orders.len(), 1);
        assert_eq!(report.orders[0].request.side, Side::Sell);
    }

    #[tokio::test]
    async fn test_fractional_position_is_invalid_quantity() {
        let gateway = Arc::new(PaperGateway::new());
        let adapter = adapter(&gateway, config(QuantityMode::Position, &["org-1"]));

        let report = adapter.execute(&[intent(Side::Sell, 0.4)]).await;
        assert!(report.orders.is_empty());
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("Invalid quantity")));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let gateway: Arc<dyn OrderGateway> = Arc::new(PaperGateway::new());
        let mut cfg = ExecutionConfig::default();
        cfg.accounts.clear();
        assert!(matches!(
            ExecutionAdapter::new(gateway, cfg),
            Err(ExecutionError::Config(_))
        ));
    }
}
