//! 메모리 기반 모의 주문 게이트웨이.
//!
//! 실제 브로커 없이 주문 흐름을 검증하기 위한 게이트웨이입니다.
//! dry-run 실행과 테스트에서 사용합니다.
//!
//! # 예제
//!
//! ```rust,ignore
//! use edge_execution::{ExecutionAdapter, PaperGateway};
//!
//! let gateway = Arc::new(PaperGateway::new().with_price("AAPL", dec!(185)));
//! let adapter = ExecutionAdapter::new(gateway.clone(), config.execution.clone())?;
//! adapter.execute(&outcome.intents).await;
//!
//! println!("제출된 주문: {}", gateway.orders().await.len());
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use crate::executor::{ExecutionError, ExecutionResult, OrderGateway, OrderRequest};

/// 모의 주문 게이트웨이.
#[derive(Debug, Default)]
pub struct PaperGateway {
    /// 종목별 현재가
    prices: RwLock<HashMap<String, Decimal>>,
    /// 접수된 주문
    orders: RwLock<Vec<OrderRequest>>,
    /// 제출 시도 횟수
    attempts: AtomicUsize,
    /// 이 횟수만큼 성공한 뒤 모든 제출 실패
    fail_after: Option<usize>,
    /// 항상 거부되는 계좌
    rejected_accounts: Vec<String>,
}

impl PaperGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목 현재가를 지정합니다.
    pub fn with_price(mut self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.prices.get_mut().insert(symbol.into(), price);
        self
    }

    /// `n`번 성공한 뒤부터 제출을 실패시킵니다.
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// 특정 계좌의 주문을 거부합니다.
    pub fn reject_account(mut self, account: impl Into<String>) -> Self {
        self.rejected_accounts.push(account.into());
        self
    }

    /// 현재가를 갱신합니다.
    pub async fn set_price(&self, symbol: impl Into<String>, price: Decimal) {
        self.prices.write().await.insert(symbol.into(), price);
    }

    /// 접수된 주문 목록.
    pub async fn orders(&self) -> Vec<OrderRequest> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderGateway for PaperGateway {
    fn name(&self) -> &str {
        "paper"
    }

    async fn last_price(&self, symbol: &str) -> ExecutionResult<Decimal> {
        self.prices
            .read()
            .await
            .get(symbol)
            .copied()
            .ok_or_else(|| ExecutionError::NotFound(symbol.to_string()))
    }

    async fn submit(&self, request: &OrderRequest) -> ExecutionResult<String> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail_after.is_some_and(|n| attempt >= n) {
            return Err(ExecutionError::Gateway(format!(
                "simulated failure on attempt {}",
                attempt + 1
            )));
        }
        if self.rejected_accounts.contains(&request.account) {
            return Err(ExecutionError::Rejected(format!(
                "account {} is not allowed",
                request.account
            )));
        }

        let mut orders = self.orders.write().await;
        orders.push(request.clone());
        let id = format!("PAPER-{:06}", orders.len());

        debug!(order_id = %id, symbol = %request.symbol, side = %request.side, "모의 주문 접수");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_records_orders() {
        let gateway = PaperGateway::new();
        let request = OrderRequest::market_sell("org-1", "AAPL", dec!(5));

        let id = gateway.submit(&request).await.unwrap();
        assert_eq!(id, "PAPER-000001");
        assert_eq!(gateway.orders().await, vec![request]);
    }

    #[tokio::test]
    async fn test_price_lookup() {
        let gateway = PaperGateway::new().with_price("AAPL", dec!(185.5));
        assert_eq!(gateway.last_price("AAPL").await.unwrap(), dec!(185.5));
        assert!(matches!(
            gateway.last_price("MSFT").await,
            Err(ExecutionError::NotFound(_))
        ));

        gateway.set_price("MSFT", dec!(410)).await;
        assert_eq!(gateway.last_price("MSFT").await.unwrap(), dec!(410));
    }

    #[tokio::test]
    async fn test_rejected_account() {
        let gateway = PaperGateway::new().reject_account("blocked");
        let request = OrderRequest::market_sell("blocked", "AAPL", dec!(1));
        assert!(matches!(
            gateway.submit(&request).await,
            Err(ExecutionError::Rejected(_))
        ));
        assert!(gateway.orders().await.is_empty());
    }
}
