use bigdecimal::BigDecimal;
use payment_service::terminal::{
    AuthorizationStatus, CardMethod, CardPaymentRequest, PaymentTerminal, SimulatedTerminal, TerminalError,
};
use std::str::FromStr;
use std::time::Duration;

fn card(order_id: &str, amount: &str) -> CardPaymentRequest {
    CardPaymentRequest {
        order_id: order_id.into(),
        amount: BigDecimal::from_str(amount).unwrap(),
        method: CardMethod::Credit,
        installments: 1,
    }
}

#[tokio::test]
async fn approves_and_assigns_increasing_nsu() {
    let terminal = SimulatedTerminal::new();
    let first = terminal.authorize(&card("ORDER-0001-XYZ", "19.9")).await.unwrap();
    let second = terminal.authorize(&card("ORDER-0002", "5")).await.unwrap();
    assert_eq!(first.status, AuthorizationStatus::Approved);
    assert_eq!(first.approval_code.as_deref(), Some("SIM-ORDER-00"));
    assert_eq!(first.amount, "19.90");
    assert_eq!(first.nsu, "000001");
    assert_eq!(second.nsu, "000002");
}

#[tokio::test]
async fn declines_above_limit() {
    let terminal = SimulatedTerminal::with_settings(Duration::ZERO, Some(BigDecimal::from_str("100").unwrap()));
    let receipt = terminal.authorize(&card("ORDER-9", "100.01")).await.unwrap();
    assert_eq!(receipt.status, AuthorizationStatus::Declined);
    assert!(receipt.approval_code.is_none());
    // Declined transactions cannot be voided.
    assert_eq!(terminal.void(&receipt.nsu).await.unwrap(), None);

    let at_limit = terminal.authorize(&card("ORDER-10", "100.00")).await.unwrap();
    assert_eq!(at_limit.status, AuthorizationStatus::Approved);
}

#[tokio::test]
async fn rejects_invalid_requests() {
    let terminal = SimulatedTerminal::new();
    let zero = terminal.authorize(&card("ORDER-1", "0.00")).await;
    assert!(matches!(zero, Err(TerminalError::InvalidRequest(_))));

    let mut debit = card("ORDER-2", "50");
    debit.method = CardMethod::Debit;
    debit.installments = 3;
    assert!(matches!(terminal.authorize(&debit).await, Err(TerminalError::InvalidRequest(_))));

    let mut too_many = card("ORDER-3", "50");
    too_many.installments = 13;
    assert!(matches!(terminal.authorize(&too_many).await, Err(TerminalError::InvalidRequest(_))));
}

#[tokio::test]
async fn void_is_single_use() {
    let terminal = SimulatedTerminal::new();
    let receipt = terminal.authorize(&card("ORDER-7", "12.00")).await.unwrap();
    assert_eq!(terminal.void(&receipt.nsu).await.unwrap(), Some(format!("{}-void", receipt.nsu)));
    assert_eq!(terminal.void(&receipt.nsu).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn latency_is_simulated() {
    let terminal = SimulatedTerminal::with_settings(Duration::from_secs(2), None);
    let started = tokio::time::Instant::now();
    terminal.authorize(&card("ORDER-8", "1.00")).await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(2));
}
