mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use gatecheck_api::tickets::{
    CasResult, InMemoryTicketRepository, RepositoryError, Ticket, TicketRepository, TicketStatus,
};
use gatecheck_api::verify::{AllowAll, ScanOutcome, VerificationController, VerifierAccess};

use common::{controller_with, success_ticket, used_ticket};

#[tokio::test]
async fn success_ticket_is_found_and_admittable() {
    let repo = Arc::new(InMemoryTicketRepository::with_tickets([success_ticket(
        "TEST-100", 2,
    )]));
    let controller = controller_with(repo);

    match controller.verify("TEST-100").await {
        ScanOutcome::Found { ticket, admittable } => {
            assert!(admittable);
            assert_eq!(ticket.reference, "TEST-100");
            assert_eq!(ticket.quantity, 2);
        }
        other => panic!("expected Found, got {:?}", other),
    }
}

#[tokio::test]
async fn non_success_statuses_are_found_but_not_admittable() {
    for status in [
        TicketStatus::Pending,
        TicketStatus::Failed,
        TicketStatus::Cancelled,
    ] {
        let repo = Arc::new(InMemoryTicketRepository::with_tickets([Ticket::new(
            "T-1", status, 1,
        )]));
        let controller = controller_with(repo);

        match controller.verify("T-1").await {
            ScanOutcome::Found { ticket, admittable } => {
                assert!(!admittable, "status {} must not be admittable", status);
                // Raw status surfaced verbatim for the operator's judgment call
                assert_eq!(ticket.status, status);
            }
            other => panic!("expected Found for {}, got {:?}", status, other),
        }
    }
}

#[tokio::test]
async fn used_ticket_reports_already_used() {
    let repo = Arc::new(InMemoryTicketRepository::with_tickets([used_ticket(
        "T-1", "op1",
    )]));
    let controller = controller_with(repo);

    match controller.verify("T-1").await {
        ScanOutcome::AlreadyUsed { ticket } => {
            assert_eq!(ticket.verified_by.as_deref(), Some("op1"));
        }
        other => panic!("expected AlreadyUsed, got {:?}", other),
    }
}

#[tokio::test]
async fn ghost_reference_is_not_found_and_writes_nothing() {
    let repo = Arc::new(InMemoryTicketRepository::new());
    let controller = controller_with(repo.clone());

    let outcome = controller.verify(r#"{"tx_ref":"GHOST-1"}"#).await;
    assert_eq!(outcome, ScanOutcome::NotFound);
    assert!(repo.get("GHOST-1").await.is_none());
}

#[tokio::test]
async fn malformed_payload_never_reaches_the_repository() {
    let repo = Arc::new(InMemoryTicketRepository::new());
    let controller = controller_with(repo.clone());

    assert_eq!(controller.verify("{}").await, ScanOutcome::Malformed);
    assert_eq!(controller.verify("").await, ScanOutcome::Malformed);
    assert_eq!(repo.lookup_count(), 0);
}

#[tokio::test]
async fn backend_fault_is_lookup_failed_and_retry_succeeds() {
    let repo = Arc::new(InMemoryTicketRepository::with_tickets([success_ticket(
        "T-1", 1,
    )]));
    let controller = controller_with(repo.clone());

    repo.set_offline(true);
    assert_eq!(controller.verify("T-1").await, ScanOutcome::LookupFailed);

    // Retryable: same payload, backend back up
    repo.set_offline(false);
    assert!(matches!(
        controller.verify("T-1").await,
        ScanOutcome::Found { .. }
    ));
}

/// Repository whose calls never resolve, for exercising the bounded
/// operator-visible timeout.
struct HangingRepository;

#[async_trait]
impl TicketRepository for HangingRepository {
    async fn find_by_reference(&self, _reference: &str) -> Result<Option<Ticket>, RepositoryError> {
        std::future::pending().await
    }

    async fn compare_and_set_used(
        &self,
        _reference: &str,
        _operator: &str,
    ) -> Result<CasResult, RepositoryError> {
        std::future::pending().await
    }

    async fn count_used_by(&self, _operator: &str) -> Result<i64, RepositoryError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn hung_backend_surfaces_timeouts_instead_of_blocking() {
    let access = VerifierAccess::new(Arc::new(AllowAll), Duration::from_secs(60));
    let controller = VerificationController::new(Arc::new(HangingRepository), access)
        .with_timeouts(Duration::from_millis(50), Duration::from_millis(50));

    assert_eq!(controller.verify("T-1").await, ScanOutcome::LookupFailed);
    assert_eq!(controller.admit("T-1", "op1").await, ScanOutcome::AdmitFailed);
}
