use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::scan::camera::{CameraSession, ScanEvent};
use crate::scan::device::CameraError;
use crate::scan::extractor::extract_reference;
use crate::tickets::{CasResult, TicketRepository, TicketStatus};

use super::access::VerifierAccess;
use super::outcome::ScanOutcome;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// One decode event. Exists only for the duration of a cycle; logged when
/// the outcome is decided, then discarded.
#[derive(Debug)]
struct ScanAttempt {
    raw: String,
    reference: Option<String>,
    at: DateTime<Utc>,
    resolution: &'static str,
}

impl ScanAttempt {
    fn log(&self) {
        info!(
            raw = %self.raw,
            reference = self.reference.as_deref().unwrap_or("-"),
            at = %self.at,
            resolution = self.resolution,
            "scan attempt"
        );
    }
}

/// Drives one verification cycle to completion: payload -> extraction ->
/// lookup -> (operator action) -> admit. Every fault is recovered into the
/// seven-way [`ScanOutcome`]; nothing else reaches the presenter.
///
/// The at-most-once admission guarantee is enforced at the data layer by the
/// repository's compare-and-set; the controller never assumes its own lookup
/// is still current and re-validates every admit through that conditional
/// write. Within one cycle the flow is linear: `verify` always completes
/// before an admit is offered.
pub struct VerificationController {
    repo: Arc<dyn TicketRepository>,
    access: VerifierAccess,
    lookup_timeout: Duration,
    admit_timeout: Duration,
}

impl VerificationController {
    pub fn new(repo: Arc<dyn TicketRepository>, access: VerifierAccess) -> Self {
        Self {
            repo,
            access,
            lookup_timeout: DEFAULT_CALL_TIMEOUT,
            admit_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, lookup: Duration, admit: Duration) -> Self {
        self.lookup_timeout = lookup;
        self.admit_timeout = admit;
        self
    }

    /// Ask the injected access capability whether this operator may verify.
    pub async fn authorize(
        &self,
        operator: &str,
    ) -> Result<bool, crate::tickets::RepositoryError> {
        self.access.can_verify(operator).await
    }

    /// Resolve a raw scan payload into an outcome. Read-only: no repository
    /// write happens here, so retrying with the same payload is always safe.
    pub async fn verify(&self, raw: &str) -> ScanOutcome {
        let mut attempt = ScanAttempt {
            raw: raw.to_string(),
            reference: None,
            at: Utc::now(),
            resolution: "malformed",
        };

        let reference = match extract_reference(raw) {
            Ok(reference) => reference,
            Err(_) => {
                // Halt before any repository call.
                attempt.log();
                return ScanOutcome::Malformed;
            }
        };
        attempt.reference = Some(reference.clone());

        let lookup = timeout(self.lookup_timeout, self.repo.find_by_reference(&reference)).await;
        let outcome = match lookup {
            Err(_) => {
                warn!(%reference, "ticket lookup timed out");
                attempt.resolution = "lookup-failed";
                ScanOutcome::LookupFailed
            }
            Ok(Err(err)) => {
                warn!(%reference, error = %err, "ticket lookup failed");
                attempt.resolution = "lookup-failed";
                ScanOutcome::LookupFailed
            }
            Ok(Ok(None)) => {
                attempt.resolution = "not-found";
                ScanOutcome::NotFound
            }
            Ok(Ok(Some(ticket))) => {
                attempt.resolution = "matched";
                if ticket.status == TicketStatus::Used {
                    ScanOutcome::AlreadyUsed { ticket }
                } else {
                    let admittable = ticket.is_admittable();
                    ScanOutcome::Found { ticket, admittable }
                }
            }
        };

        attempt.log();
        outcome
    }

    /// Perform the single permitted transition through the repository's
    /// conditional write. Losing a race is reported exactly like scanning a
    /// previously used ticket; the losing side never sees a generic error.
    pub async fn admit(&self, reference: &str, operator: &str) -> ScanOutcome {
        let write = timeout(
            self.admit_timeout,
            self.repo.compare_and_set_used(reference, operator),
        )
        .await;

        match write {
            Err(_) => {
                warn!(%reference, "admit timed out");
                ScanOutcome::AdmitFailed
            }
            Ok(Err(err)) => {
                warn!(%reference, error = %err, "admit failed");
                ScanOutcome::AdmitFailed
            }
            Ok(Ok(CasResult::Applied(ticket))) => {
                info!(%reference, operator, quantity = ticket.quantity, "ticket admitted");
                ScanOutcome::Admitted { ticket }
            }
            Ok(Ok(CasResult::PreconditionFailed(ticket))) => {
                info!(
                    %reference,
                    status = ticket.status.as_str(),
                    verified_by = ticket.verified_by.as_deref().unwrap_or("-"),
                    "admit lost precondition"
                );
                ScanOutcome::AlreadyUsed { ticket }
            }
            Ok(Ok(CasResult::Missing)) => ScanOutcome::NotFound,
        }
    }

    /// Drive one camera-sourced cycle: start the session, take its first
    /// candidate payload, stop the session and verify the payload. Camera
    /// faults stay camera faults; they are surfaced before a cycle has an
    /// outcome and are never folded into the seven-way contract.
    pub async fn run_cycle(
        &self,
        session: &mut CameraSession,
        events: &mut mpsc::Receiver<ScanEvent>,
    ) -> Result<ScanOutcome, CameraError> {
        session.start().await?;

        let event = match events.recv().await {
            Some(event) => event,
            None => {
                session.stop().await;
                return Err(CameraError::Device("scan channel closed".to_string()));
            }
        };
        session.stop().await;

        match event {
            ScanEvent::Payload(raw) => Ok(self.verify(&raw).await),
            ScanEvent::Failed(err) => Err(err),
        }
    }

    /// Operator's running admission tally, for the stats display.
    pub async fn used_count(
        &self,
        operator: &str,
    ) -> Result<i64, crate::tickets::RepositoryError> {
        self.repo.count_used_by(operator).await
    }
}
