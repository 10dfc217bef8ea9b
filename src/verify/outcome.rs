use serde::Serialize;

use crate::tickets::Ticket;

/// The single result contract exposed to presenters: every verification or
/// admission cycle resolves to exactly one of these seven variants, and
/// nothing else crosses the boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// Extractor could not produce a non-empty reference. The cycle consumed
    /// no repository call.
    Malformed,
    /// Reference is well-formed but matches no ticket. A normal end state;
    /// scans of foreign codes are expected.
    NotFound,
    /// Ticket located. `admittable` is true only for `success` tickets; any
    /// other status is shown verbatim with no admit affordance.
    Found { ticket: Ticket, admittable: bool },
    /// Ticket is past its single permitted transition, whether that happened
    /// before this cycle or in a concurrent admit that won the race.
    AlreadyUsed { ticket: Ticket },
    /// Transport/backend fault during lookup. Retryable with the same payload.
    LookupFailed,
    /// This call performed the `success -> used` transition.
    Admitted { ticket: Ticket },
    /// Transport/backend fault during admit. Retryable; no local mutation
    /// was performed, and a retry against an already-used ticket resolves to
    /// `AlreadyUsed`, never a double admission.
    AdmitFailed,
}

impl ScanOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Malformed => "malformed",
            ScanOutcome::NotFound => "not_found",
            ScanOutcome::Found { .. } => "found",
            ScanOutcome::AlreadyUsed { .. } => "already_used",
            ScanOutcome::LookupFailed => "lookup_failed",
            ScanOutcome::Admitted { .. } => "admitted",
            ScanOutcome::AdmitFailed => "admit_failed",
        }
    }

    /// Retryable outcomes are transport faults; re-invoking with the same
    /// input is always safe.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScanOutcome::LookupFailed | ScanOutcome::AdmitFailed)
    }

    /// Dispatch to a presenter. The match is exhaustive with no default arm,
    /// so a presenter missing a variant is a compile error rather than a
    /// silent fallthrough.
    pub fn present<P: OutcomePresenter>(&self, presenter: &mut P) {
        match self {
            ScanOutcome::Malformed => presenter.malformed(),
            ScanOutcome::NotFound => presenter.not_found(),
            ScanOutcome::Found { ticket, admittable } => presenter.found(ticket, *admittable),
            ScanOutcome::AlreadyUsed { ticket } => presenter.already_used(ticket),
            ScanOutcome::LookupFailed => presenter.lookup_failed(),
            ScanOutcome::Admitted { ticket } => presenter.admitted(ticket),
            ScanOutcome::AdmitFailed => presenter.admit_failed(),
        }
    }
}

/// Rendering contract for UIs. One required method per outcome variant.
pub trait OutcomePresenter {
    fn malformed(&mut self);
    fn not_found(&mut self);
    fn found(&mut self, ticket: &Ticket, admittable: bool);
    fn already_used(&mut self, ticket: &Ticket);
    fn lookup_failed(&mut self);
    fn admitted(&mut self, ticket: &Ticket);
    fn admit_failed(&mut self);
}
