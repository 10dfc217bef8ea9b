use async_trait::async_trait;
use thiserror::Error;

use super::model::Ticket;

/// Errors from the ticket store
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Result of the conditional "flip to used" write.
#[derive(Debug, Clone)]
pub enum CasResult {
    /// Precondition held; this call performed the transition.
    Applied(Ticket),
    /// Precondition failed; carries the ticket as currently stored so the
    /// caller can report who already admitted it.
    PreconditionFailed(Ticket),
    /// No ticket under that reference.
    Missing,
}

/// Storage contract the verification controller depends on. Implementations
/// must make `compare_and_set_used` a single atomic conditional write: two
/// concurrent calls for the same reference must resolve to exactly one
/// `Applied` and one `PreconditionFailed`, never two `Applied`.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Ticket>, RepositoryError>;

    /// Set status to `used` with `verified_at = now`, `verified_by = operator`,
    /// only if the current status is `success`.
    async fn compare_and_set_used(
        &self,
        reference: &str,
        operator: &str,
    ) -> Result<CasResult, RepositoryError>;

    /// Running tally of tickets this operator has admitted. Display-only;
    /// no correctness dependency.
    async fn count_used_by(&self, operator: &str) -> Result<i64, RepositoryError>;
}
