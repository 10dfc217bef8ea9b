use async_trait::async_trait;
use sqlx::PgPool;

use super::model::Ticket;
use super::repository::{CasResult, RepositoryError, TicketRepository};

const TICKET_COLUMNS: &str = "reference, status, quantity, holder_name, holder_email, \
     holder_phone, event_label, verified_at, verified_by, created_at, updated_at";

/// Postgres-backed ticket store. The admit path is a single conditional
/// UPDATE with a status precondition; the database arbitrates concurrent
/// admits for the same reference.
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Ticket>, RepositoryError> {
        let sql = format!("SELECT {} FROM tickets WHERE reference = $1", TICKET_COLUMNS);

        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ticket)
    }

    async fn compare_and_set_used(
        &self,
        reference: &str,
        operator: &str,
    ) -> Result<CasResult, RepositoryError> {
        let sql = format!(
            "UPDATE tickets \
             SET status = 'used', verified_at = now(), verified_by = $2, updated_at = now() \
             WHERE reference = $1 AND status = 'success' \
             RETURNING {}",
            TICKET_COLUMNS
        );

        let updated = sqlx::query_as::<_, Ticket>(&sql)
            .bind(reference)
            .bind(operator)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(ticket) = updated {
            return Ok(CasResult::Applied(ticket));
        }

        // Zero rows affected: classify as a lost precondition or a missing
        // ticket. This read is informational only; the decision was already
        // made by the conditional write above.
        match self.find_by_reference(reference).await? {
            Some(ticket) => Ok(CasResult::PreconditionFailed(ticket)),
            None => Ok(CasResult::Missing),
        }
    }

    async fn count_used_by(&self, operator: &str) -> Result<i64, RepositoryError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tickets WHERE status = 'used' AND verified_by = $1",
        )
        .bind(operator)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
