use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::Mutex;

use async_trait::async_trait;

use super::model::{Ticket, TicketStatus};
use super::repository::{CasResult, RepositoryError, TicketRepository};

/// In-memory ticket store. Backs local development and every test that does
/// not want a live database. The compare-and-set runs entirely under one
/// mutex guard, giving the same atomicity the Postgres conditional UPDATE
/// provides.
#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: Mutex<HashMap<String, Ticket>>,
    offline: AtomicBool,
    lookups: AtomicU64,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tickets(tickets: impl IntoIterator<Item = Ticket>) -> Self {
        let map = tickets
            .into_iter()
            .map(|t| (t.reference.clone(), t))
            .collect();
        Self {
            tickets: Mutex::new(map),
            ..Self::default()
        }
    }

    pub async fn insert(&self, ticket: Ticket) {
        self.tickets
            .lock()
            .await
            .insert(ticket.reference.clone(), ticket);
    }

    /// Snapshot of a stored ticket, for assertions.
    pub async fn get(&self, reference: &str) -> Option<Ticket> {
        self.tickets.lock().await.get(reference).cloned()
    }

    /// Simulate a backend/network fault: while offline, every operation
    /// returns `RepositoryError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of lookups served. Lets tests assert that malformed payloads
    /// never reach the repository.
    pub fn lookup_count(&self) -> u64 {
        self.lookups.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(RepositoryError::Unavailable(
                "in-memory store is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn find_by_reference(&self, reference: &str) -> Result<Option<Ticket>, RepositoryError> {
        self.check_online()?;
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.tickets.lock().await.get(reference).cloned())
    }

    async fn compare_and_set_used(
        &self,
        reference: &str,
        operator: &str,
    ) -> Result<CasResult, RepositoryError> {
        self.check_online()?;

        // Precondition check and write happen under the same guard.
        let mut tickets = self.tickets.lock().await;
        match tickets.get_mut(reference) {
            None => Ok(CasResult::Missing),
            Some(ticket) if ticket.status == TicketStatus::Success => {
                let now = Utc::now();
                ticket.status = TicketStatus::Used;
                ticket.verified_at = Some(now);
                ticket.verified_by = Some(operator.to_string());
                ticket.updated_at = now;
                Ok(CasResult::Applied(ticket.clone()))
            }
            Some(ticket) => Ok(CasResult::PreconditionFailed(ticket.clone())),
        }
    }

    async fn count_used_by(&self, operator: &str) -> Result<i64, RepositoryError> {
        self.check_online()?;
        let tickets = self.tickets.lock().await;
        let count = tickets
            .values()
            .filter(|t| t.status == TicketStatus::Used && t.verified_by.as_deref() == Some(operator))
            .count();
        Ok(count as i64)
    }
}
