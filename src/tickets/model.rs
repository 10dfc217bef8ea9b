use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Ticket lifecycle state. The purchase flow creates tickets in one of the
/// first four states; this service only ever performs the single permitted
/// transition `success -> used`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
pub enum TicketStatus {
    Pending,
    Success,
    Failed,
    Cancelled,
    Used,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Success => "success",
            TicketStatus::Failed => "failed",
            TicketStatus::Cancelled => "cancelled",
            TicketStatus::Used => "used",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One admission credential. `reference` is the transaction reference used
/// as the lookup key; `verified_at`/`verified_by` are set exactly once,
/// together with the transition to `used`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub reference: String,
    pub status: TicketStatus,
    pub quantity: i32,
    pub holder_name: Option<String>,
    pub holder_email: Option<String>,
    pub holder_phone: Option<String>,
    pub event_label: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Minimal constructor for seeding and fixtures; holder and event fields
    /// start empty.
    pub fn new(reference: impl Into<String>, status: TicketStatus, quantity: i32) -> Self {
        let now = Utc::now();
        Self {
            reference: reference.into(),
            status,
            quantity,
            holder_name: None,
            holder_email: None,
            holder_phone: None,
            event_label: None,
            verified_at: None,
            verified_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only `success` tickets may be admitted; everything else is surfaced
    /// to the operator with its raw status and no admit affordance.
    pub fn is_admittable(&self) -> bool {
        self.status == TicketStatus::Success
    }
}
