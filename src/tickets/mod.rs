pub mod memory;
pub mod model;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryTicketRepository;
pub use model::{Ticket, TicketStatus};
pub use postgres::PgTicketRepository;
pub use repository::{CasResult, RepositoryError, TicketRepository};
