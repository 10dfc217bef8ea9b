pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod scan;
pub mod tickets;
pub mod verify;
