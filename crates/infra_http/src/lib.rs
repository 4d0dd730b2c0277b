//! HTTP adapters for the remote ledger and directory services
//!
//! This crate is the only place HTTP exists. It implements the port traits
//! declared by the domain crates over `reqwest`:
//!
//! - [`adapters::HttpLedger`] — the receipt/payment lifecycle
//! - [`adapters::HttpDirectory`] — tenant users and mailboxes
//!
//! Shared plumbing: a bearer [`session::SessionStore`] with proactive JWT
//! expiry detection, response-status mapping onto `PortError`, backend
//! error-envelope probing, and per-operation in-flight guards for the
//! non-idempotent endpoints. There is no retry or backoff machinery
//! anywhere; each request is submitted exactly once.

pub mod adapters;
pub mod config;
pub mod dto;
pub mod envelope;
pub mod guard;
pub mod session;
pub mod transport;

pub use adapters::{HttpDirectory, HttpLedger};
pub use config::HttpConfig;
pub use guard::InFlightGuard;
pub use session::{Session, SessionStore};
pub use transport::Transport;
