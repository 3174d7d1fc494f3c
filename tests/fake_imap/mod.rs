//! Fake IMAP server for integration testing
//!
//! This module provides an in-process IMAP server that speaks enough
//! of the protocol to run a quota check end-to-end:
//!
//! TCP -> (TLS | greeting -> STARTTLS -> TLS) -> LOGIN -> GETQUOTAROOT -> LOGOUT
//!
//! ## Module layout
//!
//! - `server` -- TCP listener, TLS setup, and connection dispatch
//! - `handlers/` -- one file per IMAP command
//! - `scenario` -- what the server should answer (builder)
//! - `io` -- shared write helpers


pub use scenario::ScenarioBuilder;
pub use server::FakeImapServer;
