//! Server-only code: shared state, the account store, cookies and mail.
pub mod app_state;
pub mod backend;
pub mod config;
pub mod cookie;
pub mod key;
pub mod mail;
