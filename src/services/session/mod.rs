//! Conversation & job session manager.
//!
//! `SessionManager` is the single owner of `plugins::session::SessionState`.
//! Gateways live in `conversations` and `uploads`; the job poller in `poller`.

mod conversations;
pub mod intent;
mod manager;
mod poller;
mod uploads;

#[cfg(test)]
mod fake_api;

pub use manager::{SessionManager, SessionSnapshot};
