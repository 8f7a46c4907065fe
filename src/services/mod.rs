// src/services/mod.rs
pub mod api;
pub mod config;
pub mod notices;
pub(crate) mod paths;
pub mod preferences;
pub mod session;
