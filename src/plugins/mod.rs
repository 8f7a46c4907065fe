// src/plugins/mod.rs
pub mod session;
