//! Command handlers

pub mod config;
pub mod health;
pub mod stats;
pub mod todo;
pub mod user;
