//! Runtime configuration of the dashboard.

pub mod config;
