//! Client permission model shared by the store and the dashboard.

pub mod client;
pub mod field;
pub mod permissions;
pub mod types;
