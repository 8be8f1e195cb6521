//! Fetch-domain models and network service contracts.

pub mod network;
pub mod types;
