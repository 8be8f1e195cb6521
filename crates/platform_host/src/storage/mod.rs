//! Durable storage contracts used by the foreground application.

pub mod slots;
