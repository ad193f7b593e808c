//! Backoffice services.

pub mod export;
