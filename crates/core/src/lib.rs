//! Psicofinders Core - domain types and access gating.
//!
//! This crate is shared by every Psicofinders component:
//! - `site` - Public landing page, application intake and the `/pro` area
//! - `admin` - Backoffice for reviewing and exporting applications
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure decision functions - no I/O,
//! no database access, no HTTP clients. The binaries adapt framework requests
//! into calls to [`gate`] and persist the types from [`types`].
//!
//! # Modules
//!
//! - [`types`] - Ids, email, modality, languages, fees, availability, admin credential
//! - [`gate`] - Route classification and redirect decisions for `/pro` and `/admin`

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod gate;
pub mod types;

pub use types::*;
