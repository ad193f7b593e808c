//! Business logic services for the site.
//!
//! # Services
//!
//! - `identity` - Identity provider client (sign-in, sessions, invitations)
//! - `intake` - Application intake normalization and follow-up invitation

pub mod identity;
pub mod intake;

pub use identity::{IdentityClient, IdentityError};
