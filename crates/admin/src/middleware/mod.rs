//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID
//! 4. Security headers
//! 5. Admin gate

pub mod gate;
pub mod request_id;
pub mod security_headers;

pub use gate::{ADMIN_COOKIE, admin_cookie, admin_gate, removal_cookie};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
