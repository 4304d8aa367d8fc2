//! Authentication module
//!
//! Turns a captured browser session (cookie export) into an authenticated
//! request context.
//!
//! - `CredentialSet` - cookie name → value, loaded from the export file
//! - `SessionBuilder` - builds the immutable `Session` (headers + cookie jar)

mod credentials;
mod session;

pub use credentials::{CredentialSet, AUTH_TOKEN_COOKIE, CSRF_COOKIE};
pub use session::{Session, SessionBuilder};
