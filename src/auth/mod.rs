//! Authentication module
//!
//! Username/password login against the SOAP partner endpoint, and session
//! revocation.
//!
//! The `Authenticator` turns [`Credentials`](crate::credentials::Credentials)
//! into a [`SessionToken`]: the session id used as a bearer token plus the
//! instance URL every REST call goes to.

mod authenticator;
mod types;

pub use authenticator::{login_envelope, parse_login_response, Authenticator};
pub use types::SessionToken;

#[cfg(test)]
mod tests;
