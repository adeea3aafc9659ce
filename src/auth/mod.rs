//! Authentication module
//!
//! OAuth 1.0a request signing with HMAC-SHA1.
//!
//! The `Signer` turns held [`Credentials`] into a fresh set of
//! [`SignedRequestParameters`] for each request and computes the
//! `Authorization` header from them. Secret-flagged parameters feed the
//! signing key only and never leave the process.

mod signer;
mod types;

pub use signer::{percent_encode, FixedNonceSource, NonceSource, Signer, SystemNonceSource};
pub use types::{Credentials, OAuthParameter, SignedRequestParameters};
