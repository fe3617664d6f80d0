//! `storefront-auth`: the session gate.
//!
//! Holds at most one opaque token and decides whether protected views may be
//! entered. Token issuance is delegated to an [`Authenticator`]; this crate is
//! decoupled from HTTP and storage.

pub mod authenticator;
pub mod credentials;
pub mod session;

pub use authenticator::{AuthError, Authenticator, StaticAuthenticator};
pub use credentials::Credentials;
pub use session::{AccessError, Session, SessionToken};
