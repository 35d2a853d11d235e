//! Authentication infrastructure module
//!
//! Verifies session tokens minted by the identity provider and, for local
//! development, issues tokens signed with the shared session secret.

mod jwt;

pub use jwt::{JwtSessionVerifier, SessionClaims, SessionTokenIssuer};
