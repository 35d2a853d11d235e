//! Session domain
//!
//! A session is proof of caller identity issued by an external identity
//! provider. This crate only reads sessions; it never creates or ends them.

mod entity;
mod verifier;

pub use entity::{Session, UserId};
pub use verifier::SessionVerifier;

#[cfg(test)]
pub use verifier::MockSessionVerifier;
