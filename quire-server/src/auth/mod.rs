//! Authentication: password hashing and session cookies

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password};
pub use session::{attach, SessionSettings};

/// Authentication failures that aren't the user's fault
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}
