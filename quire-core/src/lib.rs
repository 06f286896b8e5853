//! quire-core: configuration and domain rules for the quire blog
//!
//! Nothing here touches the network or the database, so both the server
//! and the CLI can depend on it cheaply.

pub mod config;
pub mod error;
pub mod text;
pub mod vote;

pub use config::QuireConfig;
pub use error::{QuireError, Result};
pub use vote::{Membership, SetChange, TargetKind, VoteAction, VoteOutcome};
