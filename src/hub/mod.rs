//! Remote dataset repository publishing.
//!
//! The local filesystem is the source of truth; the remote repository is a
//! push-only mirror that is never read back.

pub mod api;
pub mod publisher;

pub use api::{DatasetHub, HfHubClient, MockHub};
pub use publisher::publish;
