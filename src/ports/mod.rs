//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: called by the admin console (adapter) into the application
//! - Outbound: called by the application into the document store

pub mod inbound;
pub mod outbound;

pub use inbound::AdminPort;
pub use outbound::{DocumentStore, WriteBatch, WriteGuard, WriteOp};
