//! Remote GraphQL API access.

pub mod client;

pub use client::{BroadcastClient, BROADCASTS_QUERY, OPERATION_NAME};
