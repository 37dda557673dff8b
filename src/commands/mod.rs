//! Individual command implementations.
//!
//! You probably want [`LedgerCosmos`](crate::api::LedgerCosmos) instead.

pub mod get_address;
pub mod get_version;
pub mod sign;
