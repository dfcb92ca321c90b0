//! Remediation service client and wire types.
pub mod client;
pub mod traits;
pub mod types;
