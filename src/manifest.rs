//! Dependency manifest parsing, updating, and validation per ecosystem.
pub mod dispatch;
pub mod maven;
pub mod npm;
pub mod traits;
pub mod types;
