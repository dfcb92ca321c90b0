//! depmend remediates known-vulnerable dependencies in pip, npm, and Maven
//! projects: it parses the ecosystem's manifest (or queries pip directly),
//! submits the package list to the depmend remediation service, and either
//! previews or applies the recommended upgrades.

pub mod api;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod manifest;
pub mod pip;
pub mod result;

pub use result::Result;
