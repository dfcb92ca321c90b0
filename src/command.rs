//! Command execution and orchestration for depmend.
//!
//! Each ecosystem gets one remediate command following the same workflow:
//! check the source exists, parse it into a normalized package list, submit
//! the list to the remediation service, then either render a dry-run
//! preview or apply the recommended patches. The first error anywhere
//! aborts the run; dry-run mode performs no filesystem or subprocess
//! mutation of any kind.

/// Shared orchestration helpers used by every ecosystem command.
pub mod common;

/// Maven remediation: patches dependency versions in pom.xml.
pub mod maven;

/// npm remediation: patches the lock file and pins aliased replacements
/// through package.json overrides.
pub mod npm;

/// pip remediation: patches installed packages through pip subprocesses.
pub mod pip;

/// Dry-run preview rendering.
pub mod report;
