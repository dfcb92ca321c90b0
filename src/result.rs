//! Error handling and result types for depmend.
//!
//! This module provides a unified error handling approach using the
//! `color-eyre` crate, which offers enhanced error reporting with context,
//! suggestions, and colored output.
//!
//! All functions in depmend that can fail should return the `Result<T>` type
//! defined in this module, ensuring consistent error handling and reporting
//! across the application.

use color_eyre::eyre::Result as EyreResult;

/// Standard result type used throughout depmend.
///
/// This is a type alias for `color_eyre::eyre::Result<T>`, providing
/// enhanced error reporting capabilities including:
///
/// - Colorized error output in terminals
/// - Automatic error context and suggestions
/// - Chain-able error contexts using `.wrap_err()`
pub type Result<T> = EyreResult<T>;
