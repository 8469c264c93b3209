//! Error types for binding generation.
//!
//! Degradations (unmappable types, unparseable docstrings) are never errors;
//! they fall back inside the mapper/formatter. Errors here mean the whole
//! library's generation failed.

use std::path::PathBuf;

/// Errors produced by a generation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manifest could not be parsed or is structurally invalid.
    #[error("invalid manifest for `{library}`: {reason}")]
    Manifest {
        /// Library the manifest describes (or "<unknown>" if unparseable).
        library: String,
        /// Human-readable parse/validation failure.
        reason: String,
    },

    /// A specific symbol descriptor is malformed.
    #[error("invalid symbol `{symbol}` in `{library}`: {reason}")]
    Symbol {
        /// Library the manifest describes.
        library: String,
        /// Qualified name of the offending symbol.
        symbol: String,
        /// What is wrong with the descriptor.
        reason: String,
    },

    /// A filesystem write failed. Files written earlier in the run remain.
    #[error("failed to write `{}`: {source}", path.display())]
    Write {
        /// Destination path of the failed write.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Rendered output failed the parseability sanity check. This is a
    /// generator defect, not a manifest problem.
    #[error("generated unparseable output for `{}`: {reason}", path.display())]
    Internal {
        /// Destination path of the bad output.
        path: PathBuf,
        /// Which structural check failed.
        reason: String,
    },
}
