// Error types for menu loading and order commands

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or loading a menu.
///
/// These are fatal at startup: the system cannot take orders without a
/// valid menu, so callers are expected to propagate them and abort.
#[derive(Debug, Error)]
pub enum MenuError {
    /// The menu source file does not exist.
    #[error("Menu file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The menu source or document is structurally invalid.
    #[error("Malformed menu document: {0}")]
    Malformed(String),

    /// An underlying I/O error while reading the menu.
    #[error("Menu I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The menu JSON could not be parsed.
    #[error("Invalid menu JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by order ledger commands.
///
/// Validation misses that are part of the normal flow (unknown item id,
/// rejected quantity update) are reported as `Ok(false)` by the ledger,
/// not as errors; these variants cover the cases where the command itself
/// is illegal or the durable append failed.
#[derive(Debug, Error)]
pub enum OrderError {
    /// A mutation was attempted after `complete_order`.
    #[error("Order is already completed and can no longer be modified")]
    AlreadyCompleted,

    /// A quantity that is zero or negative was supplied on add.
    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(i64),

    /// The event log or snapshot could not be written.
    #[error("Order storage error: {0}")]
    Io(#[from] std::io::Error),

    /// An event or snapshot could not be serialized.
    #[error("Order serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
