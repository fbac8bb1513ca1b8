// Drive-Thru Core - Order Engine Library
// Exposes all modules for use by the agent runtime, the CLI, and tests

pub mod catalog;
pub mod error;
pub mod hierarchy;
pub mod ledger;
pub mod logging;
pub mod matching;
pub mod models;
pub mod modifiers;
pub mod session;

// Re-export commonly used types
pub use catalog::MenuCatalog;
pub use error::{MenuError, OrderError};
pub use hierarchy::{MenuHierarchyBuilder, MenuRow, SizeLexicon};
pub use ledger::{FinalOrder, OrderEvent, OrderEventKind, OrderLedger, OrderLineItem};
pub use matching::{
    similarity, MatchConfig, MatchFailure, MatchFailureReason, MatchResolver, MatchResult,
};
pub use models::{BaseEntry, Menu, MenuDocument, MenuItem, Modifier};
pub use modifiers::CommonModifierTable;
pub use session::{OrderSession, SessionOutcome, SessionReply};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
