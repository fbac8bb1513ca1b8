// 🚗 Order Session - Session-scoped facade over the catalog and ledger
// The dialogue runtime calls exactly three operations; each returns a short
// relay string for the customer plus the structured outcome for logging.

use serde::Serialize;
use std::sync::Arc;

use crate::catalog::MenuCatalog;
use crate::error::OrderError;
use crate::ledger::{FinalOrder, OrderLedger, OrderLineItem};
use crate::matching::{MatchFailure, MatchFailureReason, MatchResolver};
use crate::modifiers::CommonModifierTable;

/// Relaxed modifier threshold at this call site, tolerating common
/// transcription typos ("no pickels").
const MODIFIER_TYPO_THRESHOLD: f64 = 70.0;

// ============================================================================
// REPLIES
// ============================================================================

/// Structured result of a session operation, for logging.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    ItemAdded { item: OrderLineItem },
    ItemRemoved { item: OrderLineItem },
    OrderCompleted { final_order: FinalOrder },
    EmptyOrder,
    ItemNotFoundInOrder { requested: String },
    ValidationFailed { failure: MatchFailure },
    Rejected { detail: String },
}

/// What a session operation hands back to the dialogue runtime.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReply {
    /// Short human-readable string to relay to the customer.
    pub message: String,

    pub outcome: SessionOutcome,
}

impl SessionReply {
    fn new(message: impl Into<String>, outcome: SessionOutcome) -> Self {
        SessionReply {
            message: message.into(),
            outcome,
        }
    }
}

// ============================================================================
// ORDER SESSION
// ============================================================================

/// One customer session: its own ledger plus the shared read-only catalog.
///
/// All collaborators are injected at construction; the session owns no
/// hidden state beyond its ledger.
pub struct OrderSession {
    ledger: OrderLedger,
    catalog: Arc<MenuCatalog>,
    resolver: MatchResolver,
    common_modifiers: CommonModifierTable,
}

impl OrderSession {
    /// Build a session with the default resolver thresholds and the standard
    /// common-modifier table.
    pub fn new(ledger: OrderLedger, catalog: Arc<MenuCatalog>) -> Self {
        Self::with_parts(
            ledger,
            catalog,
            MatchResolver::with_defaults(),
            CommonModifierTable::standard(),
        )
    }

    /// Full constructor injection, for tests and nonstandard deployments.
    pub fn with_parts(
        ledger: OrderLedger,
        catalog: Arc<MenuCatalog>,
        resolver: MatchResolver,
        common_modifiers: CommonModifierTable,
    ) -> Self {
        OrderSession {
            ledger,
            catalog,
            resolver,
            common_modifiers,
        }
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    /// Add a menu item to the order.
    ///
    /// Validates against the menu before mutating anything; a validation
    /// miss returns an apologetic relay string and leaves the ledger
    /// untouched. The category is located automatically.
    pub fn add_item_to_order(
        &self,
        item_name: &str,
        modifiers: &[String],
        quantity: u32,
    ) -> Result<SessionReply, OrderError> {
        tracing::debug!(item_name, ?modifiers, quantity, "add_item_to_order called");

        if item_name.trim().is_empty() {
            tracing::warn!("add_item_to_order called without an item name");
            return Ok(SessionReply::new(
                "I need to know which item you'd like to add. What would you like to order?",
                SessionOutcome::Rejected {
                    detail: "missing item name".to_string(),
                },
            ));
        }

        if quantity == 0 {
            return Ok(SessionReply::new(
                "Quantity must be at least 1.",
                SessionOutcome::Rejected {
                    detail: "non-positive quantity".to_string(),
                },
            ));
        }

        // The dialogue layer sometimes sends "Big Mac (Beef & Pork)"
        let item_name = self.strip_category_suffix(item_name);

        let item_result = self.resolver.resolve_item(&item_name, None, &self.catalog);
        let Some(item) = item_result.matched_item.clone().filter(|_| item_result.is_valid)
        else {
            tracing::warn!(item_name = %item_name, "item not found in menu");
            return Ok(SessionReply::new(
                format!(
                    "Sorry, I couldn't find '{}' on our menu. Could you try a different item?",
                    item_name
                ),
                match item_result.failure {
                    Some(failure) => SessionOutcome::ValidationFailed { failure },
                    None => SessionOutcome::Rejected {
                        detail: "item not resolved".to_string(),
                    },
                },
            ));
        };

        tracing::debug!(
            matched = %item.item_name,
            category = %item.category_name,
            confidence = item_result.confidence,
            "menu item resolved"
        );

        let modifier_result =
            self.resolver
                .resolve_modifiers(&item, modifiers, MODIFIER_TYPO_THRESHOLD);

        if !modifier_result.is_valid {
            // Items with no modifiers of their own fall back to the
            // category's common-modifier table
            let no_declared = modifier_result
                .failure
                .as_ref()
                .map(|f| f.reason == MatchFailureReason::ModifierNotAvailable)
                .unwrap_or(false);
            let common_ok = no_declared
                && modifiers.iter().all(|m| {
                    self.common_modifiers
                        .match_for_category(m, &item.category_name, MODIFIER_TYPO_THRESHOLD)
                        .is_some()
                });

            if !common_ok {
                let failure = modifier_result.failure.unwrap_or(MatchFailure {
                    reason: MatchFailureReason::ModifierNotResolved,
                    message: "modifier validation failed".to_string(),
                    unmatched: Vec::new(),
                });
                tracing::warn!(message = %failure.message, "modifier validation failed");
                return Ok(SessionReply::new(
                    format!("Sorry, I couldn't add that item: {}", failure.message),
                    SessionOutcome::ValidationFailed { failure },
                ));
            }
        }

        let added = match self.ledger.add_item(
            item.item_name.clone(),
            item.category_name.clone(),
            modifiers.to_vec(),
            quantity,
        ) {
            Ok(added) => added,
            Err(err) => return self.rejected_or_err(err),
        };

        let modifier_text = if modifiers.is_empty() {
            String::new()
        } else {
            format!(" with {}", modifiers.join(", "))
        };
        let message = if quantity > 1 {
            format!(
                "Added {} {}{} to your order.",
                quantity, added.item_name, modifier_text
            )
        } else {
            format!("Added one {}{} to your order.", added.item_name, modifier_text)
        };

        tracing::info!(message = %message, "item added");
        Ok(SessionReply::new(message, SessionOutcome::ItemAdded { item: added }))
    }

    /// Remove an item from the order by name.
    ///
    /// When several lines share the name, the most recently added one goes.
    pub fn remove_item_from_order(&self, item_name: &str) -> Result<SessionReply, OrderError> {
        tracing::debug!(item_name, "remove_item_from_order called");

        let item_name = self.strip_category_suffix(item_name);

        let to_remove = self
            .ledger
            .get_items()
            .into_iter()
            .rev()
            .find(|item| item.item_name.eq_ignore_ascii_case(&item_name));

        let Some(item) = to_remove else {
            tracing::debug!(item_name = %item_name, "item not found in order");
            return Ok(SessionReply::new(
                format!("I don't see '{}' in your order.", item_name),
                SessionOutcome::ItemNotFoundInOrder {
                    requested: item_name,
                },
            ));
        };

        match self.ledger.remove_item(&item.item_id) {
            Ok(true) => {
                tracing::info!(item = %item.item_name, "item removed");
                Ok(SessionReply::new(
                    format!("Removed {} from your order.", item.item_name),
                    SessionOutcome::ItemRemoved { item },
                ))
            }
            Ok(false) => Ok(SessionReply::new(
                format!("Couldn't remove {}. Please try again.", item.item_name),
                SessionOutcome::ItemNotFoundInOrder {
                    requested: item.item_name,
                },
            )),
            Err(err) => self.rejected_or_err(err),
        }
    }

    /// Complete the order and produce the final summary.
    ///
    /// An empty order prompts the customer to add something instead of
    /// finalizing.
    pub fn complete_order(&self) -> Result<SessionReply, OrderError> {
        tracing::debug!("complete_order called");

        if self.ledger.is_empty() && !self.ledger.is_completed() {
            return Ok(SessionReply::new(
                "Your order is empty. Would you like to add something?",
                SessionOutcome::EmptyOrder,
            ));
        }

        let final_order = match self.ledger.complete_order() {
            Ok(final_order) => final_order,
            Err(err) => return self.rejected_or_err(err),
        };

        let message = format!(
            "Order complete! You ordered: {}. Total items: {}. Thank you!",
            final_order.order_summary, final_order.total_items
        );
        tracing::info!(message = %message, "order completed");
        Ok(SessionReply::new(
            message,
            SessionOutcome::OrderCompleted { final_order },
        ))
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    /// Strip a trailing parenthetical from the requested name when it names
    /// a menu category ("Big Mac (Beef & Pork)" → "Big Mac"). Size
    /// annotations like "(Large Biscuit)" are part of real item names and
    /// stay put.
    fn strip_category_suffix(&self, item_name: &str) -> String {
        let trimmed = item_name.trim();

        if let Some(open) = trimmed.rfind('(') {
            if let Some(close_rel) = trimmed[open..].find(')') {
                let inner = &trimmed[open + 1..open + close_rel];
                if self.catalog.category_exists(inner) {
                    return trimmed[..open].trim().to_string();
                }
            }
        }

        trimmed.to_string()
    }

    /// Command-level failures are recovered into a reply; storage errors
    /// propagate.
    fn rejected_or_err(&self, err: OrderError) -> Result<SessionReply, OrderError> {
        match err {
            OrderError::AlreadyCompleted => Ok(SessionReply::new(
                "This order has already been completed.",
                SessionOutcome::Rejected {
                    detail: err.to_string(),
                },
            )),
            OrderError::InvalidQuantity(q) => Ok(SessionReply::new(
                "Quantity must be at least 1.",
                SessionOutcome::Rejected {
                    detail: format!("invalid quantity: {}", q),
                },
            )),
            other => Err(other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Menu, MenuItem};
    use std::fs;
    use std::path::{Path, PathBuf};

    struct TempRoot(PathBuf);

    impl TempRoot {
        fn new() -> Self {
            let root = std::env::temp_dir()
                .join(format!("order-session-test-{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&root).unwrap();
            TempRoot(root)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempRoot {
        fn drop(&mut self) {
            fs::remove_dir_all(&self.0).ok();
        }
    }

    fn sample_catalog() -> Arc<MenuCatalog> {
        let mut menu = Menu::new();

        let mut big_mac = MenuItem::new("Beef & Pork", "Big Mac", true);
        big_mac.add_modifier("No Pickles");
        big_mac.add_modifier("Extra Sauce");
        menu.add_item(big_mac);
        menu.add_item(MenuItem::new("Beef & Pork", "Hamburger", true));

        menu.add_item(MenuItem::new("Snacks & Sides", "French Fries (Small)", true));
        menu.add_item(MenuItem::new(
            "Breakfast",
            "Sausage Biscuit (Regular Biscuit)",
            true,
        ));

        Arc::new(MenuCatalog::load(menu).unwrap())
    }

    fn session(root: &TempRoot) -> OrderSession {
        let ledger = OrderLedger::new("session-1", root.path()).unwrap();
        OrderSession::new(ledger, sample_catalog())
    }

    #[test]
    fn test_add_item_success() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session
            .add_item_to_order("big mac", &["No Pickles".to_string()], 1)
            .unwrap();

        assert_eq!(
            reply.message,
            "Added one Big Mac with No Pickles to your order."
        );
        assert!(matches!(reply.outcome, SessionOutcome::ItemAdded { .. }));
        assert_eq!(session.ledger().get_total_count(), 1);
    }

    #[test]
    fn test_add_item_quantity_phrase() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session.add_item_to_order("Hamburger", &[], 2).unwrap();

        assert_eq!(reply.message, "Added 2 Hamburger to your order.");
    }

    #[test]
    fn test_add_item_fuzzy_resolves_to_menu_spelling() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session.add_item_to_order("Big Mack", &[], 1).unwrap();

        assert!(reply.message.contains("Big Mac"));
        let items = session.ledger().get_items();
        assert_eq!(items[0].item_name, "Big Mac");
        assert_eq!(items[0].category, "Beef & Pork");
    }

    #[test]
    fn test_add_item_unknown_leaves_state_unchanged() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session.add_item_to_order("Whopper", &[], 1).unwrap();

        assert!(reply.message.starts_with("Sorry, I couldn't find 'Whopper'"));
        assert!(session.ledger().is_empty());
        assert_eq!(
            fs::read_to_string(session.ledger().log_path()).unwrap(),
            ""
        );
    }

    #[test]
    fn test_add_item_empty_name_prompts() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session.add_item_to_order("", &[], 1).unwrap();

        assert!(reply.message.contains("which item"));
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_add_item_invalid_modifier_rejected_without_mutation() {
        let root = TempRoot::new();
        let session = session(&root);

        let modifiers = vec!["No Pickles".to_string(), "Anchovies".to_string()];
        let reply = session.add_item_to_order("Big Mac", &modifiers, 1).unwrap();

        assert!(reply.message.starts_with("Sorry, I couldn't add that item"));
        match reply.outcome {
            SessionOutcome::ValidationFailed { failure } => {
                assert_eq!(failure.unmatched, vec!["Anchovies".to_string()]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_add_item_common_modifier_fallback() {
        let root = TempRoot::new();
        let session = session(&root);

        // Hamburger declares no modifiers; "No Onions" is common for the
        // category
        let reply = session
            .add_item_to_order("Hamburger", &["No Onions".to_string()], 1)
            .unwrap();

        assert!(matches!(reply.outcome, SessionOutcome::ItemAdded { .. }));
        assert_eq!(
            session.ledger().get_items()[0].modifiers,
            vec!["No Onions".to_string()]
        );
    }

    #[test]
    fn test_add_item_common_modifier_fallback_rejects_unknown() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session
            .add_item_to_order("Hamburger", &["Anchovies".to_string()], 1)
            .unwrap();

        assert!(matches!(
            reply.outcome,
            SessionOutcome::ValidationFailed { .. }
        ));
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn test_category_suffix_stripped_but_size_kept() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session
            .add_item_to_order("Big Mac (Beef & Pork)", &[], 1)
            .unwrap();
        assert!(matches!(reply.outcome, SessionOutcome::ItemAdded { .. }));
        assert_eq!(session.ledger().get_items()[0].item_name, "Big Mac");

        let reply = session
            .add_item_to_order("Sausage Biscuit (Regular Biscuit)", &[], 1)
            .unwrap();
        assert!(matches!(reply.outcome, SessionOutcome::ItemAdded { .. }));
        assert_eq!(
            session.ledger().get_items()[1].item_name,
            "Sausage Biscuit (Regular Biscuit)"
        );
    }

    #[test]
    fn test_remove_item_takes_most_recent() {
        let root = TempRoot::new();
        let session = session(&root);

        session.add_item_to_order("Big Mac", &[], 1).unwrap();
        session.add_item_to_order("Big Mac", &[], 1).unwrap();
        let second_id = session.ledger().get_items()[1].item_id.clone();

        let reply = session.remove_item_from_order("big mac").unwrap();

        assert_eq!(reply.message, "Removed Big Mac from your order.");
        let remaining = session.ledger().get_items();
        assert_eq!(remaining.len(), 1);
        assert_ne!(remaining[0].item_id, second_id);
    }

    #[test]
    fn test_remove_item_not_in_order() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session.remove_item_from_order("Big Mac").unwrap();

        assert_eq!(reply.message, "I don't see 'Big Mac' in your order.");
        assert!(matches!(
            reply.outcome,
            SessionOutcome::ItemNotFoundInOrder { .. }
        ));
    }

    #[test]
    fn test_complete_empty_order_prompts() {
        let root = TempRoot::new();
        let session = session(&root);

        let reply = session.complete_order().unwrap();

        assert_eq!(
            reply.message,
            "Your order is empty. Would you like to add something?"
        );
        assert!(matches!(reply.outcome, SessionOutcome::EmptyOrder));
        assert!(!session.ledger().is_completed());
    }

    #[test]
    fn test_complete_order_summary_message() {
        let root = TempRoot::new();
        let session = session(&root);

        session.add_item_to_order("Big Mac", &[], 2).unwrap();
        session.add_item_to_order("Hamburger", &[], 1).unwrap();

        let reply = session.complete_order().unwrap();

        assert_eq!(
            reply.message,
            "Order complete! You ordered: 2 Big Mac, 1 Hamburger. Total items: 3. Thank you!"
        );
        assert!(session.ledger().final_order_path().exists());
    }

    #[test]
    fn test_commands_after_completion_are_rejected() {
        let root = TempRoot::new();
        let session = session(&root);

        session.add_item_to_order("Big Mac", &[], 1).unwrap();
        session.complete_order().unwrap();

        let reply = session.add_item_to_order("Hamburger", &[], 1).unwrap();
        assert_eq!(reply.message, "This order has already been completed.");
        assert!(matches!(reply.outcome, SessionOutcome::Rejected { .. }));

        let reply = session.complete_order().unwrap();
        assert_eq!(reply.message, "This order has already been completed.");
    }
}
