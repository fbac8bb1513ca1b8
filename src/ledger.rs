// 🧾 Order Ledger - Per-session order state with an append-only event log
// Every mutating command appends exactly one event record before it
// acknowledges; `complete_order` freezes the ledger into a final snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::OrderError;

// ============================================================================
// ORDER LINE ITEM
// ============================================================================

/// One line of a customer's order.
///
/// Owned exclusively by a single session's ledger; every read across the
/// ledger boundary returns an owned copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    /// Unique id generated on add.
    #[serde(default = "default_uuid")]
    pub item_id: String,

    pub item_name: String,

    pub category: String,

    /// Modifier names in the order the customer asked for them.
    #[serde(default)]
    pub modifiers: Vec<String>,

    pub quantity: u32,

    pub timestamp: DateTime<Utc>,
}

fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl OrderLineItem {
    /// Create a line item with a fresh id and the current timestamp.
    pub fn new(
        item_name: impl Into<String>,
        category: impl Into<String>,
        modifiers: Vec<String>,
        quantity: u32,
    ) -> Self {
        OrderLineItem {
            item_id: default_uuid(),
            item_name: item_name.into(),
            category: category.into(),
            modifiers,
            quantity,
            timestamp: Utc::now(),
        }
    }

    /// Merge identity hash: same item name, category, and modifier *set*
    /// (order-insensitive, case-insensitive) → same key.
    ///
    /// NOTE: This is for duplicate MERGING, not identity — identity is
    /// `item_id`.
    pub fn merge_key(&self) -> String {
        let mut modifiers: Vec<String> =
            self.modifiers.iter().map(|m| m.to_lowercase()).collect();
        modifiers.sort();

        let mut hasher = Sha256::new();
        hasher.update(self.item_name.to_lowercase());
        hasher.update("|");
        hasher.update(self.category.to_lowercase());
        for modifier in &modifiers {
            hasher.update("|");
            hasher.update(modifier);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Caller-level duplicate merge: when both lines share a merge key, the
    /// result carries the summed quantity under a **fresh** id (both input
    /// ids are discarded) and the earlier timestamp. `None` when the lines
    /// are not mergeable.
    pub fn try_merge(&self, other: &OrderLineItem) -> Option<OrderLineItem> {
        if self.merge_key() != other.merge_key() {
            return None;
        }

        Some(OrderLineItem {
            item_id: default_uuid(),
            item_name: self.item_name.clone(),
            category: self.category.clone(),
            modifiers: self.modifiers.clone(),
            quantity: self.quantity + other.quantity,
            timestamp: self.timestamp.min(other.timestamp),
        })
    }
}

// ============================================================================
// ORDER EVENTS
// ============================================================================

/// The five mutating commands, as they appear in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    AddItem,
    RemoveItem,
    UpdateQuantity,
    ClearOrder,
    CompleteOrder,
}

/// One immutable line of the session's append-only event log.
///
/// Serialized as line-delimited JSON: `event` and `timestamp` always, plus
/// the event-specific payload fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event: OrderEventKind,

    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<OrderLineItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl OrderEvent {
    fn new(event: OrderEventKind) -> Self {
        OrderEvent {
            event,
            timestamp: Utc::now(),
            item: None,
            item_id: None,
            quantity: None,
        }
    }

    fn add_item(item: OrderLineItem) -> Self {
        let mut event = Self::new(OrderEventKind::AddItem);
        event.item = Some(item);
        event
    }

    fn remove_item(item_id: String) -> Self {
        let mut event = Self::new(OrderEventKind::RemoveItem);
        event.item_id = Some(item_id);
        event
    }

    fn update_quantity(item_id: String, quantity: u32) -> Self {
        let mut event = Self::new(OrderEventKind::UpdateQuantity);
        event.item_id = Some(item_id);
        event.quantity = Some(quantity);
        event
    }
}

// ============================================================================
// FINAL ORDER SNAPSHOT
// ============================================================================

/// The immutable snapshot written exactly once per session by
/// `complete_order`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalOrder {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub completion_time: DateTime<Utc>,
    pub status: String,
    pub items: Vec<OrderLineItem>,
    pub order_summary: String,
    pub total_items: u32,
}

// ============================================================================
// ORDER LEDGER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LedgerState {
    Open,
    Completed,
}

struct LedgerInner {
    state: LedgerState,
    items: Vec<OrderLineItem>,
}

/// Per-session mutable order state.
///
/// One ledger per session, never shared across sessions. The internal mutex
/// makes each command's log-append and in-memory update a single atomic
/// unit, so two mutation calls racing within one session cannot interleave
/// a partial write.
pub struct OrderLedger {
    session_id: String,
    start_time: DateTime<Utc>,
    session_dir: PathBuf,
    log_path: PathBuf,
    inner: Mutex<LedgerInner>,
}

impl OrderLedger {
    /// Create an empty ledger, its session directory, and an empty
    /// incremental log file.
    pub fn new(session_id: impl Into<String>, output_root: &Path) -> Result<Self, OrderError> {
        let session_id = session_id.into();
        let session_dir = output_root.join(&session_id);
        fs::create_dir_all(&session_dir)?;

        let log_path = session_dir.join("incremental_log.jsonl");
        File::create(&log_path)?;

        tracing::debug!(session_id = %session_id, "order ledger created");

        Ok(OrderLedger {
            session_id,
            start_time: Utc::now(),
            session_dir,
            log_path,
            inner: Mutex::new(LedgerInner {
                state: LedgerState::Open,
                items: Vec::new(),
            }),
        })
    }

    /// Create a ledger with a generated session id.
    pub fn with_generated_session(output_root: &Path) -> Result<Self, OrderError> {
        Self::new(default_uuid(), output_root)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Path of the append-only event log.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Path the final snapshot is written to on completion.
    pub fn final_order_path(&self) -> PathBuf {
        self.session_dir.join("final_order.json")
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    /// Add a line item. Appends an `add_item` event and returns a copy of
    /// the stored line. Does not merge duplicates — merging is the caller's
    /// contract via `OrderLineItem::try_merge`.
    pub fn add_item(
        &self,
        item_name: impl Into<String>,
        category: impl Into<String>,
        modifiers: Vec<String>,
        quantity: u32,
    ) -> Result<OrderLineItem, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(0));
        }

        let mut inner = self.lock_inner();
        self.ensure_open(&inner)?;

        let item = OrderLineItem::new(item_name, category, modifiers, quantity);
        self.append_event(&OrderEvent::add_item(item.clone()))?;
        inner.items.push(item.clone());

        tracing::debug!(
            session_id = %self.session_id,
            item = %item.item_name,
            quantity,
            "item added to order"
        );
        Ok(item)
    }

    /// Remove a line item by id. `Ok(true)` and one `remove_item` event when
    /// the id existed; `Ok(false)` and no event otherwise.
    pub fn remove_item(&self, item_id: &str) -> Result<bool, OrderError> {
        let mut inner = self.lock_inner();
        self.ensure_open(&inner)?;

        let Some(position) = inner.items.iter().position(|i| i.item_id == item_id) else {
            return Ok(false);
        };

        self.append_event(&OrderEvent::remove_item(item_id.to_string()))?;
        inner.items.remove(position);

        tracing::debug!(session_id = %self.session_id, item_id, "item removed from order");
        Ok(true)
    }

    /// Update a line item's quantity in place. `Ok(false)` — with no event
    /// and no mutation — for an unknown id or a non-positive quantity.
    pub fn update_item_quantity(&self, item_id: &str, quantity: i64) -> Result<bool, OrderError> {
        let mut inner = self.lock_inner();
        self.ensure_open(&inner)?;

        if quantity <= 0 {
            return Ok(false);
        }
        let quantity = quantity as u32;

        let Some(position) = inner.items.iter().position(|i| i.item_id == item_id) else {
            return Ok(false);
        };

        self.append_event(&OrderEvent::update_quantity(item_id.to_string(), quantity))?;
        inner.items[position].quantity = quantity;

        tracing::debug!(session_id = %self.session_id, item_id, quantity, "quantity updated");
        Ok(true)
    }

    /// Remove all line items, appending one `clear_order` event.
    pub fn clear_order(&self) -> Result<(), OrderError> {
        let mut inner = self.lock_inner();
        self.ensure_open(&inner)?;

        self.append_event(&OrderEvent::new(OrderEventKind::ClearOrder))?;
        inner.items.clear();

        tracing::debug!(session_id = %self.session_id, "order cleared");
        Ok(())
    }

    /// Finalize the order: write the snapshot, append a `complete_order`
    /// event, and transition to the terminal state. Valid on an empty order.
    ///
    /// Completing twice fails with `AlreadyCompleted`; the snapshot is never
    /// rewritten.
    pub fn complete_order(&self) -> Result<FinalOrder, OrderError> {
        let mut inner = self.lock_inner();
        self.ensure_open(&inner)?;

        let final_order = FinalOrder {
            session_id: self.session_id.clone(),
            start_time: self.start_time,
            completion_time: Utc::now(),
            status: "completed".to_string(),
            items: inner.items.clone(),
            order_summary: summarize(&inner.items),
            total_items: inner.items.iter().map(|i| i.quantity).sum(),
        };

        let json = serde_json::to_string_pretty(&final_order)?;
        fs::write(self.final_order_path(), json)?;

        self.append_event(&OrderEvent::new(OrderEventKind::CompleteOrder))?;
        inner.state = LedgerState::Completed;

        tracing::info!(
            session_id = %self.session_id,
            total_items = final_order.total_items,
            "order completed"
        );
        Ok(final_order)
    }

    // ========================================================================
    // QUERIES (never mutate, always return copies)
    // ========================================================================

    /// All line items in insertion order, as copies.
    pub fn get_items(&self) -> Vec<OrderLineItem> {
        self.lock_inner().items.clone()
    }

    /// A single line item by id, as a copy.
    pub fn get_item_by_id(&self, item_id: &str) -> Option<OrderLineItem> {
        self.lock_inner()
            .items
            .iter()
            .find(|i| i.item_id == item_id)
            .cloned()
    }

    /// Sum of quantities across all line items.
    pub fn get_total_count(&self) -> u32 {
        self.lock_inner().items.iter().map(|i| i.quantity).sum()
    }

    /// `"<quantity> <item_name>"` comma-joined in insertion order, or
    /// `"No items"` when empty.
    pub fn get_order_summary(&self) -> String {
        summarize(&self.lock_inner().items)
    }

    pub fn is_empty(&self) -> bool {
        self.lock_inner().items.is_empty()
    }

    pub fn is_completed(&self) -> bool {
        self.lock_inner().state == LedgerState::Completed
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, LedgerInner> {
        // A poisoned lock means another command panicked mid-write; there is
        // no sane recovery for this session
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_open(&self, inner: &LedgerInner) -> Result<(), OrderError> {
        match inner.state {
            LedgerState::Open => Ok(()),
            LedgerState::Completed => Err(OrderError::AlreadyCompleted),
        }
    }

    /// Append one event line and flush before the command acknowledges.
    fn append_event(&self, event: &OrderEvent) -> Result<(), OrderError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = OpenOptions::new().append(true).open(&self.log_path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

fn summarize(items: &[OrderLineItem]) -> String {
    if items.is_empty() {
        return "No items".to_string();
    }

    items
        .iter()
        .map(|item| format!("{} {}", item.quantity, item.item_name))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// TESTS
// ============================================================================
