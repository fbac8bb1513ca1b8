// 🔍 Match Resolver - Exact and fuzzy name resolution against the catalog
// Resolution order: case-insensitive exact match, then normalized
// edit-similarity above a configurable threshold

use serde::{Deserialize, Serialize};

use crate::catalog::MenuCatalog;
use crate::models::MenuItem;

// ============================================================================
// SIMILARITY SCORER
// ============================================================================

/// Normalized edit similarity between two strings, scored 0–100.
///
/// Case-insensitive: both inputs are lowercased before the edit distance is
/// taken. 100 means equal, 0 means nothing in common.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let len_max = len_a.max(len_b);

    if len_max == 0 {
        return 100.0;
    }

    let distance = levenshtein_distance(&a, &b);
    100.0 * (1.0 - distance as f64 / len_max as f64)
}

/// Minimum number of single-character edits (insertions, deletions,
/// substitutions) to turn one string into the other.
fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    if len1 == 0 {
        return len2;
    }
    if len2 == 0 {
        return len1;
    }

    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] { 0 } else { 1 };

            matrix[i][j] = std::cmp::min(
                std::cmp::min(
                    matrix[i - 1][j] + 1, // deletion
                    matrix[i][j - 1] + 1, // insertion
                ),
                matrix[i - 1][j - 1] + cost, // substitution
            );
        }
    }

    matrix[len1][len2]
}

// ============================================================================
// MATCH RESULT
// ============================================================================

/// Why a resolution attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchFailureReason {
    /// No catalog entry cleared the acceptance threshold.
    ItemNotResolved,

    /// The item exists on the menu, but not in the stated category.
    CategoryMismatch,

    /// The item takes no modifiers, yet modifiers were requested.
    ModifierNotAvailable,

    /// One or more requested modifiers matched nothing on the item.
    ModifierNotResolved,
}

/// Structured description of a failed resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFailure {
    pub reason: MatchFailureReason,

    /// Human-readable explanation, including the candidate list where that
    /// helps diagnostics.
    pub message: String,

    /// Exactly the requested modifier names that matched nothing. Empty for
    /// item-resolution failures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmatched: Vec<String>,
}

/// Outcome of an item or modifier resolution.
///
/// Failures are ordinary values recovered locally by the caller, never
/// propagated errors: the command that carried them leaves all state
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub is_valid: bool,

    /// The matched catalog item (an owned copy) when resolution succeeded.
    pub matched_item: Option<MenuItem>,

    /// Confidence score 0–100; 100 for exact matches.
    pub confidence: f64,

    pub failure: Option<MatchFailure>,
}

impl MatchResult {
    fn matched(item: MenuItem, confidence: f64) -> Self {
        MatchResult {
            is_valid: true,
            matched_item: Some(item),
            confidence,
            failure: None,
        }
    }

    fn failed(reason: MatchFailureReason, message: String) -> Self {
        MatchResult {
            is_valid: false,
            matched_item: None,
            confidence: 0.0,
            failure: Some(MatchFailure {
                reason,
                message,
                unmatched: Vec::new(),
            }),
        }
    }

    /// The failure message, when there is one.
    pub fn error_message(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }
}

// ============================================================================
// MATCH RESOLVER
// ============================================================================

/// Acceptance thresholds, injected at construction time.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Minimum similarity for a fuzzy item match (default 85).
    pub item_threshold: f64,

    /// Minimum similarity for a fuzzy modifier match (default 85; call sites
    /// that tolerate transcription typos may relax to 70).
    pub modifier_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            item_threshold: 85.0,
            modifier_threshold: 85.0,
        }
    }
}

/// Resolves free-form item and modifier names against a catalog.
pub struct MatchResolver {
    config: MatchConfig,
}

impl MatchResolver {
    pub fn new(config: MatchConfig) -> Self {
        MatchResolver { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(MatchConfig::default())
    }

    /// Resolve an item name, optionally scoped to a category.
    ///
    /// Exact match wins with confidence 100 and no further search; otherwise
    /// the best fuzzy candidate is accepted if it clears the item threshold
    /// (ties broken by first occurrence in catalog order). When the stated
    /// category misses but another category holds an exact match, the
    /// failure reports the mismatch instead of a plain not-found.
    pub fn resolve_item(
        &self,
        requested: &str,
        category: Option<&str>,
        catalog: &MenuCatalog,
    ) -> MatchResult {
        if requested.trim().is_empty() {
            return MatchResult::failed(
                MatchFailureReason::ItemNotResolved,
                "Item name cannot be empty".to_string(),
            );
        }

        let candidates = match category {
            Some(category_name) => catalog.get_category(category_name),
            None => catalog.all_items(),
        };

        // Exact match first (case-insensitive)
        if let Some(item) = candidates
            .iter()
            .find(|item| item.item_name.eq_ignore_ascii_case(requested))
        {
            return MatchResult::matched(item.clone(), 100.0);
        }

        // Fuzzy fallback
        let mut best: Option<(&MenuItem, f64)> = None;
        for item in &candidates {
            let score = similarity(requested, &item.item_name);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((item, score));
            }
        }

        if let Some((item, score)) = best {
            if score >= self.config.item_threshold {
                return MatchResult::matched(item.clone(), score);
            }
        }

        // The stated category missed entirely; if the item lives elsewhere,
        // say so rather than claiming it does not exist
        if let Some(category_name) = category {
            if let Some(elsewhere) = catalog
                .all_items()
                .into_iter()
                .find(|item| item.item_name.eq_ignore_ascii_case(requested))
            {
                return MatchResult::failed(
                    MatchFailureReason::CategoryMismatch,
                    format!(
                        "'{}' is not in category '{}' (found in '{}')",
                        elsewhere.item_name, category_name, elsewhere.category_name
                    ),
                );
            }
        }

        let candidate_names: Vec<String> =
            candidates.iter().map(|item| item.item_name.clone()).collect();
        MatchResult::failed(
            MatchFailureReason::ItemNotResolved,
            format!(
                "No menu item found matching '{}' (candidates: {:?})",
                requested, candidate_names
            ),
        )
    }

    /// Validate requested modifiers against a resolved item.
    ///
    /// An empty request is always valid. A non-empty request against an item
    /// with no modifiers fails immediately. Otherwise every requested name
    /// must resolve exactly or fuzzily above `threshold`; any miss rejects
    /// the whole request and lists exactly the unmatched names, so callers
    /// never apply a subset of modifiers.
    pub fn resolve_modifiers(
        &self,
        item: &MenuItem,
        requested: &[String],
        threshold: f64,
    ) -> MatchResult {
        if requested.is_empty() {
            return MatchResult::matched(item.clone(), 100.0);
        }

        let available = item.modifier_names();

        if available.is_empty() {
            return MatchResult::failed(
                MatchFailureReason::ModifierNotAvailable,
                format!(
                    "Item '{}' has no modifiers available, but modifiers were requested: {:?}",
                    item.item_name, requested
                ),
            );
        }

        let mut unmatched: Vec<String> = Vec::new();
        for name in requested {
            let exact = available.iter().any(|m| m.eq_ignore_ascii_case(name));
            if exact {
                continue;
            }

            let best = available
                .iter()
                .map(|m| similarity(name, m))
                .fold(0.0_f64, f64::max);
            if best < threshold {
                unmatched.push(name.clone());
            }
        }

        if !unmatched.is_empty() {
            let message = format!(
                "Invalid modifiers for '{}': {:?}. Available modifiers: {:?}",
                item.item_name, unmatched, available
            );
            return MatchResult {
                is_valid: false,
                matched_item: None,
                confidence: 0.0,
                failure: Some(MatchFailure {
                    reason: MatchFailureReason::ModifierNotResolved,
                    message,
                    unmatched,
                }),
            };
        }

        MatchResult::matched(item.clone(), 100.0)
    }

    /// Complete validation: item exists, then its modifiers are valid.
    /// Item-resolution failure short-circuits.
    pub fn validate_order_item(
        &self,
        item_name: &str,
        category: Option<&str>,
        modifiers: &[String],
        catalog: &MenuCatalog,
    ) -> MatchResult {
        let item_result = self.resolve_item(item_name, category, catalog);

        match &item_result.matched_item {
            Some(item) if item_result.is_valid => {
                self.resolve_modifiers(item, modifiers, self.config.modifier_threshold)
            }
            _ => item_result,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
