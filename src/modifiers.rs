// Common modifiers available for menu items without predefined modifiers
// Injected as explicit configuration, not read from a hidden global

use std::collections::BTreeMap;

use crate::matching::similarity;

/// Per-category table of standard modifiers (Extra Cheese, No Pickles, ...).
///
/// Used as a fallback when a menu item carries no predefined modifiers of
/// its own. Immutable after construction; pass a reference wherever it is
/// needed.
#[derive(Debug, Clone, Default)]
pub struct CommonModifierTable {
    by_category: BTreeMap<String, Vec<String>>,
}

impl CommonModifierTable {
    /// Empty table: no fallback modifiers anywhere.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from explicit `(category, modifiers)` pairs.
    pub fn new<I, S, M>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<M>)>,
        S: Into<String>,
        M: Into<String>,
    {
        CommonModifierTable {
            by_category: entries
                .into_iter()
                .map(|(category, modifiers)| {
                    (
                        category.into(),
                        modifiers.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    /// The standard quick-service table covering the usual categories.
    pub fn standard() -> Self {
        Self::new([
            (
                "Beef & Pork",
                vec![
                    "Extra Cheese",
                    "No Cheese",
                    "Extra Pickles",
                    "No Pickles",
                    "Extra Onions",
                    "No Onions",
                    "Extra Ketchup",
                    "No Ketchup",
                    "Extra Mustard",
                    "No Mustard",
                    "Extra Lettuce",
                    "No Lettuce",
                    "Extra Tomato",
                    "No Tomato",
                    "Extra Mac Sauce",
                    "No Mac Sauce",
                    "Add Bacon",
                    "No Bacon",
                ],
            ),
            (
                "Chicken & Fish",
                vec![
                    "Extra Cheese",
                    "No Cheese",
                    "Extra Lettuce",
                    "No Lettuce",
                    "Extra Mayo",
                    "No Mayo",
                    "Extra Pickles",
                    "No Pickles",
                    "Spicy",
                    "No Sauce",
                    "Extra Sauce",
                    "Add Bacon",
                    "No Bacon",
                ],
            ),
            (
                "Breakfast",
                vec![
                    "Egg Whites",
                    "No Egg",
                    "Extra Egg",
                    "Add Bacon",
                    "No Bacon",
                    "Add Sausage",
                    "No Sausage",
                    "Extra Cheese",
                    "No Cheese",
                    "No Butter",
                    "Extra Hash Brown",
                ],
            ),
            (
                "Snacks & Sides",
                vec![
                    "Extra Salt",
                    "No Salt",
                    "Extra Sauce",
                    "No Sauce",
                    "Ketchup",
                    "Ranch",
                    "BBQ Sauce",
                    "Sweet & Sour Sauce",
                    "Honey Mustard",
                ],
            ),
            (
                "Beverages",
                vec![
                    "No Ice",
                    "Light Ice",
                    "Extra Ice",
                    "No Sugar",
                    "Extra Sugar",
                    "No Cream",
                    "Extra Cream",
                ],
            ),
            (
                "Coffee & Tea",
                vec![
                    "No Sugar",
                    "Extra Sugar",
                    "No Cream",
                    "Extra Cream",
                    "Skim Milk",
                    "Whole Milk",
                    "Almond Milk",
                    "Decaf",
                ],
            ),
            (
                "Desserts",
                vec![
                    "Extra Caramel",
                    "Extra Chocolate",
                    "Extra Whipped Cream",
                    "No Whipped Cream",
                    "Extra Sprinkles",
                ],
            ),
            (
                "Smoothies & Shakes",
                vec![
                    "No Whipped Cream",
                    "Extra Whipped Cream",
                    "No Cherry",
                    "Extra Syrup",
                    "Light Syrup",
                ],
            ),
        ])
    }

    /// All common modifiers for a category; empty for unknown categories.
    pub fn for_category(&self, category: &str) -> &[String] {
        self.by_category
            .get(category)
            .map(|mods| mods.as_slice())
            .unwrap_or(&[])
    }

    /// Resolve a requested modifier against the category's table,
    /// exact-then-fuzzy, returning the canonical modifier name on a hit.
    pub fn match_for_category(
        &self,
        modifier: &str,
        category: &str,
        threshold: f64,
    ) -> Option<String> {
        let common = self.by_category.get(category)?;

        // Exact match first (case-insensitive)
        if let Some(hit) = common.iter().find(|m| m.eq_ignore_ascii_case(modifier)) {
            return Some(hit.clone());
        }

        let mut best: Option<(&String, f64)> = None;
        for candidate in common {
            let score = similarity(modifier, candidate);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) if score >= threshold => Some(candidate.clone()),
            _ => None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
