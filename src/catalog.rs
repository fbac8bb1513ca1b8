// 📖 Menu Catalog - Immutable indexed read view over the hierarchical menu
// Built once at startup, shared read-only across all concurrent sessions

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::MenuError;
use crate::models::{Menu, MenuItem};

/// Read-only, indexed view over a loaded menu.
///
/// Every query returns owned deep copies, so no caller can mutate shared
/// state through a returned value. The catalog itself is never mutated after
/// `load`, which makes `&MenuCatalog` (typically behind an `Arc`) safe to
/// share across concurrent sessions.
#[derive(Debug, Clone)]
pub struct MenuCatalog {
    categories: BTreeMap<String, Vec<MenuItem>>,
}

impl MenuCatalog {
    /// Build the catalog indices from a menu.
    ///
    /// Fails with `MenuError::Malformed` if a category holds no items or two
    /// items in one category share a name (case-insensitively).
    pub fn load(menu: Menu) -> Result<Self, MenuError> {
        for (category_name, items) in &menu.categories {
            if items.is_empty() {
                return Err(MenuError::Malformed(format!(
                    "category '{}' is empty",
                    category_name
                )));
            }

            let mut seen: HashSet<String> = HashSet::new();
            for item in items {
                if item.category_name != *category_name {
                    return Err(MenuError::Malformed(format!(
                        "item '{}' is filed under '{}' but claims category '{}'",
                        item.item_name, category_name, item.category_name
                    )));
                }
                if !seen.insert(item.item_name.to_lowercase()) {
                    return Err(MenuError::Malformed(format!(
                        "duplicate item '{}' in category '{}'",
                        item.item_name, category_name
                    )));
                }
            }
        }

        Ok(MenuCatalog {
            categories: menu.categories,
        })
    }

    /// Load a catalog straight from a hierarchical menu document file.
    pub fn load_from_file(path: &Path) -> Result<Self, MenuError> {
        let menu = Menu::load_from_file(path)?;
        Self::load(menu)
    }

    /// All items in a category, as copies. Unknown category → empty list,
    /// not an error.
    pub fn get_category(&self, category_name: &str) -> Vec<MenuItem> {
        self.categories
            .get(category_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Case-insensitive item lookup within the given category only.
    ///
    /// `None` means "not in this category" — the item may still exist
    /// elsewhere on the menu.
    pub fn get_item(&self, category_name: &str, item_name: &str) -> Option<MenuItem> {
        self.categories.get(category_name).and_then(|items| {
            items
                .iter()
                .find(|item| item.item_name.eq_ignore_ascii_case(item_name))
                .cloned()
        })
    }

    /// Case-insensitive substring search over item names, optionally scoped
    /// to one category.
    pub fn search_items(&self, keyword: &str, category: Option<&str>) -> Vec<MenuItem> {
        let keyword_lower = keyword.to_lowercase();

        let candidates: Vec<&MenuItem> = match category {
            Some(category_name) => self
                .categories
                .get(category_name)
                .map(|items| items.iter().collect())
                .unwrap_or_default(),
            None => self.categories.values().flatten().collect(),
        };

        candidates
            .into_iter()
            .filter(|item| item.item_name.to_lowercase().contains(&keyword_lower))
            .cloned()
            .collect()
    }

    /// All category names, lexicographically sorted.
    pub fn all_categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Whether a category exists.
    pub fn category_exists(&self, category_name: &str) -> bool {
        self.categories.contains_key(category_name)
    }

    /// Total item count across all categories.
    pub fn items_count(&self) -> usize {
        self.categories.values().map(|items| items.len()).sum()
    }

    /// Every item on the menu, as copies, in category order.
    pub fn all_items(&self) -> Vec<MenuItem> {
        self.categories.values().flatten().cloned().collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
