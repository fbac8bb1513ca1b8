// 🍔 Menu Data Model
// Modifiers, items, and the hierarchical menu document

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::MenuError;

// ============================================================================
// MODIFIER
// ============================================================================

/// A single customization option attached to a menu item.
///
/// Identity is the `modifier_id`: two modifiers with the same name but
/// different ids are distinct entities, and two with the same id are equal
/// regardless of name. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Modifier {
    #[serde(default = "default_uuid")]
    pub modifier_id: String,

    pub modifier_name: String,
}

fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Modifier {
    /// Create a modifier with a fresh UUID identity.
    pub fn new(modifier_name: impl Into<String>) -> Self {
        Modifier {
            modifier_id: default_uuid(),
            modifier_name: modifier_name.into(),
        }
    }

    /// Create a modifier with a caller-supplied id (used when reloading
    /// persisted menus).
    pub fn with_id(modifier_name: impl Into<String>, modifier_id: impl Into<String>) -> Self {
        Modifier {
            modifier_id: modifier_id.into(),
            modifier_name: modifier_name.into(),
        }
    }
}

// Identity is the id, not the name
impl PartialEq for Modifier {
    fn eq(&self, other: &Self) -> bool {
        self.modifier_id == other.modifier_id
    }
}

impl Eq for Modifier {}

impl std::hash::Hash for Modifier {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.modifier_id.hash(state);
    }
}

// ============================================================================
// MENU ITEM
// ============================================================================

/// An orderable menu entry within one category.
///
/// `available_as_base = false` marks items that cannot be ordered without
/// selecting at least one modifier (a shake that always needs a flavor).
/// Items are immutable once placed in a catalog; every read across the
/// catalog boundary returns an owned copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub category_name: String,

    pub item_name: String,

    pub available_as_base: bool,

    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl MenuItem {
    /// Create an item with no modifiers.
    pub fn new(
        category_name: impl Into<String>,
        item_name: impl Into<String>,
        available_as_base: bool,
    ) -> Self {
        MenuItem {
            category_name: category_name.into(),
            item_name: item_name.into(),
            available_as_base,
            modifiers: Vec::new(),
        }
    }

    /// Append a freshly-identified modifier and return a copy of it.
    pub fn add_modifier(&mut self, modifier_name: impl Into<String>) -> Modifier {
        let modifier = Modifier::new(modifier_name);
        self.modifiers.push(modifier.clone());
        modifier
    }

    /// Names of all modifiers in display order.
    pub fn modifier_names(&self) -> Vec<String> {
        self.modifiers
            .iter()
            .map(|m| m.modifier_name.clone())
            .collect()
    }
}

// ============================================================================
// HIERARCHICAL MENU DOCUMENT
// ============================================================================

/// One base item entry in the hierarchical menu document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseEntry {
    pub available_as_base: bool,

    /// Variation labels, deduplicated and lexicographically sorted.
    pub variations: Vec<String>,
}

/// The document produced by the hierarchy builder and consumed by the
/// catalog: category name → base item display name → entry. BTreeMaps keep
/// categories and base names in deterministic lexicographic order.
pub type MenuDocument = BTreeMap<String, BTreeMap<String, BaseEntry>>;

// ============================================================================
// MENU
// ============================================================================

/// The complete menu as loaded into memory: category → ordered item list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<MenuItem>>,
}

impl Menu {
    /// Create an empty menu.
    pub fn new() -> Self {
        Menu::default()
    }

    /// Add an item under its own category, creating the category on first use.
    pub fn add_item(&mut self, item: MenuItem) {
        self.categories
            .entry(item.category_name.clone())
            .or_default()
            .push(item);
    }

    /// All items in a category, in insertion order. Unknown category → empty.
    pub fn get_category(&self, category_name: &str) -> Vec<MenuItem> {
        self.categories
            .get(category_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Case-insensitive item lookup within one category only.
    ///
    /// `None` means "not in this category", not "not on the menu".
    pub fn get_item(&self, category_name: &str, item_name: &str) -> Option<MenuItem> {
        self.categories.get(category_name).and_then(|items| {
            items
                .iter()
                .find(|item| item.item_name.eq_ignore_ascii_case(item_name))
                .cloned()
        })
    }

    /// All category names, lexicographically sorted.
    pub fn get_all_categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    /// Build a menu from the hierarchical document format.
    ///
    /// Each variation label becomes a `Modifier` with a fresh id.
    pub fn from_document(document: &MenuDocument) -> Self {
        let mut menu = Menu::new();

        for (category_name, bases) in document {
            for (base_name, entry) in bases {
                let mut item =
                    MenuItem::new(category_name.clone(), base_name.clone(), entry.available_as_base);
                for variation in &entry.variations {
                    item.add_modifier(variation.clone());
                }
                menu.add_item(item);
            }
        }

        menu
    }

    /// Serialize the menu to pretty JSON.
    pub fn to_json(&self) -> Result<String, MenuError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a menu from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a menu from a hierarchical document JSON file (the format the
    /// transform step writes, see §`hierarchy`).
    pub fn load_from_file(path: &Path) -> Result<Self, MenuError> {
        if !path.exists() {
            return Err(MenuError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;
        let document: MenuDocument = serde_json::from_str(&contents)?;
        Ok(Menu::from_document(&document))
    }

    /// Save the menu in its JSON form.
    pub fn save_to_file(&self, path: &Path) -> Result<(), MenuError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_creation() {
        let modifier = Modifier::new("Egg Whites");
        assert_eq!(modifier.modifier_name, "Egg Whites");
        assert!(!modifier.modifier_id.is_empty());
    }

    #[test]
    fn test_modifier_ids_are_unique() {
        let modifier1 = Modifier::new("Cheese");
        let modifier2 = Modifier::new("Cheese");
        assert_ne!(modifier1.modifier_id, modifier2.modifier_id);
    }

    #[test]
    fn test_modifier_equality_is_by_id() {
        let modifier1 = Modifier::with_id("Cheese", "id1");
        let modifier2 = Modifier::with_id("Cheese", "id1");
        let modifier3 = Modifier::with_id("Cheese", "id2");

        assert_eq!(modifier1, modifier2);
        assert_ne!(modifier1, modifier3);
    }

    #[test]
    fn test_modifier_in_set() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Modifier::with_id("Cheese", "id1"));
        set.insert(Modifier::with_id("Bacon", "id2"));
        set.insert(Modifier::with_id("Cheese", "id1"));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_modifier_json_roundtrip() {
        let modifier = Modifier::with_id("Egg Whites", "test-id");
        let json = serde_json::to_string(&modifier).unwrap();
        let restored: Modifier = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.modifier_name, "Egg Whites");
        assert_eq!(restored.modifier_id, "test-id");
    }

    #[test]
    fn test_item_creation_without_modifiers() {
        let item = MenuItem::new("Breakfast", "Egg McMuffin", true);

        assert_eq!(item.category_name, "Breakfast");
        assert_eq!(item.item_name, "Egg McMuffin");
        assert!(item.available_as_base);
        assert!(item.modifiers.is_empty());
    }

    #[test]
    fn test_item_add_modifier() {
        let mut item = MenuItem::new("Beef & Pork", "Quarter Pounder", true);

        let modifier = item.add_modifier("Cheese");

        assert_eq!(item.modifiers.len(), 1);
        assert_eq!(modifier.modifier_name, "Cheese");
        assert!(item.modifiers.contains(&modifier));
    }

    #[test]
    fn test_item_not_available_as_base() {
        let mut item = MenuItem::new("Smoothies & Shakes", "McFlurry", false);
        item.add_modifier("M&Ms Candies");
        item.add_modifier("Oreo Cookies");

        assert!(!item.available_as_base);
        assert_eq!(item.modifiers.len(), 2);
    }

    #[test]
    fn test_item_json_deserialization() {
        let json = r#"
        {
            "category_name": "Breakfast",
            "item_name": "Egg McMuffin",
            "available_as_base": true,
            "modifiers": [
                {"modifier_name": "Cheese", "modifier_id": "id1"}
            ]
        }
        "#;
        let item: MenuItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.category_name, "Breakfast");
        assert_eq!(item.item_name, "Egg McMuffin");
        assert!(item.available_as_base);
        assert_eq!(item.modifiers.len(), 1);
        assert_eq!(item.modifiers[0].modifier_name, "Cheese");
    }

    #[test]
    fn test_menu_add_and_get_category() {
        let mut menu = Menu::new();
        menu.add_item(MenuItem::new("Breakfast", "Egg McMuffin", true));
        menu.add_item(MenuItem::new("Breakfast", "Hash Brown", true));

        assert_eq!(menu.categories.len(), 1);
        let items = menu.get_category("Breakfast");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_name, "Egg McMuffin");
        assert_eq!(items[1].item_name, "Hash Brown");
    }

    #[test]
    fn test_menu_get_nonexistent_category() {
        let menu = Menu::new();
        assert!(menu.get_category("NonExistent").is_empty());
    }

    #[test]
    fn test_menu_get_item_case_insensitive() {
        let mut menu = Menu::new();
        menu.add_item(MenuItem::new("Breakfast", "Egg McMuffin", true));

        let found = menu.get_item("Breakfast", "egg mcmuffin");
        assert!(found.is_some());
        assert_eq!(found.unwrap().item_name, "Egg McMuffin");

        // Wrong category misses even though the item exists elsewhere
        assert!(menu.get_item("Beverages", "Egg McMuffin").is_none());
    }

    #[test]
    fn test_menu_from_document() {
        let mut breakfast = BTreeMap::new();
        breakfast.insert(
            "Egg McMuffin".to_string(),
            BaseEntry {
                available_as_base: true,
                variations: vec![],
            },
        );
        breakfast.insert(
            "Big Breakfast".to_string(),
            BaseEntry {
                available_as_base: true,
                variations: vec!["Egg Whites".to_string(), "Hotcakes".to_string()],
            },
        );

        let mut document = MenuDocument::new();
        document.insert("Breakfast".to_string(), breakfast);

        let menu = Menu::from_document(&document);

        let big_breakfast = menu.get_item("Breakfast", "Big Breakfast").unwrap();
        assert_eq!(big_breakfast.modifiers.len(), 2);
        let names = big_breakfast.modifier_names();
        assert!(names.contains(&"Egg Whites".to_string()));
        assert!(names.contains(&"Hotcakes".to_string()));

        let egg_mcmuffin = menu.get_item("Breakfast", "Egg McMuffin").unwrap();
        assert!(egg_mcmuffin.modifiers.is_empty());
    }

    #[test]
    fn test_menu_load_from_document_file() {
        let dir = std::env::temp_dir().join(format!("menu-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("menu.json");

        std::fs::write(
            &path,
            r#"
            {
                "Breakfast": {
                    "Egg McMuffin": {"available_as_base": true, "variations": []},
                    "Big Breakfast": {"available_as_base": true, "variations": ["Egg Whites", "Hotcakes"]}
                },
                "Beef & Pork": {
                    "Big Mac": {"available_as_base": true, "variations": []}
                }
            }
            "#,
        )
        .unwrap();

        let menu = Menu::load_from_file(&path).unwrap();

        assert_eq!(menu.categories.len(), 2);
        assert!(menu.get_item("Beef & Pork", "Big Mac").is_some());
        let big_breakfast = menu.get_item("Breakfast", "Big Breakfast").unwrap();
        assert_eq!(big_breakfast.modifiers.len(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_menu_load_missing_file() {
        let result = Menu::load_from_file(Path::new("/definitely/not/here/menu.json"));
        assert!(matches!(result, Err(MenuError::FileNotFound(_))));
    }

    #[test]
    fn test_menu_get_all_categories_sorted() {
        let mut menu = Menu::new();
        menu.add_item(MenuItem::new("Desserts", "Baked Apple Pie", true));
        menu.add_item(MenuItem::new("Breakfast", "Hash Brown", true));

        assert_eq!(menu.get_all_categories(), vec!["Breakfast", "Desserts"]);
    }

    #[test]
    fn test_menu_save_to_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("menu-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("saved.json");

        let mut menu = Menu::new();
        let mut item = MenuItem::new("Breakfast", "Egg McMuffin", true);
        item.add_modifier("Cheese");
        menu.add_item(item);

        menu.save_to_file(&path).unwrap();
        let restored = Menu::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(restored.get_category("Breakfast").len(), 1);
        assert_eq!(
            restored.get_item("Breakfast", "Egg McMuffin").unwrap().modifiers.len(),
            1
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_menu_json_roundtrip() {
        let mut menu = Menu::new();
        let mut item = MenuItem::new("Breakfast", "Test Item", true);
        item.modifiers.push(Modifier::with_id("Mod1", "id1"));
        item.modifiers.push(Modifier::with_id("Mod2", "id2"));
        menu.add_item(item);

        let json = menu.to_json().unwrap();
        let restored = Menu::from_json(&json).unwrap();

        let loaded = restored.get_item("Breakfast", "Test Item").unwrap();
        assert_eq!(loaded.modifiers.len(), 2);
        assert_eq!(loaded.modifiers[0].modifier_id, "id1");
        assert_eq!(loaded.modifiers[1].modifier_id, "id2");
    }
}
