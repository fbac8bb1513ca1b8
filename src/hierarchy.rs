// 🏗️ Menu Hierarchy Builder
// One-shot batch transform: flat POS item strings → hierarchical menu document

use csv::ReaderBuilder;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;

use crate::error::MenuError;
use crate::models::{BaseEntry, MenuDocument};

// ============================================================================
// SIZE LEXICON
// ============================================================================

/// The fixed set of parenthetical tokens that split an item into a separate
/// sized base rather than an ordinary descriptor.
///
/// Injected into the builder as explicit configuration, not read from a
/// global table.
#[derive(Debug, Clone)]
pub struct SizeLexicon {
    tokens: BTreeSet<String>,
}

impl SizeLexicon {
    /// Build a lexicon from an explicit token list.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SizeLexicon {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// The standard quick-service size tokens: drink/fry sizes, kids and
    /// snack portions, biscuit builds, and nugget piece counts.
    pub fn standard() -> Self {
        SizeLexicon::new([
            "Small",
            "Medium",
            "Large",
            "Child",
            "Snack",
            "Regular Biscuit",
            "Large Biscuit",
            "4 piece",
            "6 piece",
            "10 piece",
            "20 piece",
            "40 piece",
        ])
    }

    /// Whether a parenthetical group is a recognized size token.
    pub fn is_size(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

impl Default for SizeLexicon {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// RAW STRING ANALYSIS
// ============================================================================

/// Extract the last `(...)` group of an item string.
///
/// Returns `(group_text, text_before_group)`. Earlier groups remain part of
/// the name; only the last one is size-eligible.
fn last_paren_group(item: &str) -> Option<(&str, String)> {
    let open = item.rfind('(')?;
    let close = item[open..].find(')')? + open;
    let inner = &item[open + 1..close];
    let before = item[..open].trim_end().to_string();
    Some((inner, before))
}

/// `" with "` / `" without "` clause split, earliest delimiter wins.
///
/// Returns `(left_of_clause, clause_is_without, right_of_clause)`.
fn split_first_clause(text: &str) -> Option<(&str, bool, &str)> {
    let with_pos = text.find(" with ");
    let without_pos = text.find(" without ");

    match (with_pos, without_pos) {
        (Some(w), Some(wo)) if wo < w => Some((&text[..wo], true, &text[wo + 9..])),
        (Some(w), _) => Some((&text[..w], false, &text[w + 6..])),
        (None, Some(wo)) => Some((&text[..wo], true, &text[wo + 9..])),
        (None, None) => None,
    }
}

/// Per-string parse result used for grouping.
#[derive(Debug, Clone)]
struct ParsedItem {
    raw: String,
    /// Recognized size token from the last parenthetical group, if any.
    size: Option<String>,
    /// Grouping name: text before the size group (or the whole string),
    /// truncated at the first with/without clause.
    base_name: String,
    /// Whether the raw string carries a with/without clause.
    is_variation: bool,
}

fn parse_item(raw: &str, sizes: &SizeLexicon) -> ParsedItem {
    let (size, name_text) = match last_paren_group(raw) {
        Some((group, before)) if sizes.is_size(group) => (Some(group.to_string()), before),
        _ => (None, raw.to_string()),
    };

    let base_name = match split_first_clause(&name_text) {
        Some((left, _, _)) => left.trim_end().to_string(),
        None => name_text,
    };

    ParsedItem {
        raw: raw.to_string(),
        is_variation: split_first_clause(raw).is_some(),
        size,
        base_name,
    }
}

/// Derive the variation label of a clause-bearing string.
///
/// `"X with Y"` → `"Y"`, `"X without Y"` → `"without Y"`, with a redundant
/// `(size)` annotation inside the label removed when it duplicates the
/// group's size token.
fn variation_label(raw: &str, size: Option<&str>) -> Option<String> {
    let (_, is_without, right) = split_first_clause(raw)?;

    let mut label = right.to_string();
    if let Some(size) = size {
        let annotation = format!("({})", size);
        if label.contains(&annotation) {
            label = label.replace(&annotation, "").trim().to_string();
        }
    }

    if is_without {
        Some(format!("without {}", label))
    } else {
        Some(label)
    }
}

/// Display name of a base group: `"Name (Size)"` for sized groups.
fn full_base_name(base_name: &str, size: Option<&str>) -> String {
    match size {
        Some(size) => format!("{} ({})", base_name, size),
        None => base_name.to_string(),
    }
}

// ============================================================================
// MENU HIERARCHY BUILDER
// ============================================================================

/// One input row of the flat menu source.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuRow {
    pub category: String,
    pub item: String,
}

/// Reconstructs a hierarchical menu model (base items, sizes, modifier
/// variations) from an unstructured flat item list.
///
/// The transform is heuristic and lossy by design; its exact output on known
/// menus is pinned by the golden-style tests below rather than derived from
/// first principles.
pub struct MenuHierarchyBuilder {
    size_lexicon: SizeLexicon,
    rows: Vec<MenuRow>,
}

impl MenuHierarchyBuilder {
    /// Create an empty builder with an explicit size lexicon.
    pub fn new(size_lexicon: SizeLexicon) -> Self {
        MenuHierarchyBuilder {
            size_lexicon,
            rows: Vec::new(),
        }
    }

    /// Create an empty builder with the standard size lexicon.
    pub fn with_standard_sizes() -> Self {
        Self::new(SizeLexicon::standard())
    }

    /// Append one `(category, raw item string)` pair.
    pub fn push(&mut self, category: impl Into<String>, item: impl Into<String>) {
        self.rows.push(MenuRow {
            category: category.into(),
            item: item.into(),
        });
    }

    /// Number of ingested rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Load rows from a flat CSV file with `Category` and `Item` columns.
    pub fn from_csv_file(path: &Path, size_lexicon: SizeLexicon) -> Result<Self, MenuError> {
        if !path.exists() {
            return Err(MenuError::FileNotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers = reader
            .headers()
            .map_err(|e| MenuError::Malformed(format!("unreadable CSV header: {}", e)))?;

        let category_idx = headers
            .iter()
            .position(|h| h == "Category")
            .ok_or_else(|| MenuError::Malformed("missing 'Category' column".to_string()))?;
        let item_idx = headers
            .iter()
            .position(|h| h == "Item")
            .ok_or_else(|| MenuError::Malformed("missing 'Item' column".to_string()))?;

        let mut builder = Self::new(size_lexicon);

        for (line_num, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                MenuError::Malformed(format!("bad CSV record at line {}: {}", line_num + 2, e))
            })?;

            let category = record.get(category_idx).unwrap_or("").trim();
            let item = record.get(item_idx).unwrap_or("").trim();

            if category.is_empty() || item.is_empty() {
                tracing::warn!(line = line_num + 2, "skipping menu row with empty field");
                continue;
            }

            builder.push(category, item);
        }

        Ok(builder)
    }

    /// Run the transform: group, attach variations, reconcile across sizes,
    /// and emit the deterministic hierarchical document.
    pub fn build(&self) -> MenuDocument {
        // Rows per category, in input order
        let mut by_category: BTreeMap<String, Vec<&MenuRow>> = BTreeMap::new();
        for row in &self.rows {
            by_category.entry(row.category.clone()).or_default().push(row);
        }

        let mut document = MenuDocument::new();
        for (category, rows) in by_category {
            let items: Vec<&str> = rows.iter().map(|r| r.item.as_str()).collect();
            document.insert(category, self.build_category(&items));
        }

        document
    }

    /// The per-category grouping and reconciliation passes.
    fn build_category(&self, items: &[&str]) -> BTreeMap<String, BaseEntry> {
        let parsed: Vec<ParsedItem> = items
            .iter()
            .map(|raw| parse_item(raw, &self.size_lexicon))
            .collect();

        // First pass: group by (base_name, size). A clause-free string is the
        // group's canonical base (first observed wins); clause strings are
        // candidate variations.
        let mut groups: BTreeMap<(String, Option<String>), (Option<usize>, Vec<usize>)> =
            BTreeMap::new();

        for (idx, item) in parsed.iter().enumerate() {
            let key = (item.base_name.clone(), item.size.clone());
            let group = groups.entry(key).or_insert((None, Vec::new()));
            if item.is_variation {
                group.1.push(idx);
            } else if group.0.is_none() {
                group.0 = Some(idx);
            }
        }

        // Assemble groups that have an observed base; defer the rest for the
        // cross-size reconciliation pass.
        let mut bases: BTreeMap<String, BaseEntry> = BTreeMap::new();
        let mut deferred: Vec<usize> = Vec::new();

        for ((_, size), (base_idx, variation_idxs)) in &groups {
            let Some(base_idx) = base_idx else {
                deferred.extend(variation_idxs.iter().copied());
                continue;
            };

            let mut variations = Vec::new();
            for &idx in variation_idxs {
                if let Some(label) = variation_label(&parsed[idx].raw, size.as_deref()) {
                    variations.push(label);
                }
            }

            bases.insert(
                parsed[*base_idx].raw.clone(),
                BaseEntry {
                    available_as_base: true,
                    variations,
                },
            );
        }

        // Cross-size reconciliation: a clause string whose own group has no
        // base may still belong to an existing base with the same size token
        // and a name that prefixes the string before its clause
        // ("Sausage Biscuit Deluxe with Egg (Regular Biscuit)" attaching to
        // "Sausage Biscuit (Regular Biscuit)"). Lossy on purpose.
        deferred.sort_unstable();
        let mut unmatched: Vec<usize> = Vec::new();

        for idx in deferred {
            let item = &parsed[idx];
            let mut attached = false;

            for (base_display, entry) in bases.iter_mut() {
                let base = parse_item(base_display, &self.size_lexicon);
                if base.size != item.size || !item.base_name.starts_with(&base.base_name) {
                    continue;
                }

                if let Some(label) = variation_label(&item.raw, item.size.as_deref()) {
                    entry.variations.push(label);
                }
                attached = true;
                break;
            }

            if !attached {
                unmatched.push(idx);
            }
        }

        // Remaining strings reconstruct their missing base: the constructed
        // entry is not orderable bare (a shake only ever seen with a flavor
        // clause), so available_as_base = false.
        for idx in unmatched {
            let item = &parsed[idx];

            let display = full_base_name(&item.base_name, item.size.as_deref());
            let entry = bases.entry(display).or_insert(BaseEntry {
                available_as_base: false,
                variations: Vec::new(),
            });
            if let Some(label) = variation_label(&item.raw, item.size.as_deref()) {
                entry.variations.push(label);
            }
        }

        // Deterministic output: variations deduplicated and sorted
        for entry in bases.values_mut() {
            entry.variations.sort();
            entry.variations.dedup();
        }

        bases
    }
}

// ============================================================================
// TESTS
// ============================================================================
