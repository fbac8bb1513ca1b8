use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::Path;

// Use library instead of local modules
use drive_thru_core::{logging, Menu, MenuCatalog, MenuDocument, MenuHierarchyBuilder, SizeLexicon};

fn main() -> Result<()> {
    logging::setup_tracing();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("transform") if args.len() == 4 => {
            run_transform(Path::new(&args[2]), Path::new(&args[3]))
        }
        Some("stats") if args.len() == 3 => run_stats(Path::new(&args[2])),
        _ => {
            eprintln!("Usage:");
            eprintln!("  drive-thru-core transform <menu-items.csv> <menu-structure.json>");
            eprintln!("  drive-thru-core stats <menu-structure.json>");
            std::process::exit(2);
        }
    }
}

/// One-shot batch transform: flat POS item CSV → hierarchical menu JSON.
fn run_transform(input: &Path, output: &Path) -> Result<()> {
    println!("🏗️  Menu Transform - flat CSV → hierarchical JSON");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading menu items...");
    let builder = MenuHierarchyBuilder::from_csv_file(input, SizeLexicon::standard())
        .with_context(|| format!("Failed to read menu source: {}", input.display()))?;
    println!("✓ Loaded {} item rows", builder.row_count());

    println!("\n🔧 Building hierarchy...");
    let document = builder.build();

    let json = serde_json::to_string_pretty(&document)?;
    fs::write(output, json)
        .with_context(|| format!("Failed to write menu document: {}", output.display()))?;
    println!("✓ Wrote {}", output.display());

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    print_document_stats(&document);

    Ok(())
}

/// Validate a menu document and report its shape.
fn run_stats(input: &Path) -> Result<()> {
    println!("🔍 Menu Validation");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let contents = fs::read_to_string(input)
        .with_context(|| format!("Failed to read menu document: {}", input.display()))?;
    let document: MenuDocument =
        serde_json::from_str(&contents).context("Menu document is not valid JSON")?;

    // Round the document through catalog loading so index-time checks run
    let menu = Menu::from_document(&document);
    MenuCatalog::load(menu).context("Menu document failed catalog validation")?;

    println!("✓ Menu document is valid");
    print_document_stats(&document);

    Ok(())
}

fn print_document_stats(document: &MenuDocument) {
    let mut total_items = 0;
    let mut items_with_variations = 0;
    let mut total_variations = 0;
    let mut items_not_available_as_base = 0;

    for bases in document.values() {
        total_items += bases.len();
        for entry in bases.values() {
            if !entry.variations.is_empty() {
                items_with_variations += 1;
                total_variations += entry.variations.len();
            }
            if !entry.available_as_base {
                items_not_available_as_base += 1;
            }
        }
    }

    println!("\n  Statistics:");
    println!("  - Categories: {}", document.len());
    println!("  - Total items: {}", total_items);
    println!("  - Items with variations: {}", items_with_variations);
    println!("  - Total variations: {}", total_variations);
    println!(
        "  - Items requiring variation selection: {}",
        items_not_available_as_base
    );
}
