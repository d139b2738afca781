//! Query command - search a collection manifest.

use crate::collection;
use crate::OutputFormat;
use folio_core::{make_catalog, Config, Engine};
use std::path::Path;
use std::time::Instant;

/// Run the query command.
pub fn run(
    config: Config,
    collection_path: &Path,
    pattern: &str,
    limit: usize,
    engine: Option<Engine>,
    output: OutputFormat,
) -> anyhow::Result<()> {
    let entries = collection::load(collection_path)?;
    if entries.is_empty() {
        eprintln!("Collection manifest is empty.");
        return Ok(());
    }

    let engine = engine.unwrap_or(config.general.engine);
    let mut catalog = make_catalog(engine);
    collection::stock(catalog.as_mut(), &entries);

    let start = Instant::now();
    let mut books = catalog.find(pattern);
    let elapsed = start.elapsed();

    books.truncate(limit.min(config.search.max_results));

    match output {
        OutputFormat::Text => {
            for book in &books {
                let available = catalog.available_copies(book).len();
                let total = catalog.all_copies(book).len();
                let marker = if available > 0 { "📗" } else { "📕" };
                println!("{} {} ({} of {} copies available)", marker, book, available, total);
            }

            eprintln!();
            eprintln!(
                "Found {} matches in {:.3}ms",
                books.len(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            let json_results: Vec<serde_json::Value> = books
                .iter()
                .map(|book| {
                    serde_json::json!({
                        "title": book.title(),
                        "authors": book.authors(),
                        "year": book.year(),
                        "copies": catalog.all_copies(book).len(),
                        "available": catalog.available_copies(book).len(),
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&json_results)?);
        }
    }

    Ok(())
}
