//! Demo command - a scripted walkthrough of the catalog operations.

use folio_core::{make_catalog, Book, Condition, Config};

/// Run the demo command.
pub fn run(config: Config) -> anyhow::Result<()> {
    let mut catalog = make_catalog(config.general.engine);

    println!("Folio demo ({} engine)", config.general.engine);
    println!();

    // Stock a small shelf
    let left_hand = Book::new(
        "The Left Hand of Darkness",
        vec!["Ursula K. Le Guin".to_string()],
        1969,
    );
    let dispossessed = Book::new(
        "The Dispossessed",
        vec!["Ursula K. Le Guin".to_string()],
        1974,
    );
    let good_omens = Book::new(
        "Good Omens",
        vec!["Terry Pratchett".to_string(), "Neil Gaiman".to_string()],
        1990,
    );

    println!("Buying copies:");
    let reading_copy = catalog.buy(left_hand.clone());
    catalog.buy(left_hand.clone());
    catalog.buy(dispossessed.clone());
    catalog.buy(good_omens.clone());
    for book in [&left_hand, &dispossessed, &good_omens] {
        println!(
            "  📗 {} ({} copies)",
            book,
            catalog.all_copies(book).len()
        );
    }
    println!();

    // A patron checks out one copy of The Left Hand of Darkness
    catalog.checkout(&reading_copy)?;
    println!("Checked out {}", reading_copy);
    println!(
        "  {} of {} copies still available",
        catalog.available_copies(&left_hand).len(),
        catalog.all_copies(&left_hand).len()
    );
    println!();

    // Fuzzy searches against titles and authors
    for query in ["left hand", "le guin", "good omen"] {
        println!("find(\"{}\"):", query);
        for book in catalog.find(query) {
            let available = catalog.available_copies(&book).len();
            let marker = if available > 0 { "📗" } else { "📕" };
            println!("  {} {} ({} available)", marker, book, available);
        }
        println!();
    }

    // The copy comes back damaged
    reading_copy.set_condition(Condition::Damaged);
    catalog.checkin(&reading_copy)?;
    println!("Checked in {}", reading_copy);
    println!();

    let stats = catalog.stats();
    println!(
        "Catalog: {} copies of {} books ({} available, {} checked out)",
        stats.total_copies, stats.distinct_books, stats.available_copies, stats.checked_out_copies
    );

    Ok(())
}
