use anyhow::{Result, bail};
use tabled::{Table, Tabled, settings::Style};

use cesta_core::models::ProductSuggestion;
use cesta_core::service::CestaService;

use super::helpers::format_price;

fn print_suggestion_table(suggestions: &[ProductSuggestion]) {
    #[derive(Tabled)]
    struct SuggestionRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Aisle")]
        aisle: i64,
        #[tabled(rename = "Qty")]
        quantity: f64,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Used")]
        used: i64,
    }

    let rows: Vec<SuggestionRow> = suggestions
        .iter()
        .map(|s| SuggestionRow {
            name: s.name.clone(),
            aisle: s.aisle_id,
            quantity: s.suggested_quantity,
            price: format_price(s.suggested_price),
            used: s.usage_count,
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn cmd_suggest(svc: &CestaService, prefix: &str, json: bool) -> Result<()> {
    if prefix.trim().chars().count() < 2 {
        bail!("Prefix must be at least 2 characters");
    }
    let suggestions = svc.suggest(prefix)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        eprintln!("No matches for '{prefix}'");
    } else {
        print_suggestion_table(&suggestions);
    }
    Ok(())
}

pub(crate) fn cmd_frequent(svc: &CestaService, json: bool) -> Result<()> {
    let suggestions = svc.most_frequent()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else if suggestions.is_empty() {
        eprintln!("No history yet");
    } else {
        print_suggestion_table(&suggestions);
    }
    Ok(())
}

pub(crate) fn cmd_forget(svc: &CestaService, name: &str, json: bool) -> Result<()> {
    let forgotten = svc.forget(name)?;

    if json {
        println!("{}", serde_json::json!({ "forgotten": forgotten }));
    } else if forgotten {
        println!("Forgot '{name}'");
    } else {
        eprintln!("'{name}' was not in the history");
    }
    Ok(())
}
