use anyhow::{Result, bail};
use serde::Serialize;

use cesta_core::models::{Aisle, Product, Totals};
use cesta_core::service::CestaService;

use super::helpers::{format_price, resolve_list};

pub(crate) fn cmd_show(
    svc: &CestaService,
    aisle: Option<i64>,
    list: Option<i64>,
    json: bool,
) -> Result<()> {
    let list = resolve_list(svc, list)?;
    if let Some(id) = aisle {
        if svc.get_aisle(id)?.is_none() {
            bail!("No aisle with id {id}");
        }
    }
    let products = svc.products(list.id, aisle)?;
    let totals = svc.totals(list.id)?;
    let aisles = svc.aisles()?;

    if json {
        #[derive(Serialize)]
        struct ShowOutput<'a> {
            list: &'a cesta_core::models::ShoppingList,
            products: &'a [Product],
            totals: &'a Totals,
        }
        let out = ShowOutput {
            list: &list,
            products: &products,
            totals: &totals,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let state = if list.is_archived() { " (archived)" } else { "" };
    println!("{}{state}", list.name);

    if products.is_empty() {
        eprintln!("List is empty. Use `cesta add <name>` to add something.");
        return Ok(());
    }

    // Products arrive in walk order, so one pass with a header per aisle
    // change is enough.
    let mut current_aisle: Option<i64> = None;
    for product in &products {
        if current_aisle != Some(product.aisle_id) {
            current_aisle = Some(product.aisle_id);
            println!();
            println!("{}", aisle_header(&aisles, product.aisle_id));
        }
        print_product_line(product);
    }

    println!();
    let full = totals.total_without_offers;
    let pay = totals.total_with_offers;
    let bought = totals.purchased_count;
    let count = totals.total_count;
    print!("{bought}/{count} purchased   total {pay:.2}");
    if totals.savings > 0.0 {
        let saved = totals.savings;
        print!("  (was {full:.2}, saving {saved:.2})");
    }
    println!();
    Ok(())
}

fn aisle_header(aisles: &[Aisle], aisle_id: i64) -> String {
    aisles
        .iter()
        .find(|a| a.id == aisle_id)
        .map_or_else(
            || format!("Aisle {aisle_id}"),
            |a| format!("{} {}", a.emoji, a.name).trim().to_string(),
        )
}

fn print_product_line(product: &Product) {
    let mark = if product.purchased { "x" } else { " " };
    let id = product.id;
    let name = &product.name;
    let qty = product.quantity;
    print!("  [{mark}] {name} x{qty}  [id {id}]");
    if product.unit_price.is_some() {
        let each = format_price(product.unit_price);
        let total = product.final_price_to_pay();
        print!("  {each} each = {total:.2}");
        if product.has_offer() {
            let saved = product.savings();
            print!(" (offer, saves {saved:.2})");
        }
    }
    if !product.notes.is_empty() {
        let notes = &product.notes;
        print!("  · {notes}");
    }
    println!();
}
