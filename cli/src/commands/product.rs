use anyhow::{Context, Result, bail};

use cesta_core::models::{NewProduct, UpdateProduct};
use cesta_core::service::CestaService;

use super::helpers::{format_price, resolve_list};

/// Pick the aisle for a new product: the explicit flag wins, then the aisle
/// remembered for this name, then the first aisle of the walk.
fn resolve_aisle(svc: &CestaService, name: &str, aisle: Option<i64>) -> Result<i64> {
    if let Some(id) = aisle {
        if svc.get_aisle(id)?.is_none() {
            bail!("No aisle with id {id}");
        }
        return Ok(id);
    }

    if let Some(hit) = svc.history_entry(name)? {
        return Ok(hit.aisle_id);
    }

    svc.aisles()?
        .first()
        .map(|a| a.id)
        .context("No aisles exist; add one with `cesta aisle add`")
}

#[allow(clippy::too_many_arguments, clippy::cast_possible_wrap)]
pub(crate) fn cmd_add(
    svc: &CestaService,
    name: &str,
    quantity: f64,
    price: Option<f64>,
    aisle: Option<i64>,
    offer: Option<i64>,
    notes: Option<&str>,
    list: Option<i64>,
    json: bool,
) -> Result<()> {
    let list = resolve_list(svc, list)?;
    let aisle_id = resolve_aisle(svc, name, aisle)?;
    if let Some(id) = offer {
        if svc.get_offer(id)?.is_none() {
            bail!("No offer with id {id}");
        }
    }
    let order_index = svc.products(list.id, Some(aisle_id))?.len() as i64;

    let product = svc.add_product(&NewProduct {
        list_id: list.id,
        aisle_id,
        name: name.to_string(),
        quantity,
        unit_price: price,
        offer_id: offer,
        notes: notes.unwrap_or_default().to_string(),
        order_index,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        let id = product.id;
        let pname = &product.name;
        let qty = product.quantity;
        print!("Added {pname} x{qty} to '{}' [id {id}]", list.name);
        if product.unit_price.is_some() {
            let total = product.final_price_to_pay();
            print!("  {total:.2}");
            if product.has_offer() {
                let saved = product.savings();
                print!(" (saves {saved:.2})");
            }
        }
        println!();
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_update(
    svc: &CestaService,
    id: i64,
    name: Option<String>,
    quantity: Option<f64>,
    price: Option<f64>,
    clear_price: bool,
    aisle: Option<i64>,
    offer: Option<i64>,
    clear_offer: bool,
    notes: Option<String>,
    json: bool,
) -> Result<()> {
    let unit_price = if clear_price {
        Some(None)
    } else {
        price.map(Some)
    };
    let offer_id = if clear_offer {
        Some(None)
    } else {
        offer.map(Some)
    };
    if let Some(Some(oid)) = offer_id {
        if svc.get_offer(oid)?.is_none() {
            bail!("No offer with id {oid}");
        }
    }
    if let Some(aid) = aisle {
        if svc.get_aisle(aid)?.is_none() {
            bail!("No aisle with id {aid}");
        }
    }

    let update = UpdateProduct {
        name,
        aisle_id: aisle,
        quantity,
        unit_price,
        offer_id,
        notes,
        order_index: None,
    };
    let product = svc.update_product(id, &update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        let pname = &product.name;
        let qty = product.quantity;
        let total = format_price(product.unit_price.map(|_| product.final_price_to_pay()));
        println!("Updated {pname} x{qty}  total {total}");
    }
    Ok(())
}

pub(crate) fn cmd_remove(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    if !svc.delete_product(id)? {
        bail!("No product with id {id}");
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": true }));
    } else {
        println!("Product {id} removed");
    }
    Ok(())
}

pub(crate) fn cmd_toggle(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    let product = svc.toggle_purchased(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&product)?);
    } else {
        let name = &product.name;
        let state = if product.purchased {
            "purchased"
        } else {
            "pending"
        };
        println!("{name} is now {state}");
    }
    Ok(())
}

pub(crate) fn cmd_clear(
    svc: &CestaService,
    purchased: bool,
    list: Option<i64>,
    json: bool,
) -> Result<()> {
    let list = resolve_list(svc, list)?;
    let removed = if purchased {
        svc.clear_purchased(list.id)?
    } else {
        svc.clear_list(list.id)?
    };

    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else if removed == 0 {
        eprintln!("Nothing to remove");
    } else {
        let what = if purchased {
            "purchased product(s)"
        } else {
            "product(s)"
        };
        println!("Removed {removed} {what} from '{}'", list.name);
    }
    Ok(())
}
