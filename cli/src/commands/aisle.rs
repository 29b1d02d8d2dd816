use anyhow::{Result, bail};

use cesta_core::service::CestaService;

pub(crate) fn cmd_aisle_add(svc: &CestaService, name: &str, emoji: &str, json: bool) -> Result<()> {
    let aisle = svc.add_aisle(name, emoji)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&aisle)?);
    } else {
        let id = aisle.id;
        let name = &aisle.name;
        println!("Added aisle {id}: {name} (position {})", aisle.order_index);
    }
    Ok(())
}

pub(crate) fn cmd_aisle_delete(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    if !svc.delete_aisle(id)? {
        bail!("Aisle {id} does not exist or is a default aisle");
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": true }));
    } else {
        println!("Aisle {id} deleted");
    }
    Ok(())
}

pub(crate) fn cmd_aisle_reorder(svc: &CestaService, ids: &[i64], json: bool) -> Result<()> {
    svc.reorder_aisles(ids)?;
    let aisles = svc.aisles()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&aisles)?);
    } else {
        println!("Aisles reordered:");
        for aisle in &aisles {
            let emoji = &aisle.emoji;
            let name = &aisle.name;
            println!("  {:>2}. {emoji} {name}", aisle.order_index + 1);
        }
    }
    Ok(())
}

pub(crate) fn cmd_aisle_list(svc: &CestaService, json: bool) -> Result<()> {
    let aisles = svc.aisles()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&aisles)?);
        return Ok(());
    }

    for aisle in &aisles {
        let id = aisle.id;
        let emoji = &aisle.emoji;
        let name = &aisle.name;
        let tag = if aisle.is_default { "" } else { "  (custom)" };
        println!("{:>2}. {emoji} {name}  [id {id}]{tag}", aisle.order_index + 1);
    }
    Ok(())
}
