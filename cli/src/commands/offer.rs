use anyhow::{Result, bail};
use tabled::{Table, Tabled, settings::Style};

use cesta_core::offers::OFFER_CODES;
use cesta_core::service::CestaService;

use super::helpers::truncate;

pub(crate) fn cmd_offer_add(
    svc: &CestaService,
    code: &str,
    name: &str,
    description: &str,
    formula: &str,
    json: bool,
) -> Result<()> {
    let offer = svc.add_offer(code, name, description, formula)?;
    let recognized = OFFER_CODES.iter().any(|(c, _, _)| *c == code);

    if json {
        println!("{}", serde_json::to_string_pretty(&offer)?);
    } else {
        let id = offer.id;
        println!("Added offer {id}: {name} ({code})");
        if !recognized {
            eprintln!("Note: '{code}' is not a recognized pricing code; products using it pay full list price");
        }
    }
    Ok(())
}

pub(crate) fn cmd_offer_delete(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    if !svc.delete_offer(id)? {
        bail!("Offer {id} does not exist or is a built-in offer");
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": true }));
    } else {
        println!("Offer {id} deleted");
    }
    Ok(())
}

pub(crate) fn cmd_offer_list(svc: &CestaService, json: bool) -> Result<()> {
    let offers = svc.offers()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&offers)?);
        return Ok(());
    }

    #[derive(Tabled)]
    struct OfferRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Code")]
        code: String,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Description")]
        description: String,
    }

    let rows: Vec<OfferRow> = offers
        .iter()
        .map(|o| OfferRow {
            id: o.id,
            code: o.code.clone(),
            name: o.name.clone(),
            description: truncate(&o.description, 40),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
