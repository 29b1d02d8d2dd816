use anyhow::{Result, bail};
use tabled::{Table, Tabled, settings::Style};

use cesta_core::service::CestaService;

pub(crate) fn cmd_list_create(svc: &CestaService, name: &str, json: bool) -> Result<()> {
    let list = svc.create_list(name)?;
    svc.select_list(list.id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        let id = list.id;
        let name = &list.name;
        println!("Created and selected list {id}: {name}");
    }
    Ok(())
}

pub(crate) fn cmd_list_rename(svc: &CestaService, id: i64, name: &str, json: bool) -> Result<()> {
    svc.rename_list(id, name)?;

    if json {
        println!("{}", serde_json::json!({ "renamed": true }));
    } else {
        println!("List {id} renamed to {name}");
    }
    Ok(())
}

pub(crate) fn cmd_list_archive(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    let archived = svc.archive_list(id)?;
    if !archived {
        bail!("List {id} is not an active list");
    }
    let selected = svc.selected_list()?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "archived": true, "selected": selected })
        );
    } else {
        println!("List {id} archived");
        if selected.id != id {
            let name = &selected.name;
            println!("Selected list is now {}: {name}", selected.id);
        }
    }
    Ok(())
}

pub(crate) fn cmd_list_unarchive(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    if !svc.unarchive_list(id)? {
        bail!("List {id} is not an archived list");
    }

    if json {
        println!("{}", serde_json::json!({ "unarchived": true }));
    } else {
        println!("List {id} is active again");
    }
    Ok(())
}

pub(crate) fn cmd_list_delete(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    if !svc.delete_list(id)? {
        bail!("List {id} must be archived before it can be deleted");
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": true }));
    } else {
        println!("List {id} deleted");
    }
    Ok(())
}

pub(crate) fn cmd_list_select(svc: &CestaService, id: i64, json: bool) -> Result<()> {
    let list = svc.select_list(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        let name = &list.name;
        println!("Selected list {id}: {name}");
    }
    Ok(())
}

pub(crate) fn cmd_list_show(svc: &CestaService, all: bool, json: bool) -> Result<()> {
    let lists = if all {
        svc.all_lists()?
    } else {
        svc.active_lists()?
    };
    let selected_id = svc.selected_list()?.id;

    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    if lists.is_empty() {
        eprintln!("No lists. Use `cesta list create <name>` to make one.");
        return Ok(());
    }

    #[derive(Tabled)]
    struct ListRow {
        #[tabled(rename = " ")]
        marker: &'static str,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "State")]
        state: String,
        #[tabled(rename = "Created")]
        created_at: String,
    }

    let rows: Vec<ListRow> = lists
        .iter()
        .map(|l| ListRow {
            marker: if l.id == selected_id { "*" } else { "" },
            id: l.id,
            name: l.name.clone(),
            state: l.state.clone(),
            created_at: l.created_at.chars().take(10).collect(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}
