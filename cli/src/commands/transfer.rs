use std::path::Path;

use anyhow::{Context, Result, bail};

use cesta_core::service::CestaService;

use super::helpers::resolve_list;

pub(crate) fn cmd_export(
    svc: &CestaService,
    file: &Path,
    list: Option<i64>,
    json: bool,
) -> Result<()> {
    let list = resolve_list(svc, list)?;
    let document = svc.export_json(list.id)?;
    std::fs::write(file, &document)
        .with_context(|| format!("Failed to write {}", file.display()))?;

    let count = svc.products(list.id, None)?.len();
    if json {
        println!(
            "{}",
            serde_json::json!({ "exported": count, "file": file.display().to_string() })
        );
    } else {
        println!(
            "Exported {count} product(s) from '{}' to {}",
            list.name,
            file.display()
        );
    }
    Ok(())
}

pub(crate) fn cmd_import(
    svc: &CestaService,
    file: &Path,
    list: Option<i64>,
    json: bool,
) -> Result<()> {
    let list = resolve_list(svc, list)?;
    let document = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    if !svc.import_json(&document, list.id) {
        bail!("{} is not a valid list export", file.display());
    }

    let count = svc.products(list.id, None)?.len();
    if json {
        println!("{}", serde_json::json!({ "imported": count }));
    } else {
        println!("Imported {count} product(s) into '{}'", list.name);
    }
    Ok(())
}
