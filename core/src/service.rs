use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::db::Database;
use crate::models::{
    Aisle, DEFAULT_LIST_NAME, ListExport, NewProduct, Offer, Product, ProductSuggestion,
    ShoppingList, Totals, UpdateProduct,
};

const SELECTED_LIST_KEY: &str = "selected_list_id";

/// High-level facade over the database. One instance per process; every
/// caller (CLI, tests) goes through here rather than touching `Database`.
pub struct CestaService {
    db: Database,
}

impl CestaService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let service = CestaService {
            db: Database::open(db_path)?,
        };
        service.seed_defaults()?;
        Ok(service)
    }

    pub fn new_in_memory() -> Result<Self> {
        let service = CestaService {
            db: Database::open_in_memory()?,
        };
        service.seed_defaults()?;
        Ok(service)
    }

    /// First-run seeding. Each catalog is inserted only when its table is
    /// empty, so running this on every startup is safe.
    pub fn seed_defaults(&self) -> Result<()> {
        self.db.seed_default_aisles()?;
        self.db.seed_default_offers()?;
        self.db.seed_starter_history()?;
        Ok(())
    }

    // --- Lists and selection ---

    pub fn create_list(&self, name: &str) -> Result<ShoppingList> {
        self.db.create_list(name, true)
    }

    pub fn get_list(&self, id: i64) -> Result<Option<ShoppingList>> {
        self.db.get_list(id)
    }

    pub fn active_lists(&self) -> Result<Vec<ShoppingList>> {
        self.db.get_active_lists()
    }

    pub fn archived_lists(&self) -> Result<Vec<ShoppingList>> {
        self.db.get_archived_lists()
    }

    pub fn all_lists(&self) -> Result<Vec<ShoppingList>> {
        self.db.get_all_lists()
    }

    pub fn rename_list(&self, id: i64, name: &str) -> Result<()> {
        if !self.db.rename_list(id, name)? {
            bail!("No list with id {id}");
        }
        Ok(())
    }

    /// The list product commands act on. A dangling or archived selection
    /// is repaired on read, so this always returns an active list.
    pub fn selected_list(&self) -> Result<ShoppingList> {
        if let Some(raw) = self.db.get_setting(SELECTED_LIST_KEY)? {
            if let Ok(id) = raw.parse::<i64>() {
                if let Some(list) = self.db.get_list(id)? {
                    if list.is_active() {
                        return Ok(list);
                    }
                }
            }
        }
        self.repair_selection()
    }

    pub fn select_list(&self, id: i64) -> Result<ShoppingList> {
        let list = self
            .db
            .get_list(id)?
            .with_context(|| format!("No list with id {id}"))?;
        if !list.is_active() {
            bail!("Cannot select archived list '{}'", list.name);
        }
        self.db.set_setting(SELECTED_LIST_KEY, &list.id.to_string())?;
        Ok(list)
    }

    /// Archive a list. Whenever the stored selection no longer points at an
    /// active list afterwards (it was this list, or none was ever recorded),
    /// another active list is promoted, or a fresh default list is created,
    /// so at least one active list always remains.
    pub fn archive_list(&self, id: i64) -> Result<bool> {
        let archived = self.db.archive_list(id)?;
        if archived && !self.selection_is_active()? {
            self.repair_selection()?;
        }
        Ok(archived)
    }

    pub fn unarchive_list(&self, id: i64) -> Result<bool> {
        self.db.unarchive_list(id)
    }

    /// Delete an archived list. Active lists are refused (`false`).
    pub fn delete_list(&self, id: i64) -> Result<bool> {
        let deleted = self.db.delete_list(id)?;
        if deleted && !self.selection_is_active()? {
            self.repair_selection()?;
        }
        Ok(deleted)
    }

    fn selection_is_active(&self) -> Result<bool> {
        let stored = self
            .db
            .get_setting(SELECTED_LIST_KEY)?
            .and_then(|raw| raw.parse::<i64>().ok());
        let Some(id) = stored else {
            return Ok(false);
        };
        Ok(self.db.get_list(id)?.is_some_and(|l| l.is_active()))
    }

    fn repair_selection(&self) -> Result<ShoppingList> {
        let list = match self.db.get_active_lists()?.into_iter().next() {
            Some(list) => list,
            None => self.db.create_list(DEFAULT_LIST_NAME, true)?,
        };
        self.db.set_setting(SELECTED_LIST_KEY, &list.id.to_string())?;
        Ok(list)
    }

    // --- Aisles ---

    pub fn aisles(&self) -> Result<Vec<Aisle>> {
        self.db.list_aisles()
    }

    pub fn get_aisle(&self, id: i64) -> Result<Option<Aisle>> {
        self.db.get_aisle(id)
    }

    pub fn add_aisle(&self, name: &str, emoji: &str) -> Result<Aisle> {
        self.db.add_aisle(name, emoji)
    }

    pub fn delete_aisle(&self, id: i64) -> Result<bool> {
        self.db.delete_aisle(id)
    }

    pub fn reorder_aisles(&self, ordered_ids: &[i64]) -> Result<()> {
        self.db.reorder_aisles(ordered_ids)
    }

    // --- Offers ---

    pub fn offers(&self) -> Result<Vec<Offer>> {
        self.db.list_offers()
    }

    pub fn get_offer(&self, id: i64) -> Result<Option<Offer>> {
        self.db.get_offer(id)
    }

    pub fn add_offer(&self, code: &str, name: &str, description: &str, formula: &str) -> Result<Offer> {
        self.db.add_offer(code, name, description, formula)
    }

    pub fn update_offer(&self, offer: &Offer) -> Result<bool> {
        self.db.update_offer(offer)
    }

    pub fn delete_offer(&self, id: i64) -> Result<bool> {
        self.db.delete_offer(id)
    }

    // --- Products ---

    /// Add a product and remember its name for future autocomplete.
    pub fn add_product(&self, new: &NewProduct) -> Result<Product> {
        let product = self.db.add_product(new)?;
        self.db.record_usage(
            &product.name,
            product.aisle_id,
            product.quantity,
            product.unit_price,
        )?;
        Ok(product)
    }

    pub fn get_product(&self, id: i64) -> Result<Product> {
        self.db.get_product(id)
    }

    pub fn update_product(&self, id: i64, update: &UpdateProduct) -> Result<Product> {
        self.db.update_product(id, update)
    }

    pub fn delete_product(&self, id: i64) -> Result<bool> {
        self.db.delete_product(id)
    }

    pub fn toggle_purchased(&self, id: i64) -> Result<Product> {
        self.db.toggle_purchased(id)
    }

    pub fn products(&self, list_id: i64, aisle_id: Option<i64>) -> Result<Vec<Product>> {
        self.db.products_for_list(list_id, aisle_id)
    }

    pub fn clear_purchased(&self, list_id: i64) -> Result<i64> {
        self.db.clear_purchased(list_id)
    }

    pub fn clear_list(&self, list_id: i64) -> Result<i64> {
        self.db.clear_list(list_id)
    }

    pub fn totals(&self, list_id: i64) -> Result<Totals> {
        self.db.totals(list_id)
    }

    // --- History ---

    pub fn suggest(&self, prefix: &str) -> Result<Vec<ProductSuggestion>> {
        self.db.suggest(prefix)
    }

    pub fn history_entry(&self, name: &str) -> Result<Option<ProductSuggestion>> {
        self.db.history_entry(name)
    }

    pub fn most_frequent(&self) -> Result<Vec<ProductSuggestion>> {
        self.db.most_frequent()
    }

    pub fn forget(&self, name: &str) -> Result<bool> {
        self.db.forget(name)
    }

    // --- Export / Import ---

    pub fn export_json(&self, list_id: i64) -> Result<String> {
        let export = self.db.export_list(list_id)?;
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// All-or-nothing import into the given list. A malformed document or
    /// any write failure leaves the list untouched and reports `false`.
    pub fn import_json(&self, json: &str, list_id: i64) -> bool {
        let Ok(export) = serde_json::from_str::<ListExport>(json) else {
            return false;
        };
        self.db.import_list(&export, list_id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CestaService {
        CestaService::new_in_memory().unwrap()
    }

    fn new_product(list_id: i64, name: &str) -> NewProduct {
        NewProduct {
            list_id,
            aisle_id: 15,
            name: name.to_string(),
            quantity: 2.0,
            unit_price: Some(1.15),
            offer_id: None,
            notes: String::new(),
            order_index: 0,
        }
    }

    #[test]
    fn test_startup_seeds_catalogs_once() {
        let svc = service();
        assert_eq!(svc.aisles().unwrap().len(), 19);
        assert_eq!(svc.offers().unwrap().len(), 5);
        assert!(!svc.most_frequent().unwrap().is_empty());

        // Re-running the seeds changes nothing
        svc.seed_defaults().unwrap();
        assert_eq!(svc.aisles().unwrap().len(), 19);
        assert_eq!(svc.offers().unwrap().len(), 5);
    }

    #[test]
    fn test_selected_list_bootstraps_default() {
        let svc = service();
        let list = svc.selected_list().unwrap();
        assert_eq!(list.name, "My List");
        assert!(list.is_active());

        // Stable across reads
        assert_eq!(svc.selected_list().unwrap().id, list.id);
    }

    #[test]
    fn test_select_list() {
        let svc = service();
        let a = svc.create_list("A").unwrap();
        let b = svc.create_list("B").unwrap();

        svc.select_list(b.id).unwrap();
        assert_eq!(svc.selected_list().unwrap().id, b.id);

        svc.select_list(a.id).unwrap();
        assert_eq!(svc.selected_list().unwrap().id, a.id);

        assert!(svc.select_list(999).is_err());
        svc.archive_list(b.id).unwrap();
        assert!(svc.select_list(b.id).is_err());
    }

    #[test]
    fn test_archiving_selected_list_promotes_another() {
        let svc = service();
        let a = svc.create_list("A").unwrap();
        let b = svc.create_list("B").unwrap();
        svc.select_list(a.id).unwrap();

        assert!(svc.archive_list(a.id).unwrap());
        let selected = svc.selected_list().unwrap();
        assert_eq!(selected.id, b.id);
        assert!(selected.is_active());
    }

    #[test]
    fn test_archiving_last_list_creates_fresh_default() {
        let svc = service();
        let only = svc.selected_list().unwrap();
        assert!(svc.archive_list(only.id).unwrap());

        let selected = svc.selected_list().unwrap();
        assert_ne!(selected.id, only.id);
        assert_eq!(selected.name, "My List");
        assert!(selected.is_active());
        // Exactly one active list remains
        assert_eq!(svc.active_lists().unwrap().len(), 1);
    }

    #[test]
    fn test_archiving_only_list_without_selection_leaves_one_active() {
        // No selection was ever recorded; the invariant must hold anyway.
        let svc = service();
        let only = svc.create_list("Only").unwrap();
        assert!(svc.archive_list(only.id).unwrap());

        let active = svc.active_lists().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "My List");
    }

    #[test]
    fn test_archiving_unselected_list_keeps_selection() {
        let svc = service();
        let a = svc.create_list("A").unwrap();
        let b = svc.create_list("B").unwrap();
        svc.select_list(a.id).unwrap();

        svc.archive_list(b.id).unwrap();
        assert_eq!(svc.selected_list().unwrap().id, a.id);
    }

    #[test]
    fn test_delete_requires_archive_first() {
        let svc = service();
        let list = svc.create_list("Weekly").unwrap();
        assert!(!svc.delete_list(list.id).unwrap());
        svc.archive_list(list.id).unwrap();
        assert!(svc.delete_list(list.id).unwrap());
        assert!(svc.get_list(list.id).unwrap().is_none());
    }

    #[test]
    fn test_add_product_feeds_autocomplete() {
        let svc = service();
        let list = svc.selected_list().unwrap();
        svc.add_product(&new_product(list.id, "Quinoa")).unwrap();

        let suggestions = svc.suggest("qu").unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].name, "Quinoa");
        assert_eq!(suggestions[0].aisle_id, 15);

        let remembered = svc.history_entry("QUINOA ").unwrap().unwrap();
        assert_eq!(remembered.aisle_id, 15);
    }

    #[test]
    fn test_suggest_ranks_by_usage() {
        let svc = service();
        let list = svc.selected_list().unwrap();
        // Starter history already holds Milk with usage 1; adding it twice
        // more must rank it above the single-use entries.
        svc.add_product(&new_product(list.id, "Milk")).unwrap();
        svc.add_product(&new_product(list.id, "Milk")).unwrap();
        svc.add_product(&new_product(list.id, "Milkshakes")).unwrap();

        let suggestions = svc.suggest("mi").unwrap();
        assert_eq!(suggestions[0].name, "Milk");
        assert_eq!(suggestions[0].usage_count, 3);
    }

    #[test]
    fn test_forget_removes_suggestion() {
        let svc = service();
        let list = svc.selected_list().unwrap();
        svc.add_product(&new_product(list.id, "Quinoa")).unwrap();
        assert!(svc.forget("quinoa").unwrap());
        assert!(svc.suggest("qu").unwrap().is_empty());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let svc = service();
        let list = svc.selected_list().unwrap();
        svc.add_product(&new_product(list.id, "Milk")).unwrap();
        svc.add_product(&new_product(list.id, "Bread")).unwrap();

        let json = svc.export_json(list.id).unwrap();
        let target = svc.create_list("Copy").unwrap();
        assert!(svc.import_json(&json, target.id));

        let names: Vec<String> = svc
            .products(target.id, None)
            .unwrap()
            .iter()
            .map(|p| p.name.clone())
            .collect();
        assert!(names.contains(&"Milk".to_string()));
        assert!(names.contains(&"Bread".to_string()));
    }

    #[test]
    fn test_import_json_rejects_garbage() {
        let svc = service();
        let list = svc.selected_list().unwrap();
        svc.add_product(&new_product(list.id, "Milk")).unwrap();

        assert!(!svc.import_json("not json at all", list.id));
        assert!(!svc.import_json("{\"version\": \"1.0\"}", list.id));
        // The failed imports left the list alone
        assert_eq!(svc.products(list.id, None).unwrap().len(), 1);
    }

    #[test]
    fn test_totals_through_service() {
        let svc = service();
        let list = svc.selected_list().unwrap();
        let offer_3x2 = svc
            .offers()
            .unwrap()
            .into_iter()
            .find(|o| o.code == "3x2")
            .unwrap();

        let mut new = new_product(list.id, "Milk");
        new.quantity = 3.0;
        new.offer_id = Some(offer_3x2.id);
        svc.add_product(&new).unwrap();

        let totals = svc.totals(list.id).unwrap();
        assert!((totals.total_without_offers - 3.45).abs() < 0.01);
        assert!((totals.total_with_offers - 2.30).abs() < 0.01);
        assert!((totals.savings - 1.15).abs() < 0.01);
    }

    #[test]
    fn test_rename_missing_list_errors() {
        let svc = service();
        assert!(svc.rename_list(999, "Nope").is_err());
    }
}
