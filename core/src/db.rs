use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::models::{
    Aisle, EXPORT_VERSION, ExportAisle, ExportProduct, ListExport, NewProduct, Offer, Product,
    ProductSuggestion, STARTER_HISTORY, STATE_ACTIVE, STATE_ARCHIVED, ShoppingList, Totals,
    UpdateProduct, default_aisles, default_offers, validate_aisle_name, validate_list_name,
    validate_product_name, validate_quantity,
};
use crate::offers;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    fn configure(&self) -> Result<()> {
        // List deletion cascades to its products
        self.conn.pragma_update(None, "foreign_keys", true)?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS shopping_lists (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL,
                    name TEXT NOT NULL,
                    state TEXT NOT NULL DEFAULT 'ACTIVE',
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS aisles (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    emoji TEXT NOT NULL DEFAULT '',
                    order_index INTEGER NOT NULL DEFAULT 0,
                    is_default INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS offers (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    code TEXT NOT NULL,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    formula TEXT NOT NULL DEFAULT '',
                    is_default INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS products (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL,
                    list_id INTEGER NOT NULL REFERENCES shopping_lists(id) ON DELETE CASCADE,
                    aisle_id INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    quantity REAL NOT NULL DEFAULT 1.0,
                    unit_price REAL,
                    offer_id INTEGER,
                    final_price REAL,
                    purchased INTEGER NOT NULL DEFAULT 0,
                    notes TEXT NOT NULL DEFAULT '',
                    order_index INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS product_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    original_name TEXT NOT NULL,
                    aisle_id INTEGER NOT NULL,
                    last_quantity REAL NOT NULL,
                    last_price REAL,
                    usage_count INTEGER NOT NULL DEFAULT 1,
                    last_used TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_products_list ON products(list_id);
                CREATE INDEX IF NOT EXISTS idx_products_list_aisle ON products(list_id, aisle_id);
                CREATE INDEX IF NOT EXISTS idx_history_name ON product_history(name);
                CREATE INDEX IF NOT EXISTS idx_aisles_order ON aisles(order_index);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn list_from_row(row: &rusqlite::Row) -> rusqlite::Result<ShoppingList> {
        Ok(ShoppingList {
            id: row.get(0)?,
            uuid: row.get(1)?,
            name: row.get(2)?,
            state: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn aisle_from_row(row: &rusqlite::Row) -> rusqlite::Result<Aisle> {
        Ok(Aisle {
            id: row.get(0)?,
            name: row.get(1)?,
            emoji: row.get(2)?,
            order_index: row.get(3)?,
            is_default: row.get(4)?,
        })
    }

    fn offer_from_row(row: &rusqlite::Row) -> rusqlite::Result<Offer> {
        Ok(Offer {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            formula: row.get(4)?,
            is_default: row.get(5)?,
        })
    }

    fn product_from_row(row: &rusqlite::Row) -> rusqlite::Result<Product> {
        Ok(Product {
            id: row.get(0)?,
            uuid: row.get(1)?,
            list_id: row.get(2)?,
            aisle_id: row.get(3)?,
            name: row.get(4)?,
            quantity: row.get(5)?,
            unit_price: row.get(6)?,
            offer_id: row.get(7)?,
            final_price: row.get(8)?,
            purchased: row.get(9)?,
            notes: row.get(10)?,
            order_index: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn suggestion_from_row(row: &rusqlite::Row) -> rusqlite::Result<ProductSuggestion> {
        Ok(ProductSuggestion {
            name: row.get(0)?,
            aisle_id: row.get(1)?,
            suggested_quantity: row.get(2)?,
            suggested_price: row.get(3)?,
            usage_count: row.get(4)?,
        })
    }

    // --- Shopping lists ---

    pub fn create_list(&self, name: &str, seed_default_aisles: bool) -> Result<ShoppingList> {
        let name = validate_list_name(name)?;
        if seed_default_aisles {
            self.seed_default_aisles()?;
        }
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO shopping_lists (uuid, name, state, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![uuid, name, STATE_ACTIVE, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_list(id)?.context("List not found after insert")
    }

    pub fn get_list(&self, id: i64) -> Result<Option<ShoppingList>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, uuid, name, state, created_at FROM shopping_lists WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::list_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    fn lists_where(&self, state: Option<&str>) -> Result<Vec<ShoppingList>> {
        let mut sql =
            "SELECT id, uuid, name, state, created_at FROM shopping_lists".to_string();
        if state.is_some() {
            sql.push_str(" WHERE state = ?1");
        }
        sql.push_str(" ORDER BY created_at, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let lists = match state {
            Some(s) => stmt
                .query_map(params![s], Self::list_from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], Self::list_from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(lists)
    }

    pub fn get_active_lists(&self) -> Result<Vec<ShoppingList>> {
        self.lists_where(Some(STATE_ACTIVE))
    }

    pub fn get_archived_lists(&self) -> Result<Vec<ShoppingList>> {
        self.lists_where(Some(STATE_ARCHIVED))
    }

    pub fn get_all_lists(&self) -> Result<Vec<ShoppingList>> {
        self.lists_where(None)
    }

    pub fn rename_list(&self, id: i64, name: &str) -> Result<bool> {
        let name = validate_list_name(name)?;
        let rows = self.conn.execute(
            "UPDATE shopping_lists SET name = ?1 WHERE id = ?2",
            params![name, id],
        )?;
        Ok(rows > 0)
    }

    pub fn archive_list(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE shopping_lists SET state = ?1 WHERE id = ?2 AND state = ?3",
            params![STATE_ARCHIVED, id, STATE_ACTIVE],
        )?;
        Ok(rows > 0)
    }

    pub fn unarchive_list(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE shopping_lists SET state = ?1 WHERE id = ?2 AND state = ?3",
            params![STATE_ACTIVE, id, STATE_ARCHIVED],
        )?;
        Ok(rows > 0)
    }

    /// Delete a list and (by cascade) its products. A policy guard, not an
    /// error: lists that are not ARCHIVED are left untouched and `false`
    /// is returned.
    pub fn delete_list(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM shopping_lists WHERE id = ?1 AND state = ?2",
            params![id, STATE_ARCHIVED],
        )?;
        Ok(rows > 0)
    }

    /// First-run bootstrap and repair: returns some existing list, creating
    /// a default-named one (with the default aisle catalog) when none exists.
    pub fn get_or_create_default(&self) -> Result<ShoppingList> {
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, name, state, created_at FROM shopping_lists ORDER BY id LIMIT 1",
        )?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Self::list_from_row(row)?);
        }
        drop(rows);
        drop(stmt);
        self.create_list(crate::models::DEFAULT_LIST_NAME, true)
    }

    // --- Settings ---

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    // --- Aisles ---

    pub fn list_aisles(&self) -> Result<Vec<Aisle>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, emoji, order_index, is_default FROM aisles ORDER BY order_index, id",
        )?;
        let aisles = stmt
            .query_map([], Self::aisle_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(aisles)
    }

    pub fn get_aisle(&self, id: i64) -> Result<Option<Aisle>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, emoji, order_index, is_default FROM aisles WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::aisle_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn add_aisle(&self, name: &str, emoji: &str) -> Result<Aisle> {
        let name = validate_aisle_name(name)?;
        let next_index: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM aisles",
            [],
            |row| row.get(0),
        )?;
        self.conn.execute(
            "INSERT INTO aisles (name, emoji, order_index, is_default) VALUES (?1, ?2, ?3, 0)",
            params![name, emoji, next_index],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_aisle(id)?.context("Aisle not found after insert")
    }

    /// Default aisles are protected; deleting one is a silent no-op.
    pub fn delete_aisle(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM aisles WHERE id = ?1 AND is_default = 0",
            params![id],
        )?;
        Ok(rows > 0)
    }

    /// Reassign order indices 0..N-1 following the given id sequence.
    /// Ids not present in the aisle table are skipped; aisles missing from
    /// the sequence keep their old index (callers pass the full set).
    #[allow(clippy::cast_possible_wrap)]
    pub fn reorder_aisles(&self, ordered_ids: &[i64]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (index, id) in ordered_ids.iter().enumerate() {
            tx.execute(
                "UPDATE aisles SET order_index = ?1 WHERE id = ?2",
                params![index as i64, id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert the fixed default catalog when the aisle table is empty.
    /// Idempotent; returns whether anything was seeded.
    pub fn seed_default_aisles(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM aisles", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(false);
        }
        let tx = self.conn.unchecked_transaction()?;
        for aisle in default_aisles() {
            tx.execute(
                "INSERT INTO aisles (id, name, emoji, order_index, is_default)
                 VALUES (?1, ?2, ?3, ?4, 1)",
                params![aisle.id, aisle.name, aisle.emoji, aisle.order_index],
            )?;
        }
        tx.commit()?;
        Ok(true)
    }

    // --- Offers ---

    pub fn list_offers(&self) -> Result<Vec<Offer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, name, description, formula, is_default FROM offers ORDER BY id",
        )?;
        let offers = stmt
            .query_map([], Self::offer_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(offers)
    }

    pub fn get_offer(&self, id: i64) -> Result<Option<Offer>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, code, name, description, formula, is_default FROM offers WHERE id = ?1",
        )?;
        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::offer_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn add_offer(&self, code: &str, name: &str, description: &str, formula: &str) -> Result<Offer> {
        self.conn.execute(
            "INSERT INTO offers (code, name, description, formula, is_default)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![code, name, description, formula],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_offer(id)?.context("Offer not found after insert")
    }

    pub fn update_offer(&self, offer: &Offer) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE offers SET code = ?1, name = ?2, description = ?3, formula = ?4 WHERE id = ?5",
            params![offer.code, offer.name, offer.description, offer.formula, offer.id],
        )?;
        Ok(rows > 0)
    }

    /// Built-in offers can never be deleted; a silent no-op, like aisles.
    pub fn delete_offer(&self, id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM offers WHERE id = ?1 AND is_default = 0",
            params![id],
        )?;
        Ok(rows > 0)
    }

    /// Insert the built-in offers when the offer table is empty.
    pub fn seed_default_offers(&self) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM offers", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(false);
        }
        let tx = self.conn.unchecked_transaction()?;
        for offer in default_offers() {
            tx.execute(
                "INSERT INTO offers (id, code, name, description, formula, is_default)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                params![offer.id, offer.code, offer.name, offer.description, offer.formula],
            )?;
        }
        tx.commit()?;
        Ok(true)
    }

    // --- Products ---

    /// Write-time price computation. A missing unit price yields no cached
    /// price; a dangling offer reference is treated as "no offer".
    fn cached_final_price(
        &self,
        quantity: f64,
        unit_price: Option<f64>,
        offer_id: Option<i64>,
    ) -> Result<Option<f64>> {
        let Some(price) = unit_price else {
            return Ok(None);
        };
        let code = match offer_id {
            Some(id) => self.get_offer(id)?.map(|o| o.code),
            None => None,
        };
        Ok(offers::compute_final_price(quantity, price, code.as_deref()))
    }

    pub fn add_product(&self, product: &NewProduct) -> Result<Product> {
        let name = validate_product_name(&product.name)?;
        validate_quantity(product.quantity)?;
        let final_price =
            self.cached_final_price(product.quantity, product.unit_price, product.offer_id)?;
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO products (uuid, list_id, aisle_id, name, quantity, unit_price, offer_id,
                                   final_price, purchased, notes, order_index, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11, ?12)",
            params![
                uuid,
                product.list_id,
                product.aisle_id,
                name,
                product.quantity,
                product.unit_price,
                product.offer_id,
                final_price,
                product.notes,
                product.order_index,
                now,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_product(id)
    }

    pub fn get_product(&self, id: i64) -> Result<Product> {
        self.conn
            .query_row(
                "SELECT id, uuid, list_id, aisle_id, name, quantity, unit_price, offer_id,
                        final_price, purchased, notes, order_index, created_at, updated_at
                 FROM products WHERE id = ?1",
                params![id],
                Self::product_from_row,
            )
            .context("Product not found")
    }

    pub fn update_product(&self, id: i64, update: &UpdateProduct) -> Result<Product> {
        let mut product = self.get_product(id)?;

        if let Some(ref name) = update.name {
            product.name = validate_product_name(name)?;
        }
        if let Some(aisle_id) = update.aisle_id {
            product.aisle_id = aisle_id;
        }
        if let Some(quantity) = update.quantity {
            validate_quantity(quantity)?;
            product.quantity = quantity;
        }
        if let Some(unit_price) = update.unit_price {
            product.unit_price = unit_price;
        }
        if let Some(offer_id) = update.offer_id {
            product.offer_id = offer_id;
        }
        if let Some(ref notes) = update.notes {
            product.notes = notes.clone();
        }
        if let Some(order_index) = update.order_index {
            product.order_index = order_index;
        }

        // The cached price is never trusted across a write
        let final_price =
            self.cached_final_price(product.quantity, product.unit_price, product.offer_id)?;
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "UPDATE products SET aisle_id = ?1, name = ?2, quantity = ?3, unit_price = ?4,
                                 offer_id = ?5, final_price = ?6, notes = ?7, order_index = ?8,
                                 updated_at = ?9
             WHERE id = ?10",
            params![
                product.aisle_id,
                product.name,
                product.quantity,
                product.unit_price,
                product.offer_id,
                final_price,
                product.notes,
                product.order_index,
                now,
                id,
            ],
        )?;
        self.get_product(id)
    }

    pub fn delete_product(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    pub fn toggle_purchased(&self, id: i64) -> Result<Product> {
        // Verify existence first so a missing id is reported, not ignored
        self.get_product(id)?;
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "UPDATE products SET purchased = NOT purchased, updated_at = ?1 WHERE id = ?2",
            params![now, id],
        )?;
        self.get_product(id)
    }

    /// Products of one list in shopping-walk order (aisle order, then the
    /// manual order within the aisle). A dangling aisle reference sorts last
    /// instead of failing the read.
    pub fn products_for_list(&self, list_id: i64, aisle_id: Option<i64>) -> Result<Vec<Product>> {
        let mut sql = "SELECT p.id, p.uuid, p.list_id, p.aisle_id, p.name, p.quantity,
                              p.unit_price, p.offer_id, p.final_price, p.purchased, p.notes,
                              p.order_index, p.created_at, p.updated_at
                       FROM products p
                       LEFT JOIN aisles a ON p.aisle_id = a.id
                       WHERE p.list_id = ?1"
            .to_string();
        if aisle_id.is_some() {
            sql.push_str(" AND p.aisle_id = ?2");
        }
        sql.push_str(" ORDER BY COALESCE(a.order_index, 1000000), p.order_index, p.id");

        let mut stmt = self.conn.prepare(&sql)?;
        let products = match aisle_id {
            Some(aid) => stmt
                .query_map(params![list_id, aid], Self::product_from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![list_id], Self::product_from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(products)
    }

    #[allow(clippy::cast_possible_wrap)]
    pub fn clear_purchased(&self, list_id: i64) -> Result<i64> {
        let rows = self.conn.execute(
            "DELETE FROM products WHERE list_id = ?1 AND purchased = 1",
            params![list_id],
        )?;
        Ok(rows as i64)
    }

    #[allow(clippy::cast_possible_wrap)]
    pub fn clear_list(&self, list_id: i64) -> Result<i64> {
        let rows = self
            .conn
            .execute("DELETE FROM products WHERE list_id = ?1", params![list_id])?;
        Ok(rows as i64)
    }

    /// Totals are recomputed from the product rows on every call.
    pub fn totals(&self, list_id: i64) -> Result<Totals> {
        let products = self.products_for_list(list_id, None)?;
        Ok(Totals::from_products(&products))
    }

    // --- Product history (autocomplete) ---

    /// Upsert keyed on the normalized (trimmed, lower-cased) name. Re-adding
    /// "Milk " and "milk" bumps one shared entry.
    pub fn record_usage(
        &self,
        name: &str,
        aisle_id: i64,
        quantity: f64,
        price: Option<f64>,
    ) -> Result<()> {
        let original = name.trim();
        if original.is_empty() {
            return Ok(());
        }
        let normalized = original.to_lowercase();
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO product_history (name, original_name, aisle_id, last_quantity, last_price, usage_count, last_used)
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)
             ON CONFLICT(name) DO UPDATE SET
                 usage_count = usage_count + 1,
                 aisle_id = ?3,
                 last_quantity = ?4,
                 last_price = ?5,
                 last_used = ?6",
            params![normalized, original, aisle_id, quantity, price, now],
        )?;
        Ok(())
    }

    /// Ranked prefix suggestions: usage count first, recency second, at most
    /// five. Prefixes shorter than two characters yield nothing on purpose.
    pub fn suggest(&self, prefix: &str) -> Result<Vec<ProductSuggestion>> {
        let trimmed = prefix.trim();
        if trimmed.chars().count() < 2 {
            return Ok(Vec::new());
        }
        let escaped = trimmed
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("{escaped}%");
        let mut stmt = self.conn.prepare(
            "SELECT original_name, aisle_id, last_quantity, last_price, usage_count
             FROM product_history
             WHERE name LIKE ?1 ESCAPE '\\'
             ORDER BY usage_count DESC, last_used DESC
             LIMIT 5",
        )?;
        let suggestions = stmt
            .query_map(params![pattern], Self::suggestion_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(suggestions)
    }

    /// Exact lookup of one remembered name, independent of how the entry
    /// ranks among prefix matches.
    pub fn history_entry(&self, name: &str) -> Result<Option<ProductSuggestion>> {
        let normalized = name.trim().to_lowercase();
        let mut stmt = self.conn.prepare(
            "SELECT original_name, aisle_id, last_quantity, last_price, usage_count
             FROM product_history
             WHERE name = ?1",
        )?;
        let mut rows = stmt.query(params![normalized])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::suggestion_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn most_frequent(&self) -> Result<Vec<ProductSuggestion>> {
        let mut stmt = self.conn.prepare(
            "SELECT original_name, aisle_id, last_quantity, last_price, usage_count
             FROM product_history
             ORDER BY usage_count DESC
             LIMIT 20",
        )?;
        let suggestions = stmt
            .query_map([], Self::suggestion_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(suggestions)
    }

    /// Explicit removal of one remembered name; the only way an entry dies.
    pub fn forget(&self, name: &str) -> Result<bool> {
        let normalized = name.trim().to_lowercase();
        let rows = self.conn.execute(
            "DELETE FROM product_history WHERE name = ?1",
            params![normalized],
        )?;
        Ok(rows > 0)
    }

    pub fn history_is_empty(&self) -> Result<bool> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM product_history", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    /// Seed the starter autocomplete catalog when the history is empty.
    pub fn seed_starter_history(&self) -> Result<bool> {
        if !self.history_is_empty()? {
            return Ok(false);
        }
        for (name, aisle_id, quantity, price) in STARTER_HISTORY {
            self.record_usage(name, *aisle_id, *quantity, *price)?;
        }
        Ok(true)
    }

    // --- Export / Import ---

    pub fn export_list(&self, list_id: i64) -> Result<ListExport> {
        let aisles = self.list_aisles()?;
        let products = self.products_for_list(list_id, None)?;
        Ok(ListExport {
            version: EXPORT_VERSION.to_string(),
            export_date: Utc::now().timestamp_millis(),
            aisles: aisles.iter().map(ExportAisle::from).collect(),
            products: products.iter().map(ExportProduct::from).collect(),
        })
    }

    /// One atomic unit: wipe the target list, bring in custom aisles, then
    /// every product as a fresh record (new id, no offer, no cached price).
    /// Any failure rolls the whole import back.
    pub fn import_list(&self, export: &ListExport, list_id: i64) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM products WHERE list_id = ?1", params![list_id])?;

        // Default aisles are assumed present already; re-inserting them
        // would collide with the seeded ids.
        for aisle in export.aisles.iter().filter(|a| !a.is_default) {
            tx.execute(
                "INSERT OR IGNORE INTO aisles (id, name, emoji, order_index, is_default)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![aisle.id, aisle.name, aisle.emoji, aisle.order_index],
            )?;
        }

        let now = Local::now().to_rfc3339();
        for product in &export.products {
            let uuid = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO products (uuid, list_id, aisle_id, name, quantity, unit_price,
                                       offer_id, final_price, purchased, notes, order_index,
                                       created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, NULL, ?7, ?8, ?9, ?10, ?10)",
                params![
                    uuid,
                    list_id,
                    product.aisle_id,
                    product.name,
                    product.quantity,
                    product.estimated_price,
                    product.is_purchased,
                    product.notes,
                    product.order_index,
                    now,
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }
}
