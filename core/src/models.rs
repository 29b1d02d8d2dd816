use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Lifecycle states for a shopping list, stored as TEXT.
pub const STATE_ACTIVE: &str = "ACTIVE";
pub const STATE_ARCHIVED: &str = "ARCHIVED";

/// Name given to the list that is auto-created when none exists.
pub const DEFAULT_LIST_NAME: &str = "My List";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    pub state: String,
    pub created_at: String,
}

impl ShoppingList {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == STATE_ACTIVE
    }

    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.state == STATE_ARCHIVED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aisle {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub order_index: i64,
    pub is_default: bool,
}

/// A multi-buy promotion. The `formula` string is documentation only and is
/// never parsed or evaluated; pricing lives in the `offers` module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub formula: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    pub list_id: i64,
    pub aisle_id: i64,
    pub name: String,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<i64>,
    /// Cached offer-adjusted price, recomputed on every insert/update.
    /// Readers never derive it lazily.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
    pub purchased: bool,
    pub notes: String,
    pub order_index: i64,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Product {
    /// List price ignoring any offer: unit price times quantity.
    #[must_use]
    pub fn total_without_offer(&self) -> f64 {
        self.unit_price.unwrap_or(0.0) * self.quantity
    }

    /// Amount actually payable: the cached final price, falling back to the
    /// list price when no final price was computed.
    #[must_use]
    pub fn final_price_to_pay(&self) -> f64 {
        self.final_price
            .unwrap_or_else(|| self.total_without_offer())
    }

    #[must_use]
    pub fn savings(&self) -> f64 {
        self.total_without_offer() - self.final_price_to_pay()
    }

    #[must_use]
    pub fn has_offer(&self) -> bool {
        self.offer_id.is_some() && self.final_price.is_some()
    }

    /// Unit price actually paid once the offer is factored in.
    #[must_use]
    pub fn effective_unit_price(&self) -> f64 {
        if self.quantity > 0.0 {
            self.final_price_to_pay() / self.quantity
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub list_id: i64,
    pub aisle_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub offer_id: Option<i64>,
    pub notes: String,
    pub order_index: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub aisle_id: Option<i64>,
    pub quantity: Option<f64>,
    pub unit_price: Option<Option<f64>>,
    pub offer_id: Option<Option<i64>>,
    pub notes: Option<String>,
    pub order_index: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductSuggestion {
    pub name: String,
    pub aisle_id: i64,
    pub suggested_quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_price: Option<f64>,
    pub usage_count: i64,
}

// --- Totals aggregation ---

/// Anything closer to zero than this is floating-point noise, not a discount.
const SAVINGS_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub total_without_offers: f64,
    pub total_with_offers: f64,
    pub savings: f64,
    pub purchased_count: i64,
    pub total_count: i64,
}

impl Totals {
    /// Derive totals from the full product set of one list. Recomputed on
    /// every read; nothing incremental is maintained.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn from_products(products: &[Product]) -> Self {
        let total_without_offers: f64 = products.iter().map(Product::total_without_offer).sum();
        let total_with_offers: f64 = products.iter().map(Product::final_price_to_pay).sum();
        let mut savings = total_without_offers - total_with_offers;
        if savings.abs() < SAVINGS_EPSILON {
            savings = 0.0;
        }
        Totals {
            total_without_offers,
            total_with_offers,
            savings,
            purchased_count: products.iter().filter(|p| p.purchased).count() as i64,
            total_count: products.len() as i64,
        }
    }
}

// --- Export / Import types ---

pub const EXPORT_VERSION: &str = "1.0";

/// Portable backup document for one list. Products intentionally omit their
/// offer assignment and cached final price; those are local to the offer
/// table and do not travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExport {
    pub version: String,
    pub export_date: i64,
    pub aisles: Vec<ExportAisle>,
    pub products: Vec<ExportProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAisle {
    pub id: i64,
    pub name: String,
    pub emoji: String,
    pub order_index: i64,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportProduct {
    pub id: i64,
    pub name: String,
    pub aisle_id: i64,
    pub quantity: f64,
    #[serde(default)]
    pub estimated_price: Option<f64>,
    pub is_purchased: bool,
    #[serde(default)]
    pub notes: String,
    pub order_index: i64,
}

impl From<&Aisle> for ExportAisle {
    fn from(aisle: &Aisle) -> Self {
        ExportAisle {
            id: aisle.id,
            name: aisle.name.clone(),
            emoji: aisle.emoji.clone(),
            order_index: aisle.order_index,
            is_default: aisle.is_default,
        }
    }
}

impl From<&Product> for ExportProduct {
    fn from(product: &Product) -> Self {
        ExportProduct {
            id: product.id,
            name: product.name.clone(),
            aisle_id: product.aisle_id,
            quantity: product.quantity,
            estimated_price: product.unit_price,
            is_purchased: product.purchased,
            notes: product.notes.clone(),
            order_index: product.order_index,
        }
    }
}

// --- Validation helpers ---

pub fn validate_list_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("List name must not be blank");
    }
    Ok(trimmed.to_string())
}

pub fn validate_aisle_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("Aisle name must not be blank");
    }
    Ok(trimmed.to_string())
}

pub fn validate_product_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        bail!("Product name must not be blank");
    }
    Ok(trimmed.to_string())
}

pub fn validate_quantity(quantity: f64) -> Result<()> {
    if !quantity.is_finite() || quantity < 0.0 {
        bail!("Quantity must be a non-negative number");
    }
    Ok(())
}

// --- Seed catalogs ---

/// The fixed default aisle catalog, inserted once when the aisle table is
/// empty. Order indices define the shopping walk order.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn default_aisles() -> Vec<Aisle> {
    let catalog: &[(&str, &str)] = &[
        ("Health & Beauty", "🧴"),
        ("Fruit & Vegetables", "🍎"),
        ("Deli Counter", "🥓"),
        ("Butcher", "🥩"),
        ("Pantry 1: Biscuits", "🥫"),
        ("Pantry 2: Chocolate", "🥫"),
        ("Pantry 3: Sugar & Coffee", "🥫"),
        ("Pantry 4: Tinned Tomato & Pulses", "🥫"),
        ("Pantry 5: Oil & Pasta", "🥫"),
        ("Paper Goods", "🧻"),
        ("Cleaning", "🧼"),
        ("Drinks", "🥤"),
        ("Crisps & Snacks", "🥜"),
        ("Bakery", "🥐"),
        ("Dairy", "🥛"),
        ("Ready Meals", "🥪"),
        ("Cheese", "🧀"),
        ("Loyalty Gift", "🎁"),
        ("Frozen", "🧊"),
    ];
    catalog
        .iter()
        .enumerate()
        .map(|(i, (name, emoji))| Aisle {
            id: (i + 1) as i64,
            name: (*name).to_string(),
            emoji: (*emoji).to_string(),
            order_index: i as i64,
            is_default: true,
        })
        .collect()
}

/// The built-in offers, inserted once when the offer table is empty.
/// Formula strings document the pricing rule; they are never evaluated.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn default_offers() -> Vec<Offer> {
    let catalog: &[(&str, &str, &str, &str)] = &[
        (
            "3x2",
            "3x2",
            "Buy 3, pay 2",
            "(floor(quantity / 3) * 2 + quantity % 3) * unit_price",
        ),
        (
            "2x1",
            "2x1",
            "Buy 2, pay 1",
            "(floor(quantity / 2) * 1 + quantity % 2) * unit_price",
        ),
        (
            "2nd_50",
            "2nd unit -50%",
            "Second unit at half price",
            "(floor(quantity / 2) * 1.5 + quantity % 2) * unit_price",
        ),
        (
            "2nd_70",
            "2nd unit -70%",
            "Second unit at 70% off",
            "(floor(quantity / 2) * 1.3 + quantity % 2) * unit_price",
        ),
        (
            "4x3",
            "4x3",
            "Buy 4, pay 3",
            "(floor(quantity / 4) * 3 + quantity % 4) * unit_price",
        ),
    ];
    catalog
        .iter()
        .enumerate()
        .map(|(i, (code, name, description, formula))| Offer {
            id: (i + 1) as i64,
            code: (*code).to_string(),
            name: (*name).to_string(),
            description: (*description).to_string(),
            formula: (*formula).to_string(),
            is_default: true,
        })
        .collect()
}

/// Starter autocomplete catalog: (name, aisle id, quantity, unit price).
/// Seeded into product history on first run so suggestions are useful
/// before the user has typed anything.
pub const STARTER_HISTORY: &[(&str, i64, f64, Option<f64>)] = &[
    ("Razor blades", 1, 1.0, Some(10.0)),
    ("Rustic bread", 14, 1.0, None),
    ("Bread", 14, 1.0, None),
    ("Tomatoes", 2, 1.0, None),
    ("Courgettes", 2, 2.0, None),
    ("Aubergines", 2, 2.0, None),
    ("Red peppers", 2, 2.0, None),
    ("Bananas", 2, 1.0, Some(1.50)),
    ("Golden apples", 2, 1.0, Some(1.80)),
    ("Red apples", 2, 1.0, Some(1.80)),
    ("Grapes", 2, 1.0, Some(2.50)),
    ("Broccoli", 2, 1.0, Some(1.50)),
    ("Onions", 2, 1.0, Some(1.0)),
    ("Diced ham", 3, 2.0, Some(2.99)),
    ("Diced chorizo", 3, 2.0, Some(2.15)),
    ("Eggs", 3, 1.0, Some(2.50)),
    ("Maria biscuits", 5, 1.0, Some(2.50)),
    ("Fine salt", 7, 1.0, Some(0.70)),
    ("Sugar", 7, 1.0, Some(1.30)),
    ("Crushed tomato", 8, 1.0, Some(1.10)),
    ("Noodles", 9, 1.0, Some(1.20)),
    ("Stock cubes", 9, 1.0, Some(1.50)),
    ("Juice", 12, 1.0, Some(1.75)),
    ("Soda water", 12, 1.0, Some(1.50)),
    ("Milkshakes", 12, 1.0, Some(2.0)),
    ("Milk", 15, 6.0, Some(1.15)),
    ("Cappuccinos", 16, 5.0, Some(2.50)),
    ("Pizza", 16, 1.0, Some(3.50)),
    ("Fresh cheese", 17, 2.0, Some(2.30)),
    ("Grated cheese", 17, 2.0, Some(2.00)),
    ("Loyalty gift cheese", 18, 1.0, Some(0.0)),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: 1,
            uuid: "test".to_string(),
            list_id: 1,
            aisle_id: 2,
            name: "Milk".to_string(),
            quantity: 3.0,
            unit_price: Some(1.15),
            offer_id: Some(1),
            final_price: Some(2.30),
            purchased: false,
            notes: String::new(),
            order_index: 0,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_product_total_without_offer() {
        let p = sample_product();
        assert!((p.total_without_offer() - 3.45).abs() < 1e-9);
    }

    #[test]
    fn test_product_final_price_to_pay_uses_cache() {
        let p = sample_product();
        assert!((p.final_price_to_pay() - 2.30).abs() < 1e-9);
        assert!((p.savings() - 1.15).abs() < 1e-9);
        assert!(p.has_offer());
    }

    #[test]
    fn test_product_final_price_falls_back_to_list_price() {
        let mut p = sample_product();
        p.final_price = None;
        p.offer_id = None;
        assert!((p.final_price_to_pay() - 3.45).abs() < 1e-9);
        assert!(p.savings().abs() < 1e-9);
        assert!(!p.has_offer());
    }

    #[test]
    fn test_product_without_price() {
        let mut p = sample_product();
        p.unit_price = None;
        p.final_price = None;
        assert!(p.total_without_offer().abs() < f64::EPSILON);
        assert!(p.final_price_to_pay().abs() < f64::EPSILON);
    }

    #[test]
    fn test_effective_unit_price() {
        let p = sample_product();
        // 2.30 paid for 3 units
        assert!((p.effective_unit_price() - 2.30 / 3.0).abs() < 1e-9);

        let mut zero = sample_product();
        zero.quantity = 0.0;
        assert!(zero.effective_unit_price().abs() < f64::EPSILON);
    }

    #[test]
    fn test_totals_from_products() {
        let with_offer = sample_product();
        let mut plain = sample_product();
        plain.id = 2;
        plain.offer_id = None;
        plain.final_price = None;
        plain.quantity = 2.0;
        plain.unit_price = Some(0.50);
        plain.purchased = true;

        let totals = Totals::from_products(&[with_offer, plain]);
        assert!((totals.total_without_offers - 4.45).abs() < 1e-9);
        assert!((totals.total_with_offers - 3.30).abs() < 1e-9);
        assert!((totals.savings - 1.15).abs() < 1e-9);
        assert_eq!(totals.purchased_count, 1);
        assert_eq!(totals.total_count, 2);
    }

    #[test]
    fn test_totals_savings_never_noise() {
        // A cached price that differs from the list price only by floating
        // point noise must not report a discount.
        let mut p = sample_product();
        p.offer_id = None;
        p.unit_price = Some(0.1);
        p.quantity = 3.0;
        p.final_price = Some(0.1 + 0.1 + 0.1);

        let totals = Totals::from_products(&[p]);
        assert!(totals.savings.abs() < f64::EPSILON);
    }

    #[test]
    fn test_totals_empty() {
        let totals = Totals::from_products(&[]);
        assert!(totals.total_without_offers.abs() < f64::EPSILON);
        assert!(totals.total_with_offers.abs() < f64::EPSILON);
        assert_eq!(totals.total_count, 0);
        assert_eq!(totals.purchased_count, 0);
    }

    #[test]
    fn test_validate_names() {
        assert_eq!(validate_list_name("  Weekly shop ").unwrap(), "Weekly shop");
        assert!(validate_list_name("   ").is_err());
        assert!(validate_aisle_name("").is_err());
        assert_eq!(validate_product_name(" Milk").unwrap(), "Milk");
        assert!(validate_product_name("  ").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0.0).is_ok());
        assert!(validate_quantity(1.5).is_ok());
        assert!(validate_quantity(-1.0).is_err());
        assert!(validate_quantity(f64::NAN).is_err());
    }

    #[test]
    fn test_default_aisles_catalog() {
        let aisles = default_aisles();
        assert_eq!(aisles.len(), 19);
        for (i, aisle) in aisles.iter().enumerate() {
            assert_eq!(aisle.order_index, i as i64);
            assert!(aisle.is_default);
        }
        assert_eq!(aisles[1].name, "Fruit & Vegetables");
    }

    #[test]
    fn test_default_offers_catalog() {
        let offers = default_offers();
        assert_eq!(offers.len(), 5);
        assert!(offers.iter().all(|o| o.is_default));
        let codes: Vec<&str> = offers.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["3x2", "2x1", "2nd_50", "2nd_70", "4x3"]);
    }

    #[test]
    fn test_starter_history_aisles_exist() {
        let aisle_ids: Vec<i64> = default_aisles().iter().map(|a| a.id).collect();
        for (_, aisle_id, _, _) in STARTER_HISTORY {
            assert!(aisle_ids.contains(aisle_id));
        }
    }

    #[test]
    fn test_export_document_field_names() {
        let export = ListExport {
            version: EXPORT_VERSION.to_string(),
            export_date: 1_700_000_000_000,
            aisles: vec![ExportAisle {
                id: 20,
                name: "Pet Food".to_string(),
                emoji: "🐾".to_string(),
                order_index: 19,
                is_default: false,
            }],
            products: vec![ExportProduct {
                id: 1,
                name: "Milk".to_string(),
                aisle_id: 15,
                quantity: 6.0,
                estimated_price: Some(1.15),
                is_purchased: false,
                notes: String::new(),
                order_index: 0,
            }],
        };
        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"exportDate\""));
        assert!(json.contains("\"orderIndex\""));
        assert!(json.contains("\"isDefault\""));
        assert!(json.contains("\"estimatedPrice\""));
        assert!(json.contains("\"isPurchased\""));

        let back: ListExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.aisles.len(), 1);
        assert_eq!(back.products[0].name, "Milk");
    }

    #[test]
    fn test_list_state_helpers() {
        let list = ShoppingList {
            id: 1,
            uuid: String::new(),
            name: "Weekly".to_string(),
            state: STATE_ACTIVE.to_string(),
            created_at: String::new(),
        };
        assert!(list.is_active());
        assert!(!list.is_archived());
    }
}
