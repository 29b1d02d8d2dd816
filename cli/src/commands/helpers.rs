use anyhow::{Context, Result};

use cesta_core::models::ShoppingList;
use cesta_core::service::CestaService;

/// Resolve the list a command acts on: the `--list` override when given,
/// otherwise the selected list.
pub(crate) fn resolve_list(svc: &CestaService, list: Option<i64>) -> Result<ShoppingList> {
    match list {
        Some(id) => svc
            .get_list(id)?
            .with_context(|| format!("No list with id {id}")),
        None => svc.selected_list(),
    }
}

/// Render an optional price for table output.
pub(crate) fn format_price(price: Option<f64>) -> String {
    price.map_or("-".into(), |p| format!("{p:.2}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(1.15)), "1.15");
        assert_eq!(format_price(Some(2.0)), "2.00");
        assert_eq!(format_price(None), "-");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }
}
