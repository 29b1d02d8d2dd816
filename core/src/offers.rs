//! Multi-buy offer pricing.
//!
//! Every supported promotion is a "buy N, discount the bundle" pattern:
//! the quantity splits into `g = floor(quantity / n)` complete bundles and a
//! remainder charged at full unit price. Each code maps to the number of
//! units effectively paid per bundle. The `formula` text stored on an
//! [`crate::models::Offer`] is documentation only; this table is the single
//! source of truth.

/// Recognized offer codes and their (bundle size, units paid per bundle).
pub const OFFER_CODES: &[(&str, f64, f64)] = &[
    ("3x2", 3.0, 2.0),
    ("2x1", 2.0, 1.0),
    ("2nd_50", 2.0, 1.5),
    ("2nd_70", 2.0, 1.3),
    ("4x3", 4.0, 3.0),
];

/// Preview contract: compute the payable amount for a quantity at a unit
/// price under an offer code.
///
/// Returns `None` when `quantity` or `unit_price` is not positive; an
/// absent or unrecognized code (including `"custom"`) pays full list price.
/// Fractional quantities are valid and the fractional remainder is always
/// charged at full unit price.
#[must_use]
pub fn compute_final_price(quantity: f64, unit_price: f64, code: Option<&str>) -> Option<f64> {
    if quantity <= 0.0 || unit_price <= 0.0 {
        return None;
    }
    Some(apply_offer(quantity, unit_price, code))
}

/// Infallible companion to [`compute_final_price`] for display paths that
/// need an amount for any input: falls back to `quantity * unit_price`
/// when the offer is absent or unrecognized, and never rejects
/// non-positive values.
#[must_use]
pub fn final_price_or_listed(quantity: f64, unit_price: f64, code: Option<&str>) -> f64 {
    apply_offer(quantity, unit_price, code)
}

fn apply_offer(quantity: f64, unit_price: f64, code: Option<&str>) -> f64 {
    let Some(code) = code else {
        return quantity * unit_price;
    };
    match OFFER_CODES.iter().find(|(c, _, _)| *c == code) {
        Some((_, bundle, paid)) => {
            let groups = (quantity / bundle).floor();
            let remainder = quantity - groups * bundle;
            (groups * paid + remainder) * unit_price
        }
        None => quantity * unit_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_3x2_exact_bundles() {
        // 3 units pay 2, 6 units pay 4
        assert!(close(compute_final_price(3.0, 1.15, Some("3x2")).unwrap(), 2.30));
        assert!(close(compute_final_price(6.0, 1.15, Some("3x2")).unwrap(), 4.60));
    }

    #[test]
    fn test_3x2_with_remainder() {
        // 4 units: one bundle of 3 pays 2, plus 1 loose unit
        assert!(close(compute_final_price(4.0, 1.15, Some("3x2")).unwrap(), 3.45));
    }

    #[test]
    fn test_2x1() {
        assert!(close(compute_final_price(2.0, 2.50, Some("2x1")).unwrap(), 2.50));
        assert!(close(compute_final_price(5.0, 2.00, Some("2x1")).unwrap(), 6.00));
    }

    #[test]
    fn test_2nd_50() {
        assert!(close(compute_final_price(2.0, 2.00, Some("2nd_50")).unwrap(), 3.00));
    }

    #[test]
    fn test_2nd_70() {
        assert!(close(compute_final_price(2.0, 2.00, Some("2nd_70")).unwrap(), 2.60));
    }

    #[test]
    fn test_4x3() {
        assert!(close(compute_final_price(4.0, 1.00, Some("4x3")).unwrap(), 3.00));
        assert!(close(compute_final_price(9.0, 1.00, Some("4x3")).unwrap(), 7.00));
    }

    #[test]
    fn test_no_offer_pays_list_price() {
        assert!(close(compute_final_price(3.0, 1.50, None).unwrap(), 4.50));
    }

    #[test]
    fn test_unknown_and_custom_codes_pay_list_price() {
        assert!(close(compute_final_price(3.0, 1.50, Some("custom")).unwrap(), 4.50));
        assert!(close(compute_final_price(3.0, 1.50, Some("5x4")).unwrap(), 4.50));
    }

    #[test]
    fn test_non_positive_input_yields_none() {
        assert!(compute_final_price(0.0, 1.50, Some("3x2")).is_none());
        assert!(compute_final_price(-1.0, 1.50, None).is_none());
        assert!(compute_final_price(3.0, 0.0, Some("3x2")).is_none());
        assert!(compute_final_price(3.0, -0.5, None).is_none());
    }

    #[test]
    fn test_infallible_contract_always_succeeds() {
        assert!(close(final_price_or_listed(3.0, 1.15, Some("3x2")), 2.30));
        assert!(close(final_price_or_listed(3.0, 1.15, None), 3.45));
        assert!(close(final_price_or_listed(3.0, 1.15, Some("nope")), 3.45));
    }

    #[test]
    fn test_fractional_quantity_remainder_full_price() {
        // 3.5 units on 3x2: bundle pays 2, the 0.5 remainder at full price
        assert!(close(compute_final_price(3.5, 2.00, Some("3x2")).unwrap(), 5.00));
        // 1.3 kg of loose produce with no bundle reached
        assert!(close(compute_final_price(1.3, 2.00, Some("3x2")).unwrap(), 2.60));
    }

    #[test]
    fn test_never_charges_more_than_list_price() {
        let quantities = [0.5, 1.0, 2.0, 2.9, 3.0, 4.0, 5.5, 6.0, 10.0];
        let price = 1.37;
        for (code, bundle, _) in OFFER_CODES {
            for &q in &quantities {
                let payable = compute_final_price(q, price, Some(code)).unwrap();
                assert!(payable <= q * price + 1e-9, "{code} overcharged at q={q}");
                if q < *bundle {
                    assert!(close(payable, q * price), "{code} discounted below bundle size");
                }
            }
        }
    }
}
