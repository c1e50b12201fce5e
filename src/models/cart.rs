use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Shopping cart as submitted by the storefront at verify time. Prices are
/// integer minor currency units; the commerce platform expects major units.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartSnapshot {
    #[validate(length(min = 1, message = "cart must contain at least one item"))]
    pub items: Vec<CartItem>,
}

impl CartSnapshot {
    /// Field-level validation for the snapshot and every line item.
    pub fn validate_items(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CartItem {
    /// Commerce-platform product variant reference
    #[schema(example = 40543217348719i64)]
    pub variant_id: i64,

    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,

    /// Listed unit price in minor currency units
    #[validate(custom = "validate_minor_units")]
    #[schema(example = 10000)]
    pub price: i64,

    /// Discounted unit price in minor currency units, when a discount applies
    #[serde(default)]
    #[schema(example = 8000)]
    pub final_price: Option<i64>,
}

fn validate_minor_units(value: i64) -> Result<(), ValidationError> {
    if value >= 0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("range");
        err.message = Some("price must not be negative".into());
        Err(err)
    }
}

impl CartItem {
    /// Effective unit price: the discounted price when present, else the
    /// listed price.
    pub fn effective_price_minor(&self) -> i64 {
        self.final_price.unwrap_or(self.price)
    }

    /// Effective unit price in major units with two-decimal formatting, as
    /// the commerce platform expects (`8000` → `"80.00"`).
    pub fn effective_price_major(&self) -> String {
        minor_to_major_string(self.effective_price_minor())
    }
}

/// Minor units to a two-decimal major-unit string.
pub fn minor_to_major_string(minor: i64) -> String {
    Decimal::new(minor, 2).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, final_price: Option<i64>) -> CartItem {
        CartItem {
            variant_id: 40543217348719,
            quantity: 1,
            price,
            final_price,
        }
    }

    #[test]
    fn discounted_price_wins_when_present() {
        let it = item(10000, Some(8000));
        assert_eq!(it.effective_price_minor(), 8000);
        assert_eq!(it.effective_price_major(), "80.00");
    }

    #[test]
    fn listed_price_used_without_discount() {
        let it = item(5000, None);
        assert_eq!(it.effective_price_major(), "50.00");
    }

    #[test]
    fn minor_to_major_keeps_two_decimals() {
        assert_eq!(minor_to_major_string(25000), "250.00");
        assert_eq!(minor_to_major_string(1), "0.01");
        assert_eq!(minor_to_major_string(99), "0.99");
        assert_eq!(minor_to_major_string(0), "0.00");
    }

    #[test]
    fn empty_cart_is_rejected() {
        let cart = CartSnapshot { items: vec![] };
        assert!(cart.validate_items().is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let cart = CartSnapshot {
            items: vec![CartItem {
                quantity: 0,
                ..item(5000, None)
            }],
        };
        assert!(cart.validate_items().is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let cart = CartSnapshot {
            items: vec![item(-100, None)],
        };
        assert!(cart.validate_items().is_err());
    }
}
