use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, ProductId};

/// Highest rating the catalog hands out.
pub const MAX_RATE: f64 = 5.0;

/// Aggregate review score of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average score, 0 through 5.
    pub rate: f64,
    /// Number of reviews behind the average.
    pub count: u32,
}

impl Rating {
    /// Filled stars out of five, rounding half up.
    pub fn stars(&self) -> u8 {
        self.rate.clamp(0.0, MAX_RATE).round() as u8
    }
}

/// Product read model (matches the catalog's JSON shape).
///
/// Immutable once fetched. Cart and wishlist entries hold their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: Rating,
}

impl Product {
    /// Check the numeric ranges the catalog promises.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation(format!(
                "product {}: price must be a non-negative number, got {}",
                self.id, self.price
            )));
        }
        if !(0.0..=MAX_RATE).contains(&self.rating.rate) {
            return Err(DomainError::validation(format!(
                "product {}: rating must be within 0..=5, got {}",
                self.id, self.rating.rate
            )));
        }
        Ok(())
    }

    pub fn display_price(&self) -> String {
        format_price(self.price)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.id
    }
}

/// Format an amount as dollars with two decimals (`$12.50`).
pub fn format_price(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Human label for a category slug: first letter upper-cased, rest untouched.
pub fn category_label(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
