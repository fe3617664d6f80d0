//! Cart store: one entry per product, quantity always at least one.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{Entity, ProductId};

use crate::entries::EntryList;
use crate::storage::{CART_KEY, Persister};

/// A product in the cart with its quantity.
///
/// Serialized flat: the product fields plus `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: NonZeroU32,
}

impl CartEntry {
    pub fn line_total(&self) -> f64 {
        self.product.price * f64::from(self.quantity.get())
    }
}

impl Entity for CartEntry {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.product.id
    }
}

/// In-memory cart that persists itself after every change.
#[derive(Debug, Clone)]
pub struct CartStore {
    entries: EntryList<CartEntry>,
    persister: Persister,
}

impl CartStore {
    pub fn new(persister: Persister) -> Self {
        Self {
            entries: EntryList::new(),
            persister,
        }
    }

    /// Cart rebuilt from a persisted record.
    pub fn restore(entries: Vec<CartEntry>, persister: Persister) -> Self {
        Self {
            entries: EntryList::from_loaded(entries),
            persister,
        }
    }

    /// Add one unit of `product`.
    pub fn add_item(&mut self, product: &Product) {
        self.add_item_quantity(product, NonZeroU32::MIN);
    }

    /// Add `quantity` units of `product`, merging with an existing entry.
    pub fn add_item_quantity(&mut self, product: &Product, quantity: NonZeroU32) {
        match self.entries.get_mut(&product.id) {
            Some(entry) => {
                entry.quantity = entry.quantity.saturating_add(quantity.get());
                tracing::debug!(product_id = %product.id, quantity = entry.quantity.get(), "cart quantity increased");
            }
            None => {
                self.entries.insert(CartEntry {
                    product: product.clone(),
                    quantity,
                });
                tracing::debug!(product_id = %product.id, "added to cart");
            }
        }
        self.persist();
    }

    pub fn remove_item(&mut self, product_id: ProductId) {
        if self.entries.remove(&product_id).is_some() {
            tracing::debug!(%product_id, "removed from cart");
            self.persist();
        }
    }

    /// Set the quantity exactly. Zero, negative or absent ids are ignored;
    /// only [`CartStore::remove_item`] deletes an entry.
    pub fn update_quantity(&mut self, product_id: ProductId, new_quantity: i64) {
        let Some(quantity) = u32::try_from(new_quantity).ok().and_then(NonZeroU32::new) else {
            tracing::debug!(%product_id, new_quantity, "ignoring out-of-range cart quantity");
            return;
        };

        let Some(entry) = self.entries.get_mut(&product_id) else {
            return;
        };
        if entry.quantity == quantity {
            return;
        }
        entry.quantity = quantity;
        self.persist();
    }

    pub fn clear_cart(&mut self) {
        if self.entries.clear() {
            tracing::debug!("cart cleared");
            self.persist();
        }
    }

    /// Sum of `price * quantity`, computed from the current entries.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Total units across entries (the header badge).
    pub fn item_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity.get()))
            .sum()
    }

    pub fn get(&self, product_id: ProductId) -> Option<&CartEntry> {
        self.entries.get(&product_id)
    }

    pub fn entries(&self) -> &[CartEntry] {
        self.entries.as_slice()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        self.persister.persist(CART_KEY, self.entries.as_slice());
    }
}
