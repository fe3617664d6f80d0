//! Wishlist store: a set of products remembered with the time they were added.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::Product;
use storefront_core::{Entity, ProductId};

use crate::entries::EntryList;
use crate::storage::{Persister, WISHLIST_KEY};

/// A wishlisted product. `added_at` is set once and never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(flatten)]
    pub product: Product,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
}

impl Entity for WishlistEntry {
    type Id = ProductId;

    fn id(&self) -> &ProductId {
        &self.product.id
    }
}

/// Outcome of flipping a product's wishlist membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistToggle {
    Added,
    Removed,
}

#[derive(Debug, Clone)]
pub struct WishlistStore {
    entries: EntryList<WishlistEntry>,
    persister: Persister,
}

impl WishlistStore {
    pub fn new(persister: Persister) -> Self {
        Self {
            entries: EntryList::new(),
            persister,
        }
    }

    pub fn restore(entries: Vec<WishlistEntry>, persister: Persister) -> Self {
        Self {
            entries: EntryList::from_loaded(entries),
            persister,
        }
    }

    /// Remember `product` now. No-op when it is already wishlisted.
    pub fn add_item(&mut self, product: &Product) {
        self.add_item_at(product, Utc::now());
    }

    /// Remember `product` as added at `added_at`. First add wins.
    pub fn add_item_at(&mut self, product: &Product, added_at: DateTime<Utc>) {
        if self.entries.contains(&product.id) {
            return;
        }
        self.entries.insert(WishlistEntry {
            product: product.clone(),
            added_at,
        });
        tracing::debug!(product_id = %product.id, "added to wishlist");
        self.persist();
    }

    pub fn remove_item(&mut self, product_id: ProductId) {
        if self.take(product_id).is_none() {
            tracing::trace!(%product_id, "wishlist remove ignored; not present");
        }
    }

    /// Remove and return the entry for `product_id`.
    pub fn take(&mut self, product_id: ProductId) -> Option<WishlistEntry> {
        let entry = self.entries.remove(&product_id)?;
        tracing::debug!(%product_id, "removed from wishlist");
        self.persist();
        Some(entry)
    }

    /// Add when absent, remove when present.
    pub fn toggle(&mut self, product: &Product) -> WishlistToggle {
        if self.is_in_wishlist(product.id) {
            self.remove_item(product.id);
            WishlistToggle::Removed
        } else {
            self.add_item(product);
            WishlistToggle::Added
        }
    }

    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.entries.contains(&product_id)
    }

    pub fn get(&self, product_id: ProductId) -> Option<&WishlistEntry> {
        self.entries.get(&product_id)
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[WishlistEntry] {
        self.entries.as_slice()
    }

    fn persist(&self) {
        self.persister.persist(WISHLIST_KEY, self.entries.as_slice());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone};
    use storefront_catalog::Rating;

    use crate::storage::{MemoryBackend, load_record};

    fn product(id: u64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: 9.99,
            description: String::new(),
            category: "jewelery".to_string(),
            image: String::new(),
            rating: Rating { rate: 3.0, count: 2 },
        }
    }

    fn wishlist() -> WishlistStore {
        WishlistStore::new(Persister::detached())
    }

    #[test]
    fn second_add_keeps_first_timestamp() {
        let mut wishlist = wishlist();
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let later = first + Duration::days(2);

        wishlist.add_item_at(&product(1), first);
        wishlist.add_item_at(&product(1), later);

        assert_eq!(wishlist.count(), 1);
        assert_eq!(wishlist.get(ProductId::new(1)).unwrap().added_at, first);
    }

    #[test]
    fn add_item_uses_current_time() {
        let mut wishlist = wishlist();
        let before = Utc::now();
        wishlist.add_item(&product(4));
        let added_at = wishlist.get(ProductId::new(4)).unwrap().added_at;
        assert!(added_at >= before && added_at <= Utc::now());
    }

    #[test]
    fn membership_follows_add_and_remove() {
        let mut wishlist = wishlist();
        assert!(!wishlist.is_in_wishlist(ProductId::new(1)));

        wishlist.add_item(&product(1));
        assert!(wishlist.is_in_wishlist(ProductId::new(1)));

        wishlist.remove_item(ProductId::new(1));
        wishlist.remove_item(ProductId::new(1));
        assert!(!wishlist.is_in_wishlist(ProductId::new(1)));
        assert!(wishlist.is_empty());
    }

    #[test]
    fn toggle_flips_membership() {
        let mut wishlist = wishlist();
        assert_eq!(wishlist.toggle(&product(2)), WishlistToggle::Added);
        assert_eq!(wishlist.toggle(&product(2)), WishlistToggle::Removed);
        assert_eq!(wishlist.count(), 0);
    }

    #[test]
    fn take_returns_removed_entry() {
        let mut wishlist = wishlist();
        wishlist.add_item(&product(5));
        let entry = wishlist.take(ProductId::new(5)).unwrap();
        assert_eq!(entry.product.id, ProductId::new(5));
        assert!(wishlist.take(ProductId::new(5)).is_none());
    }

    #[test]
    fn entry_serializes_added_at_in_camel_case() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entry = WishlistEntry {
            product: product(1),
            added_at: at,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["addedAt"], "2024-03-01T12:00:00Z");
        assert_eq!(json["title"], "Product 1");
    }

    #[tokio::test]
    async fn restored_wishlist_matches_persisted_state() {
        let backend = MemoryBackend::new();
        let persister = Persister::spawn(Arc::new(backend.clone()));
        let mut wishlist = WishlistStore::new(persister.clone());

        wishlist.add_item(&product(1));
        wishlist.add_item(&product(2));
        wishlist.remove_item(ProductId::new(1));
        persister.flush().await;

        let saved: Vec<WishlistEntry> = load_record(&backend, WISHLIST_KEY).await;
        let restored = WishlistStore::restore(saved, Persister::detached());
        assert_eq!(restored.entries(), wishlist.entries());
    }
}
