//! Application state: the session, the catalog connection and both stores.
//!
//! A [`Storefront`] is owned by one task and mutated through `&mut self`.
//! Every view except the login page goes through the session gate first.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use storefront_auth::{AccessError, AuthError, Authenticator, Credentials, Session, SessionToken};
use storefront_catalog::{Product, ProductQuery};
use storefront_core::ProductId;

use crate::cart::{CartEntry, CartStore};
use crate::catalog::{CatalogClient, CatalogError};
use crate::config::ClientConfig;
use crate::login::HttpAuthenticator;
use crate::storage::{
    CART_KEY, Persister, SESSION_KEY, SqliteBackend, StateBackend, WISHLIST_KEY, load_record,
};
use crate::wishlist::{WishlistStore, WishlistToggle};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("sign in to continue")]
    Unauthenticated,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("product {0} is not in the wishlist")]
    NotInWishlist(ProductId),

    #[error("your cart is empty")]
    EmptyCart,
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => AppError::Unauthenticated,
        }
    }
}

impl AppError {
    /// User-facing message for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            AppError::Catalog(CatalogError::NotFound(_)) => Notice::error("Failed to load product"),
            AppError::Catalog(_) => Notice::error("Failed to load products"),
            AppError::Auth(AuthError::InvalidCredentials) => {
                Notice::error("Invalid username or password")
            }
            AppError::Auth(AuthError::Validation(err)) => Notice::error(err.to_string()),
            AppError::Auth(AuthError::Unavailable(_)) => Notice::error("Login failed, try again later"),
            AppError::Unauthenticated | AppError::NotInWishlist(_) | AppError::EmptyCart => {
                Notice::error(self.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A product as shown in the listing or on its detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCard {
    pub product: Product,
    pub in_wishlist: bool,
}

/// Result of browsing the catalog.
///
/// A failed fetch still yields a listing: empty, with a notice explaining why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListing {
    pub cards: Vec<ProductCard>,
    pub categories: Vec<String>,
    pub query: ProductQuery,
    pub notice: Option<Notice>,
}

/// Counters shown in the header badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HeaderCounts {
    pub cart_items: u64,
    pub wishlist_items: usize,
}

/// Snapshot of a completed (simulated) order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub lines: Vec<CartEntry>,
    pub total: f64,
    pub placed_at: DateTime<Utc>,
}

pub struct Storefront {
    session: Session,
    catalog: CatalogClient,
    authenticator: Arc<dyn Authenticator>,
    cart: CartStore,
    wishlist: WishlistStore,
    persister: Persister,
    checkout_delay: Duration,
}

impl Storefront {
    /// Open the on-disk state and connect to the configured catalog.
    pub async fn open(config: &ClientConfig) -> anyhow::Result<Self> {
        let db_path = config.state_db_path()?;
        let backend = SqliteBackend::open(&db_path).await?;
        tracing::debug!(path = ?db_path, "opened state database");

        let catalog = CatalogClient::with_timeout(config.catalog_url.clone(), config.request_timeout)?;
        let authenticator = HttpAuthenticator::new(config.catalog_url.clone(), catalog.http().clone());

        Ok(Self::restore(
            Arc::new(backend),
            catalog,
            Arc::new(authenticator),
            config.checkout_delay,
        )
        .await)
    }

    /// Rebuild the session and both stores from `backend`.
    ///
    /// Must be called inside a Tokio runtime; writes go to `backend` from a
    /// background task.
    pub async fn restore(
        backend: Arc<dyn StateBackend>,
        catalog: CatalogClient,
        authenticator: Arc<dyn Authenticator>,
        checkout_delay: Duration,
    ) -> Self {
        let cart_entries = load_record(backend.as_ref(), CART_KEY).await;
        let wishlist_entries = load_record(backend.as_ref(), WISHLIST_KEY).await;
        let tokens: Vec<SessionToken> = load_record(backend.as_ref(), SESSION_KEY).await;

        let session = match tokens.into_iter().next() {
            Some(token) => Session::with_token(token),
            None => Session::new(),
        };

        let persister = Persister::spawn(backend);
        let cart = CartStore::restore(cart_entries, persister.clone());
        let wishlist = WishlistStore::restore(wishlist_entries, persister.clone());

        tracing::info!(
            signed_in = session.is_authenticated(),
            cart_entries = cart.len(),
            wishlist_entries = wishlist.count(),
            "storefront state restored"
        );

        Self {
            session,
            catalog,
            authenticator,
            cart,
            wishlist,
            persister,
            checkout_delay,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Sign in, replacing any token already held.
    ///
    /// Credentials are always checked by the authenticator. On failure the
    /// current session is kept unchanged.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), AppError> {
        let token = self
            .session
            .login(self.authenticator.as_ref(), credentials)
            .await?;
        self.persister.persist(SESSION_KEY, core::slice::from_ref(token));
        Ok(())
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.persister.persist::<SessionToken>(SESSION_KEY, &[]);
    }

    /// Fetch the catalog and apply `query` to it.
    pub async fn browse(&self, query: &ProductQuery) -> Result<ProductListing, AppError> {
        self.session.require()?;

        let snapshot = self.catalog.fetch_catalog().await;
        let mut notice = None;

        let cards = match snapshot.products {
            Ok(products) => query
                .apply(&products)
                .into_iter()
                .map(|product| self.card(product))
                .collect(),
            Err(err) => {
                tracing::error!("failed to load products: {err}");
                notice = Some(Notice::error("Failed to load products"));
                Vec::new()
            }
        };

        let categories = match snapshot.categories {
            Ok(categories) => categories,
            Err(err) => {
                tracing::error!("failed to load categories: {err}");
                notice.get_or_insert_with(|| Notice::error("Failed to load categories"));
                Vec::new()
            }
        };

        Ok(ProductListing {
            cards,
            categories,
            query: query.clone(),
            notice,
        })
    }

    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        self.session.require()?;
        Ok(self.catalog.fetch_categories().await?)
    }

    pub async fn product_detail(&self, product_id: ProductId) -> Result<ProductCard, AppError> {
        self.session.require()?;
        let product = self.catalog.fetch_product(product_id).await?;
        Ok(self.card(product))
    }

    /// Fetch `product_id` and add one unit of it to the cart.
    pub async fn add_to_cart(&mut self, product_id: ProductId) -> Result<&CartEntry, AppError> {
        self.add_to_cart_quantity(product_id, core::num::NonZeroU32::MIN)
            .await
    }

    pub async fn add_to_cart_quantity(
        &mut self,
        product_id: ProductId,
        quantity: core::num::NonZeroU32,
    ) -> Result<&CartEntry, AppError> {
        self.session.require()?;
        let product = self.catalog.fetch_product(product_id).await?;
        self.cart.add_item_quantity(&product, quantity);
        self.cart
            .get(product_id)
            .ok_or(AppError::Catalog(CatalogError::NotFound(product_id)))
    }

    /// Heart button: add when absent, remove when present.
    ///
    /// Removal needs no catalog round trip.
    pub async fn toggle_wishlist(&mut self, product_id: ProductId) -> Result<WishlistToggle, AppError> {
        self.session.require()?;

        let product = match self.wishlist.get(product_id) {
            Some(entry) => entry.product.clone(),
            None => self.catalog.fetch_product(product_id).await?,
        };
        Ok(self.wishlist.toggle(&product))
    }

    /// Put a wishlisted product in the cart and drop it from the wishlist.
    pub fn move_to_cart(&mut self, product_id: ProductId) -> Result<&CartEntry, AppError> {
        self.session.require()?;

        let product = self
            .wishlist
            .get(product_id)
            .map(|entry| entry.product.clone())
            .ok_or(AppError::NotInWishlist(product_id))?;

        self.cart.add_item(&product);
        self.wishlist.remove_item(product_id);

        self.cart
            .get(product_id)
            .ok_or(AppError::NotInWishlist(product_id))
    }

    pub fn cart(&self) -> Result<&CartStore, AppError> {
        self.session.require()?;
        Ok(&self.cart)
    }

    pub fn cart_mut(&mut self) -> Result<&mut CartStore, AppError> {
        self.session.require()?;
        Ok(&mut self.cart)
    }

    pub fn wishlist(&self) -> Result<&WishlistStore, AppError> {
        self.session.require()?;
        Ok(&self.wishlist)
    }

    pub fn wishlist_mut(&mut self) -> Result<&mut WishlistStore, AppError> {
        self.session.require()?;
        Ok(&mut self.wishlist)
    }

    pub fn header(&self) -> HeaderCounts {
        HeaderCounts {
            cart_items: self.cart.item_count(),
            wishlist_items: self.wishlist.count(),
        }
    }

    /// Simulated payment: wait, then empty the cart.
    pub async fn checkout(&mut self) -> Result<Receipt, AppError> {
        self.session.require()?;
        if self.cart.is_empty() {
            return Err(AppError::EmptyCart);
        }

        let lines = self.cart.entries().to_vec();
        let total = self.cart.total();

        tokio::time::sleep(self.checkout_delay).await;
        self.cart.clear_cart();

        tracing::info!(lines = lines.len(), total, "order placed");
        Ok(Receipt {
            lines,
            total,
            placed_at: Utc::now(),
        })
    }

    /// Wait for every queued persistence write to land.
    pub async fn shutdown(&self) {
        self.persister.flush().await;
    }

    fn card(&self, product: Product) -> ProductCard {
        let in_wishlist = self.wishlist.is_in_wishlist(product.id);
        ProductCard {
            product,
            in_wishlist,
        }
    }
}
