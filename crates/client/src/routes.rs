//! Navigation targets and the session guard in front of them.

use core::fmt;
use core::str::FromStr;

use storefront_auth::Session;
use thiserror::Error;
use storefront_core::ProductId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Products,
    ProductDetail(ProductId),
    Cart,
    Wishlist,
}

impl Route {
    /// Parse an application path such as `/product/3`.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };

        match trimmed {
            "/" | "" => Some(Route::Products),
            "/login" => Some(Route::Login),
            "/cart" => Some(Route::Cart),
            "/wishlist" => Some(Route::Wishlist),
            other => other
                .strip_prefix("/product/")
                .and_then(|id| id.parse().ok())
                .map(Route::ProductDetail),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Products => "/".to_string(),
            Route::ProductDetail(id) => format!("/product/{id}"),
            Route::Cart => "/cart".to_string(),
            Route::Wishlist => "/wishlist".to_string(),
        }
    }

    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Where a visit to `self` actually lands given the current session.
    ///
    /// Protected routes send signed-out users to the login page; signed-in
    /// users are bounced from the login page to the listing.
    pub fn resolve(self, session: &Session) -> Route {
        match (self.is_protected(), session.is_authenticated()) {
            (true, false) => Route::Login,
            (false, true) => Route::Products,
            _ => self,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown path '{0}' (expected /, /login, /cart, /wishlist or /product/<id>)")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s).ok_or_else(|| UnknownRoute(s.to_string()))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
