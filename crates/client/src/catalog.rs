//! HTTP client for the remote catalog service.
//!
//! One request per call: no retries, no caching, no pagination.

use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use storefront_catalog::Product;
use storefront_core::ProductId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog unreachable: {0}")]
    Network(String),
    #[error("catalog responded with status {0}")]
    Status(u16),
    #[error("malformed catalog response: {0}")]
    Decode(String),
    #[error("product {0} not found")]
    NotFound(ProductId),
}

/// Products and categories fetched side by side.
///
/// Each half succeeds or fails on its own.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub products: Result<Vec<Product>, CatalogError>,
    pub categories: Result<Vec<String>, CatalogError>,
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, reqwest::Client::new())
    }

    /// Client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build catalog HTTP client")?;
        Ok(Self::with_http(base_url, http))
    }

    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `GET /products`
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let (status, body) = self.get("/products").await?;
        ensure_success(status)?;

        let products: Vec<Product> = decode(&body)?;
        for product in &products {
            product
                .validate()
                .map_err(|e| CatalogError::Decode(e.to_string()))?;
        }

        tracing::debug!(count = products.len(), "fetched products");
        Ok(products)
    }

    /// `GET /products/categories`
    pub async fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        let (status, body) = self.get("/products/categories").await?;
        ensure_success(status)?;
        let categories: Vec<String> = decode(&body)?;
        tracing::debug!(count = categories.len(), "fetched categories");
        Ok(categories)
    }

    /// `GET /products/{id}`
    ///
    /// The public catalog answers unknown ids with `200` and an empty body, so
    /// an empty or `null` body counts as not found alongside `404`.
    pub async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let (status, body) = self.get(&format!("/products/{id}")).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        ensure_success(status)?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(CatalogError::NotFound(id));
        }

        let product: Product = decode(trimmed)?;
        if product.id != id {
            return Err(CatalogError::Decode(format!(
                "asked for product {id}, catalog returned {}",
                product.id
            )));
        }
        product
            .validate()
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(product)
    }

    /// Products and categories, requested concurrently.
    pub async fn fetch_catalog(&self) -> CatalogSnapshot {
        let (products, categories) = tokio::join!(self.fetch_products(), self.fetch_categories());
        CatalogSnapshot {
            products,
            categories,
        }
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, String), CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "catalog request");

        let resp = self.http.get(&url).send().await.map_err(|e| {
            tracing::warn!(%url, "catalog request failed: {e}");
            CatalogError::Network(e.to_string())
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok((status, body))
    }
}

fn ensure_success(status: StatusCode) -> Result<(), CatalogError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(CatalogError::Status(status.as_u16()))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Decode(e.to_string()))
}
