//! Catalog reads with caching.
//!
//! Product pages are read-heavy and tolerate briefly stale data; the catalog
//! caches them with `moka` (5-minute TTL). Writes that change what shoppers
//! see (new products, approved reviews, status of stock) invalidate the
//! affected entries instead of waiting out the TTL.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use creamline_core::{NewProduct, Product, ProductId, Review};

use crate::datastore::{DataResult, DataService};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    Listing,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Listing(Vec<Product>),
}

/// Cached view over the product catalog.
#[derive(Clone)]
pub struct Catalog {
    data: Arc<dyn DataService>,
    cache: Cache<CacheKey, CacheValue>,
}

impl Catalog {
    /// Catalog over the shared data service.
    #[must_use]
    pub fn new(data: Arc<dyn DataService>) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self { data, cache }
    }

    /// Fetch one product, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Propagates data-service errors, including `NotFound`.
    pub async fn product(&self, id: ProductId) -> DataResult<Product> {
        let cache_key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!(product_id = %id, "cache hit for product");
            return Ok(*product);
        }

        let product = self.data.get_product(id).await?;
        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// The full product listing, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Propagates data-service errors.
    pub async fn listing(&self) -> DataResult<Vec<Product>> {
        if let Some(CacheValue::Listing(products)) = self.cache.get(&CacheKey::Listing).await {
            debug!("cache hit for product listing");
            return Ok(products);
        }

        let products = self.data.list_products().await?;
        self.cache
            .insert(CacheKey::Listing, CacheValue::Listing(products.clone()))
            .await;
        Ok(products)
    }

    /// Approved reviews for a product. Not cached: review pages are far less
    /// hot than the catalog and staleness after moderation is confusing.
    ///
    /// # Errors
    ///
    /// Propagates data-service errors.
    pub async fn reviews(&self, product_id: ProductId) -> DataResult<Vec<Review>> {
        self.data.reviews_for_product(product_id).await
    }

    /// Create a product and invalidate the listing so it shows up
    /// immediately.
    ///
    /// # Errors
    ///
    /// Propagates data-service errors.
    pub async fn create_product(&self, new: NewProduct) -> DataResult<Product> {
        let product = self.data.create_product(new).await?;
        self.cache.invalidate(&CacheKey::Listing).await;
        Ok(product)
    }

    /// Drop cached state for one product (and the listing that embeds it).
    /// Called after writes that change what shoppers see, such as a review
    /// approval updating the rating aggregate.
    pub async fn invalidate(&self, id: ProductId) {
        self.cache.invalidate(&CacheKey::Product(id)).await;
        self.cache.invalidate(&CacheKey::Listing).await;
    }
}
