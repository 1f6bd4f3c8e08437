//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::CartRegistry;
use crate::catalog::Catalog;
use crate::checkout::Checkout;
use crate::config::StoreConfig;
use crate::datastore::DataService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the data service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StoreConfig,
    data: Arc<dyn DataService>,
    catalog: Catalog,
    carts: CartRegistry,
    checkout: Checkout,
}

impl AppState {
    /// Create a new application state over the given data service.
    #[must_use]
    pub fn new(config: StoreConfig, data: Arc<dyn DataService>) -> Self {
        let catalog = Catalog::new(Arc::clone(&data));
        let carts = CartRegistry::new(config.cart_dir.clone(), Arc::clone(&data));
        let checkout = Checkout::new(Arc::clone(&data));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                data,
                catalog,
                carts,
                checkout,
            }),
        }
    }

    /// Get a reference to the store configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Get a reference to the data service.
    #[must_use]
    pub fn data(&self) -> &Arc<dyn DataService> {
        &self.inner.data
    }

    /// Get a reference to the cached catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the per-user cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }
}
