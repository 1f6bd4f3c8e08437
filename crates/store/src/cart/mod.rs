//! The cart subsystem.
//!
//! [`CartStore`] holds the invariant-preserving logic, [`CartStorage`] is the
//! local persistence seam, and [`CartMirror`] shadows the cart remotely.
//! [`CartSession`] wires the three together with one rule: after every local
//! mutation, persist locally, then attempt a remote write and ignore failure.

pub mod mirror;
pub mod storage;
pub mod store;

pub use mirror::CartMirror;
pub use storage::{CartStorage, JsonFileStorage, MemoryStorage, StorageError};
pub use store::{CartAdd, CartError, CartStore, CartUpdate};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use creamline_core::{CartEntry, CartTotals, Product, ProductId, UserId};
use moka::future::Cache;
use tokio::sync::Mutex;

use crate::datastore::DataService;

/// One user's cart for the duration of a browsing session.
///
/// Mutations go through the store first (which enforces the stock invariant),
/// are then persisted to local storage, and finally mirrored remotely on a
/// best-effort basis. A local persistence failure is logged but does not
/// undo the in-memory mutation; the in-memory cart is authoritative within
/// the session.
pub struct CartSession {
    user_id: UserId,
    store: CartStore,
    storage: Box<dyn CartStorage>,
    mirror: Option<CartMirror>,
}

impl CartSession {
    /// Open a session, loading any locally persisted cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if a persisted record exists but cannot be
    /// read.
    pub fn open(
        user_id: UserId,
        storage: Box<dyn CartStorage>,
        mirror: Option<CartMirror>,
    ) -> Result<Self, StorageError> {
        let store = CartStore::from_entries(storage.load()?);
        Ok(Self {
            user_id,
            store,
            storage,
            mirror,
        })
    }

    /// The owning user.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Seed the local cart from the remote snapshot.
    ///
    /// Called once at login. The remote snapshot is used only when the local
    /// cart is empty; otherwise the local cart wins and the call is a no-op.
    pub async fn restore_remote(&mut self) -> bool {
        if !self.store.is_empty() {
            return false;
        }
        let Some(mirror) = &self.mirror else {
            return false;
        };
        let Some(entries) = mirror.fetch().await else {
            return false;
        };
        if entries.is_empty() {
            return false;
        }

        self.store = CartStore::from_entries(entries);
        self.persist_local();
        true
    }

    /// Add units of a product; see [`CartStore::add`].
    ///
    /// # Errors
    ///
    /// Propagates [`CartError`] from the store; the cart is not persisted on
    /// failure since nothing changed.
    pub fn add(&mut self, product: &Product, requested: u32) -> Result<CartAdd, CartError> {
        let outcome = self.store.add(product, requested)?;
        self.persist();
        Ok(outcome)
    }

    /// Set an entry's quantity; see [`CartStore::update_quantity`].
    ///
    /// # Errors
    ///
    /// Propagates [`CartError`] from the store.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartUpdate, CartError> {
        let outcome = self.store.update_quantity(product_id, quantity)?;
        self.persist();
        Ok(outcome)
    }

    /// Remove an entry; always succeeds.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let removed = self.store.remove(product_id);
        if removed {
            self.persist();
        }
        removed
    }

    /// Empty the cart (the remote record is deleted rather than emptied).
    pub fn clear(&mut self) {
        self.store.clear();
        self.persist();
    }

    /// Current entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        self.store.entries()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Monetary totals over the current entries.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.store.totals()
    }

    fn persist(&self) {
        self.persist_local();
        if let Some(mirror) = &self.mirror {
            drop(mirror.sync(self.store.entries().to_vec()));
        }
    }

    fn persist_local(&self) {
        if let Err(e) = self.storage.save(self.store.entries()) {
            tracing::warn!(user_id = %self.user_id, error = %e, "failed to persist cart locally");
        }
    }
}

/// Lazily created per-user cart sessions, shared across handlers.
///
/// Bounded: sessions are evicted after sitting idle (and by capacity under
/// pressure), so arbitrary user ids cannot grow the registry without limit.
/// Every mutation persists the cart to local storage before returning, so an
/// evicted session is rebuilt from its file on the next request with nothing
/// lost.
pub struct CartRegistry {
    cart_dir: PathBuf,
    data: Arc<dyn DataService>,
    sessions: Cache<UserId, Arc<Mutex<CartSession>>>,
    open_lock: Mutex<()>,
}

impl CartRegistry {
    /// How long an untouched session stays resident.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
    const MAX_SESSIONS: u64 = 10_000;

    /// Registry storing cart files under `cart_dir` and mirroring to `data`.
    #[must_use]
    pub fn new(cart_dir: PathBuf, data: Arc<dyn DataService>) -> Self {
        Self::with_idle_timeout(cart_dir, data, Self::IDLE_TIMEOUT)
    }

    /// Registry with a custom idle timeout.
    #[must_use]
    pub fn with_idle_timeout(
        cart_dir: PathBuf,
        data: Arc<dyn DataService>,
        idle: Duration,
    ) -> Self {
        let sessions = Cache::builder()
            .max_capacity(Self::MAX_SESSIONS)
            .time_to_idle(idle)
            .build();

        Self {
            cart_dir,
            data,
            sessions,
            open_lock: Mutex::new(()),
        }
    }

    /// Get or open the session for a user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the user's persisted cart cannot be read.
    pub async fn session(&self, user_id: UserId) -> Result<Arc<Mutex<CartSession>>, StorageError> {
        if let Some(session) = self.sessions.get(&user_id).await {
            return Ok(session);
        }

        // Serialize first opens so two concurrent requests for the same user
        // cannot each build a session over the same file.
        let _guard = self.open_lock.lock().await;
        if let Some(session) = self.sessions.get(&user_id).await {
            return Ok(session);
        }

        let storage = JsonFileStorage::new(self.cart_dir.join(format!("{user_id}.json")));
        let mirror = CartMirror::new(Arc::clone(&self.data), user_id);
        let session = CartSession::open(user_id, Box::new(storage), Some(mirror))?;
        let session = Arc::new(Mutex::new(session));
        self.sessions.insert(user_id, Arc::clone(&session)).await;
        Ok(session)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::datastore::MemoryDataService;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn product(stock: u32) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Quark 500g".to_string(),
            price: Decimal::new(279, 2),
            quantity: stock,
            category: "fresh".to_string(),
            image_url: None,
            rating_avg: Decimal::ZERO,
            rating_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_session_persists_on_every_mutation() {
        let user = UserId::generate();
        let mut session =
            CartSession::open(user, Box::new(MemoryStorage::new()), None).unwrap();
        let quark = product(5);

        session.add(&quark, 2).unwrap();
        session.update_quantity(quark.id, 3).unwrap();

        // A fresh store over the same backing sees the persisted state.
        let raw = session.storage.load().unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.first().unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn test_mirror_receives_local_state() {
        let data: Arc<MemoryDataService> = Arc::new(MemoryDataService::new());
        let user = UserId::generate();
        let mirror = CartMirror::new(data.clone(), user);
        let mut session =
            CartSession::open(user, Box::new(MemoryStorage::new()), Some(mirror.clone()))
                .unwrap();

        let quark = product(5);
        session.add(&quark, 2).unwrap();
        // Drive the spawned sync to completion deterministically.
        mirror.sync(session.entries().to_vec()).await.unwrap();

        let snapshot = data.cart_snapshot(user).await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_empty_cart_deletes_remote_record() {
        let data: Arc<MemoryDataService> = Arc::new(MemoryDataService::new());
        let user = UserId::generate();
        let mirror = CartMirror::new(data.clone(), user);
        let mut session =
            CartSession::open(user, Box::new(MemoryStorage::new()), Some(mirror.clone()))
                .unwrap();

        let quark = product(5);
        session.add(&quark, 1).unwrap();
        mirror.sync(session.entries().to_vec()).await.unwrap();
        assert!(data.cart_snapshot(user).await.unwrap().is_some());

        session.clear();
        mirror.sync(session.entries().to_vec()).await.unwrap();
        assert!(data.cart_snapshot(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_remote_only_seeds_empty_cart() {
        let data: Arc<MemoryDataService> = Arc::new(MemoryDataService::new());
        let user = UserId::generate();
        let quark = product(5);
        let remote = vec![CartEntry::from_product(&quark, 2)];
        data.put_cart_snapshot(user, &remote).await.unwrap();

        // Empty local cart: remote seeds it.
        let mirror = CartMirror::new(data.clone(), user);
        let mut session =
            CartSession::open(user, Box::new(MemoryStorage::new()), Some(mirror)).unwrap();
        assert!(session.restore_remote().await);
        assert_eq!(session.entries(), remote.as_slice());

        // Non-empty local cart: local wins.
        let other = product(9);
        let mirror = CartMirror::new(data.clone(), user);
        let mut session =
            CartSession::open(user, Box::new(MemoryStorage::new()), Some(mirror)).unwrap();
        session.add(&other, 1).unwrap();
        assert!(!session.restore_remote().await);
        assert_eq!(session.entries().len(), 1);
        assert_eq!(session.entries().first().unwrap().id, other.id);
    }

    #[tokio::test]
    async fn test_registry_reuses_sessions() {
        let data: Arc<MemoryDataService> = Arc::new(MemoryDataService::new());
        let dir = std::env::temp_dir().join(format!("creamline-carts-{}", uuid::Uuid::new_v4()));
        let registry = CartRegistry::new(dir.clone(), data);
        let user = UserId::generate();

        let a = registry.session(user).await.unwrap();
        let b = registry.session(user).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_registry_evicts_idle_sessions() {
        let data: Arc<MemoryDataService> = Arc::new(MemoryDataService::new());
        let dir = std::env::temp_dir().join(format!("creamline-carts-{}", uuid::Uuid::new_v4()));
        let registry =
            CartRegistry::with_idle_timeout(dir.clone(), data, Duration::from_millis(50));
        let user = UserId::generate();
        let quark = product(5);

        let first = registry.session(user).await.unwrap();
        first.lock().await.add(&quark, 2).unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;

        // The idle session is gone; the next request opens a fresh one over
        // the persisted file, so no cart state is lost.
        let second = registry.session(user).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        let session = second.lock().await;
        assert_eq!(session.entries().first().unwrap().quantity, 2);
        drop(session);

        let _ = std::fs::remove_dir_all(dir);
    }
}
