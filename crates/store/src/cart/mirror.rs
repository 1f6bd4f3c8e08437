//! Best-effort remote cart mirror.
//!
//! Shadows the local cart into a per-user remote record for cross-session
//! continuity. Never authoritative: the local cart always wins, except at the
//! single login moment when a remote snapshot may seed an empty local cart.
//! Every sync is at-most-once with no retry; failures are logged and
//! swallowed and must never block or roll back the local mutation that
//! triggered them. Remote writes for one user go one at a time, and a sync
//! that has been superseded by a newer local state skips its write, so the
//! remote record converges on the last attempted state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use creamline_core::{CartEntry, UserId};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::datastore::DataService;

/// Shadows one user's cart to the remote data service.
#[derive(Clone)]
pub struct CartMirror {
    data: Arc<dyn DataService>,
    user_id: UserId,
    generation: Arc<AtomicU64>,
    gate: Arc<Mutex<()>>,
}

impl CartMirror {
    /// Mirror for the given user.
    #[must_use]
    pub fn new(data: Arc<dyn DataService>, user_id: UserId) -> Self {
        Self {
            data,
            user_id,
            generation: Arc::new(AtomicU64::new(0)),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Asynchronously push the current local state to the remote record.
    ///
    /// An empty cart deletes the remote record instead of storing an empty
    /// list. The returned handle is only awaited by tests; production callers
    /// drop it (fire-and-forget).
    pub fn sync(&self, entries: Vec<CartEntry>) -> JoinHandle<()> {
        let seq = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let data = Arc::clone(&self.data);
        let generation = Arc::clone(&self.generation);
        let gate = Arc::clone(&self.gate);
        let user_id = self.user_id;

        tokio::spawn(async move {
            let _guard = gate.lock().await;
            if generation.load(Ordering::SeqCst) != seq {
                // A newer local state already has its own sync queued.
                return;
            }

            let result = if entries.is_empty() {
                data.delete_cart_snapshot(user_id).await
            } else {
                data.put_cart_snapshot(user_id, &entries).await
            };

            if let Err(e) = result {
                tracing::warn!(user_id = %user_id, error = %e, "cart mirror sync failed");
            }
        })
    }

    /// Fetch the remote snapshot, if any. Failures are logged and reported as
    /// "no snapshot" so login can proceed.
    pub async fn fetch(&self) -> Option<Vec<CartEntry>> {
        match self.data.cart_snapshot(self.user_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(user_id = %self.user_id, error = %e, "cart mirror fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::datastore::{DataError, DataResult};
    use async_trait::async_trait;
    use chrono::Utc;
    use creamline_core::{
        NewOrder, NewProduct, NewReview, Order, OrderId, OrderStatus, Product, ProductId, Review,
        ReviewId,
    };
    use rust_decimal::Decimal;

    /// Records every snapshot write so tests can see which syncs ran.
    #[derive(Default)]
    struct RecordingService {
        puts: std::sync::Mutex<Vec<Vec<CartEntry>>>,
    }

    #[async_trait]
    impl DataService for RecordingService {
        async fn ping(&self) -> DataResult<()> {
            Ok(())
        }

        async fn get_product(&self, _: ProductId) -> DataResult<Product> {
            Err(DataError::NotFound("product"))
        }

        async fn list_products(&self) -> DataResult<Vec<Product>> {
            Ok(Vec::new())
        }

        async fn create_product(&self, _: NewProduct) -> DataResult<Product> {
            Err(DataError::NotFound("product"))
        }

        async fn decrement_stock(&self, _: ProductId, _: u32) -> DataResult<()> {
            Ok(())
        }

        async fn create_order(&self, _: NewOrder) -> DataResult<OrderId> {
            Ok(OrderId::generate())
        }

        async fn get_order(&self, _: OrderId) -> DataResult<Order> {
            Err(DataError::NotFound("order"))
        }

        async fn orders_for_user(&self, _: UserId) -> DataResult<Vec<Order>> {
            Ok(Vec::new())
        }

        async fn set_order_status(&self, _: OrderId, _: OrderStatus) -> DataResult<Order> {
            Err(DataError::NotFound("order"))
        }

        async fn create_review(&self, _: NewReview) -> DataResult<Review> {
            Err(DataError::NotFound("product"))
        }

        async fn get_review(&self, _: ReviewId) -> DataResult<Review> {
            Err(DataError::NotFound("review"))
        }

        async fn approve_review(&self, _: ReviewId) -> DataResult<()> {
            Ok(())
        }

        async fn update_review_comment(&self, _: ReviewId, _: &str) -> DataResult<()> {
            Ok(())
        }

        async fn delete_review(&self, _: ReviewId) -> DataResult<()> {
            Ok(())
        }

        async fn pending_reviews(&self) -> DataResult<Vec<Review>> {
            Ok(Vec::new())
        }

        async fn reviews_for_product(&self, _: ProductId) -> DataResult<Vec<Review>> {
            Ok(Vec::new())
        }

        async fn cart_snapshot(&self, _: UserId) -> DataResult<Option<Vec<CartEntry>>> {
            Ok(self.puts.lock().unwrap().last().cloned())
        }

        async fn put_cart_snapshot(&self, _: UserId, items: &[CartEntry]) -> DataResult<()> {
            self.puts.lock().unwrap().push(items.to_vec());
            Ok(())
        }

        async fn delete_cart_snapshot(&self, _: UserId) -> DataResult<()> {
            Ok(())
        }
    }

    fn product(stock: u32) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Kefir 1l".to_string(),
            price: Decimal::new(349, 2),
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
    async fn test_superseded_sync_never_writes() {
        let data = Arc::new(RecordingService::default());
        let mirror = CartMirror::new(data.clone(), UserId::generate());

        let kefir = product(5);
        let older = vec![CartEntry::from_product(&kefir, 1)];
        let newer = vec![CartEntry::from_product(&kefir, 3)];

        // Neither task runs before the first await on a current-thread
        // runtime, so the first sync is already stale when it gets its turn.
        let first = mirror.sync(older);
        let second = mirror.sync(newer.clone());
        first.await.unwrap();
        second.await.unwrap();

        let puts = data.puts.lock().unwrap();
        assert_eq!(*puts, vec![newer]);
    }

    #[tokio::test]
    async fn test_sequential_syncs_apply_in_order() {
        let data = Arc::new(RecordingService::default());
        let mirror = CartMirror::new(data.clone(), UserId::generate());

        let kefir = product(5);
        let v1 = vec![CartEntry::from_product(&kefir, 1)];
        let v2 = vec![CartEntry::from_product(&kefir, 2)];

        mirror.sync(v1.clone()).await.unwrap();
        mirror.sync(v2.clone()).await.unwrap();

        let puts = data.puts.lock().unwrap();
        assert_eq!(*puts, vec![v1, v2]);
    }
}
