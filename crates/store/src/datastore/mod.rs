//! The remote data service.
//!
//! Everything shared across clients (products and their stock, orders,
//! reviews, remote cart snapshots) lives behind [`DataService`]. The
//! production backend is Postgres; the in-memory backend backs tests and
//! local development. The one operation with a real concurrency argument is
//! [`DataService::approve_review`]: it must execute as a single atomic unit
//! against the backing store, never as independent read-then-write calls.

pub mod memory;
pub mod postgres;

pub use memory::MemoryDataService;
pub use postgres::{MIGRATOR, PostgresDataService, create_pool};

use async_trait::async_trait;

use creamline_core::{
    CartEntry, NewOrder, NewProduct, NewReview, Order, OrderId, OrderStatus, Product, ProductId,
    Review, ReviewId, UserId,
};

/// Errors from the data service.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The named record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Rejected order status transition.
    #[error("cannot transition order from {from} to {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// A stored value could not be interpreted.
    #[error("data corruption: {0}")]
    Corruption(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for data-service operations.
pub type DataResult<T> = Result<T, DataError>;

/// The remote store the storefront and back office talk to.
///
/// All operations are request/response; callers trust the results as given.
/// `Product.quantity` and the rating aggregate are shared mutable state:
/// ratings are only ever written through [`approve_review`]'s transaction,
/// and stock only through [`decrement_stock`] (intentionally non-atomic;
/// oversell is a reconcilable business condition, not a correctness
/// violation).
///
/// [`approve_review`]: Self::approve_review
/// [`decrement_stock`]: Self::decrement_stock
#[async_trait]
pub trait DataService: Send + Sync {
    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> DataResult<()>;

    // --- products ---

    async fn get_product(&self, id: ProductId) -> DataResult<Product>;
    async fn list_products(&self) -> DataResult<Vec<Product>>;
    async fn create_product(&self, new: NewProduct) -> DataResult<Product>;

    /// Decrement available stock by `delta`, clamping at zero. Best-effort
    /// relative to order placement: a failure here never fails the order.
    async fn decrement_stock(&self, id: ProductId, delta: u32) -> DataResult<()>;

    // --- orders ---

    /// Persist an order at `Pending` status and return its id.
    async fn create_order(&self, new: NewOrder) -> DataResult<OrderId>;
    async fn get_order(&self, id: OrderId) -> DataResult<Order>;
    /// Orders for a user, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> DataResult<Vec<Order>>;

    /// Administrative status transition, validated against the order state
    /// machine. Returns the updated order.
    async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> DataResult<Order>;

    // --- reviews ---

    /// Create an unapproved review.
    async fn create_review(&self, new: NewReview) -> DataResult<Review>;

    /// Fetch a single review regardless of approval state.
    async fn get_review(&self, id: ReviewId) -> DataResult<Review>;

    /// Approve a pending review and fold its rating into the owning
    /// product's aggregate, atomically. Approving an already-approved review
    /// is an idempotent no-op so retries never double-count.
    async fn approve_review(&self, id: ReviewId) -> DataResult<()>;

    /// Edit a review's comment; independent of approval state and of the
    /// rating aggregate.
    async fn update_review_comment(&self, id: ReviewId, comment: &str) -> DataResult<()>;
    async fn delete_review(&self, id: ReviewId) -> DataResult<()>;

    /// Reviews awaiting moderation, oldest first.
    async fn pending_reviews(&self) -> DataResult<Vec<Review>>;
    /// Approved reviews for a product, newest first.
    async fn reviews_for_product(&self, product_id: ProductId) -> DataResult<Vec<Review>>;

    // --- cart snapshots (remote mirror) ---

    async fn cart_snapshot(&self, user_id: UserId) -> DataResult<Option<Vec<CartEntry>>>;
    async fn put_cart_snapshot(&self, user_id: UserId, items: &[CartEntry]) -> DataResult<()>;
    /// Deleting an absent snapshot is a no-op.
    async fn delete_cart_snapshot(&self, user_id: UserId) -> DataResult<()>;
}
