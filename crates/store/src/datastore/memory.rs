//! In-memory data service.
//!
//! Backs tests and local development. A single mutex around the whole state
//! is the transaction primitive: every operation, including the review
//! approval, runs inside one lock hold, so no interleaving is visible to
//! concurrent callers.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use creamline_core::{
    CartEntry, NewOrder, NewProduct, NewReview, Order, OrderId, OrderStatus, Product, ProductId,
    RatingAggregate, Review, ReviewId, UserId,
};
use rust_decimal::Decimal;

use super::{DataError, DataResult, DataService};

#[derive(Default)]
struct MemoryState {
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    reviews: HashMap<ReviewId, Review>,
    carts: HashMap<UserId, Vec<CartEntry>>,
}

/// In-memory [`DataService`] implementation.
#[derive(Default)]
pub struct MemoryDataService {
    inner: Mutex<MemoryState>,
}

impl MemoryDataService {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataService for MemoryDataService {
    async fn ping(&self) -> DataResult<()> {
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> DataResult<Product> {
        let state = self.inner.lock().await;
        state
            .products
            .get(&id)
            .cloned()
            .ok_or(DataError::NotFound("product"))
    }

    async fn list_products(&self) -> DataResult<Vec<Product>> {
        let state = self.inner.lock().await;
        let mut products: Vec<_> = state.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn create_product(&self, new: NewProduct) -> DataResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: ProductId::generate(),
            name: new.name,
            price: new.price,
            quantity: new.quantity,
            category: new.category,
            image_url: new.image_url,
            rating_avg: Decimal::ZERO,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.inner.lock().await;
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn decrement_stock(&self, id: ProductId, delta: u32) -> DataResult<()> {
        let mut state = self.inner.lock().await;
        let product = state
            .products
            .get_mut(&id)
            .ok_or(DataError::NotFound("product"))?;
        product.quantity = product.quantity.saturating_sub(delta);
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn create_order(&self, new: NewOrder) -> DataResult<OrderId> {
        let now = Utc::now();
        let order = Order {
            id: OrderId::generate(),
            user_id: new.user_id,
            items: new.items,
            customer: new.customer,
            subtotal: new.subtotal,
            tax: new.tax,
            total: new.total,
            payment_method: new.payment_method,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut state = self.inner.lock().await;
        let id = order.id;
        state.orders.insert(id, order);
        Ok(id)
    }

    async fn get_order(&self, id: OrderId) -> DataResult<Order> {
        let state = self.inner.lock().await;
        state
            .orders
            .get(&id)
            .cloned()
            .ok_or(DataError::NotFound("order"))
    }

    async fn orders_for_user(&self, user_id: UserId) -> DataResult<Vec<Order>> {
        let state = self.inner.lock().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> DataResult<Order> {
        let mut state = self.inner.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or(DataError::NotFound("order"))?;

        if !order.status.can_transition_to(status) {
            return Err(DataError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }

        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn create_review(&self, new: NewReview) -> DataResult<Review> {
        let mut state = self.inner.lock().await;
        if !state.products.contains_key(&new.product_id) {
            return Err(DataError::NotFound("product"));
        }

        let review = Review {
            id: ReviewId::generate(),
            product_id: new.product_id,
            user_id: new.user_id,
            user_name: new.user_name,
            rating: new.rating,
            comment: new.comment,
            approved: false,
            created_at: Utc::now(),
            approved_at: None,
        };
        state.reviews.insert(review.id, review.clone());
        Ok(review)
    }

    async fn get_review(&self, id: ReviewId) -> DataResult<Review> {
        let state = self.inner.lock().await;
        state
            .reviews
            .get(&id)
            .cloned()
            .ok_or(DataError::NotFound("review"))
    }

    async fn approve_review(&self, id: ReviewId) -> DataResult<()> {
        // One lock hold covers the whole read-compute-write unit.
        let mut state = self.inner.lock().await;

        let review = state
            .reviews
            .get(&id)
            .ok_or(DataError::NotFound("review"))?;
        if review.approved {
            return Ok(());
        }
        let product_id = review.product_id;
        let rating = review.rating;

        let product = state
            .products
            .get(&product_id)
            .ok_or(DataError::NotFound("product"))?;
        let RatingAggregate { average, count } = product.rating().fold(rating);

        let now = Utc::now();
        if let Some(review) = state.reviews.get_mut(&id) {
            review.approved = true;
            review.approved_at = Some(now);
        }
        if let Some(product) = state.products.get_mut(&product_id) {
            product.rating_avg = average;
            product.rating_count = count;
            product.updated_at = now;
        }
        Ok(())
    }

    async fn update_review_comment(&self, id: ReviewId, comment: &str) -> DataResult<()> {
        let mut state = self.inner.lock().await;
        let review = state
            .reviews
            .get_mut(&id)
            .ok_or(DataError::NotFound("review"))?;
        review.comment = comment.to_owned();
        Ok(())
    }

    async fn delete_review(&self, id: ReviewId) -> DataResult<()> {
        let mut state = self.inner.lock().await;
        state
            .reviews
            .remove(&id)
            .map(|_| ())
            .ok_or(DataError::NotFound("review"))
    }

    async fn pending_reviews(&self) -> DataResult<Vec<Review>> {
        let state = self.inner.lock().await;
        let mut reviews: Vec<_> = state
            .reviews
            .values()
            .filter(|r| !r.approved)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reviews)
    }

    async fn reviews_for_product(&self, product_id: ProductId) -> DataResult<Vec<Review>> {
        let state = self.inner.lock().await;
        let mut reviews: Vec<_> = state
            .reviews
            .values()
            .filter(|r| r.approved && r.product_id == product_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    async fn cart_snapshot(&self, user_id: UserId) -> DataResult<Option<Vec<CartEntry>>> {
        let state = self.inner.lock().await;
        Ok(state.carts.get(&user_id).cloned())
    }

    async fn put_cart_snapshot(&self, user_id: UserId, items: &[CartEntry]) -> DataResult<()> {
        let mut state = self.inner.lock().await;
        state.carts.insert(user_id, items.to_vec());
        Ok(())
    }

    async fn delete_cart_snapshot(&self, user_id: UserId) -> DataResult<()> {
        let mut state = self.inner.lock().await;
        state.carts.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use creamline_core::Rating;

    fn new_product(stock: u32) -> NewProduct {
        NewProduct {
            name: "Aged Cheddar 200g".to_string(),
            price: Decimal::new(649, 2),
            quantity: stock,
            category: "cheese".to_string(),
            image_url: None,
        }
    }

    fn new_review(product_id: ProductId, rating: u8) -> NewReview {
        NewReview {
            product_id,
            user_id: UserId::generate(),
            user_name: "Greta".to_string(),
            rating: Rating::new(rating).unwrap(),
            comment: "Lovely and sharp.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_decrement_stock_clamps_at_zero() {
        let data = MemoryDataService::new();
        let product = data.create_product(new_product(3)).await.unwrap();

        data.decrement_stock(product.id, 5).await.unwrap();
        assert_eq!(data.get_product(product.id).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_approve_review_folds_rating() {
        let data = MemoryDataService::new();
        let product = data.create_product(new_product(3)).await.unwrap();
        let review = data.create_review(new_review(product.id, 4)).await.unwrap();

        data.approve_review(review.id).await.unwrap();

        let product = data.get_product(product.id).await.unwrap();
        assert_eq!(product.rating_count, 1);
        assert_eq!(product.rating_avg, Decimal::from(4));

        let approved = data.reviews_for_product(product.id).await.unwrap();
        assert_eq!(approved.len(), 1);
        assert!(approved.first().unwrap().approved);
        assert!(approved.first().unwrap().approved_at.is_some());
    }

    #[tokio::test]
    async fn test_approve_review_is_idempotent() {
        let data = MemoryDataService::new();
        let product = data.create_product(new_product(3)).await.unwrap();
        let review = data.create_review(new_review(product.id, 5)).await.unwrap();

        data.approve_review(review.id).await.unwrap();
        let after_first = data.get_product(product.id).await.unwrap();

        // Retrying must not double-count.
        data.approve_review(review.id).await.unwrap();
        let after_second = data.get_product(product.id).await.unwrap();
        assert_eq!(after_first.rating_avg, after_second.rating_avg);
        assert_eq!(after_first.rating_count, after_second.rating_count);
    }

    #[tokio::test]
    async fn test_get_review_any_approval_state() {
        let data = MemoryDataService::new();
        let product = data.create_product(new_product(3)).await.unwrap();
        let review = data.create_review(new_review(product.id, 4)).await.unwrap();

        assert!(!data.get_review(review.id).await.unwrap().approved);

        data.approve_review(review.id).await.unwrap();
        assert!(data.get_review(review.id).await.unwrap().approved);

        let err = data.get_review(ReviewId::generate()).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound("review")));
    }

    #[tokio::test]
    async fn test_approve_missing_review() {
        let data = MemoryDataService::new();
        let err = data.approve_review(ReviewId::generate()).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound("review")));
    }

    #[tokio::test]
    async fn test_comment_edit_leaves_aggregate_untouched() {
        let data = MemoryDataService::new();
        let product = data.create_product(new_product(3)).await.unwrap();
        let review = data.create_review(new_review(product.id, 2)).await.unwrap();
        data.approve_review(review.id).await.unwrap();

        data.update_review_comment(review.id, "Too sharp after all.")
            .await
            .unwrap();

        let product = data.get_product(product.id).await.unwrap();
        assert_eq!(product.rating_count, 1);
        assert_eq!(product.rating_avg, Decimal::from(2));
    }

    #[tokio::test]
    async fn test_order_status_transitions_validated() {
        let data = MemoryDataService::new();
        let product = data.create_product(new_product(3)).await.unwrap();
        let order_id = data
            .create_order(sample_order(&product))
            .await
            .unwrap();

        let order = data
            .set_order_status(order_id, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);

        let err = data
            .set_order_status(order_id, OrderStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidTransition {
                from: OrderStatus::Processing,
                to: OrderStatus::Delivered,
            }
        ));
    }

    fn sample_order(product: &Product) -> NewOrder {
        use creamline_core::{CustomerInfo, Email, PaymentMethod, Phone};

        NewOrder {
            user_id: UserId::generate(),
            items: vec![CartEntry::from_product(product, 1)],
            customer: CustomerInfo {
                full_name: "Greta Holm".to_string(),
                email: Email::parse("greta@example.com").unwrap(),
                phone: Phone::parse("5550102233").unwrap(),
                street: "12 Dairy Lane".to_string(),
                city: "Churnville".to_string(),
                postal_code: "12345".to_string(),
            },
            subtotal: product.price,
            tax: Decimal::ZERO,
            total: product.price,
            payment_method: PaymentMethod::CashOnDelivery,
        }
    }
}
