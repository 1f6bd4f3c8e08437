//! Postgres-backed data service.
//!
//! Queries are bound at runtime so the crate builds without a live database;
//! the schema lives in `migrations/` and is applied via the CLI, never at
//! startup. The review-approval transaction takes `FOR UPDATE` row locks on
//! the review and its product so concurrent approvals against the same
//! product serialize instead of losing updates.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;

use creamline_core::{
    CartEntry, CustomerInfo, NewOrder, NewProduct, NewReview, Order, OrderId, OrderStatus,
    PaymentMethod, Product, ProductId, Rating, RatingAggregate, Review, ReviewId, UserId,
};

use super::{DataError, DataResult, DataService};

/// Embedded migrations, run via `creamline migrate`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Postgres [`DataService`] implementation.
#[derive(Clone)]
pub struct PostgresDataService {
    pool: PgPool,
}

impl PostgresDataService {
    /// Service over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn product_from_row(row: &PgRow) -> DataResult<Product> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        quantity: to_u32(row.try_get("quantity")?),
        category: row.try_get("category")?,
        image_url: row.try_get("image_url")?,
        rating_avg: row.try_get("rating_avg")?,
        rating_count: to_u32(row.try_get("rating_count")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn order_from_row(row: &PgRow) -> DataResult<Order> {
    let Json(items): Json<Vec<CartEntry>> = row.try_get("items")?;
    let Json(customer): Json<CustomerInfo> = row.try_get("customer")?;
    let payment_method: String = row.try_get("payment_method")?;
    let payment_method: PaymentMethod = payment_method
        .parse()
        .map_err(DataError::Corruption)?;
    let status: String = row.try_get("status")?;
    let status: OrderStatus = status.parse().map_err(DataError::Corruption)?;

    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        items,
        customer,
        subtotal: row.try_get("subtotal")?,
        tax: row.try_get("tax")?,
        total: row.try_get("total")?,
        payment_method,
        status,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn review_from_row(row: &PgRow) -> DataResult<Review> {
    let rating: i16 = row.try_get("rating")?;
    let rating = Rating::new(u8::try_from(rating).unwrap_or(0))
        .map_err(|e| DataError::Corruption(format!("invalid rating in database: {e}")))?;

    Ok(Review {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        rating,
        comment: row.try_get("comment")?,
        approved: row.try_get("approved")?,
        created_at: row.try_get("created_at")?,
        approved_at: row.try_get("approved_at")?,
    })
}

#[async_trait]
impl DataService for PostgresDataService {
    async fn ping(&self) -> DataResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> DataResult<Product> {
        let row = sqlx::query(
            "SELECT id, name, price, quantity, category, image_url, rating_avg, rating_count, \
             created_at, updated_at FROM product WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DataError::NotFound("product"))?;

        product_from_row(&row)
    }

    async fn list_products(&self) -> DataResult<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, price, quantity, category, image_url, rating_avg, rating_count, \
             created_at, updated_at FROM product ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn create_product(&self, new: NewProduct) -> DataResult<Product> {
        let row = sqlx::query(
            "INSERT INTO product (id, name, price, quantity, category, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, name, price, quantity, category, image_url, rating_avg, rating_count, \
             created_at, updated_at",
        )
        .bind(ProductId::generate())
        .bind(&new.name)
        .bind(new.price)
        .bind(to_i32(new.quantity))
        .bind(&new.category)
        .bind(&new.image_url)
        .fetch_one(&self.pool)
        .await?;

        product_from_row(&row)
    }

    async fn decrement_stock(&self, id: ProductId, delta: u32) -> DataResult<()> {
        let result = sqlx::query(
            "UPDATE product SET quantity = GREATEST(quantity - $2, 0), updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(to_i32(delta))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::NotFound("product"));
        }
        Ok(())
    }

    async fn create_order(&self, new: NewOrder) -> DataResult<OrderId> {
        let id = OrderId::generate();
        sqlx::query(
            "INSERT INTO store_order \
             (id, user_id, items, customer, subtotal, tax, total, payment_method, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(id)
        .bind(new.user_id)
        .bind(Json(&new.items))
        .bind(Json(&new.customer))
        .bind(new.subtotal)
        .bind(new.tax)
        .bind(new.total)
        .bind(new.payment_method.to_string())
        .bind(OrderStatus::Pending.to_string())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_order(&self, id: OrderId) -> DataResult<Order> {
        let row = sqlx::query(
            "SELECT id, user_id, items, customer, subtotal, tax, total, payment_method, status, \
             created_at, updated_at FROM store_order WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DataError::NotFound("order"))?;

        order_from_row(&row)
    }

    async fn orders_for_user(&self, user_id: UserId) -> DataResult<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT id, user_id, items, customer, subtotal, tax, total, payment_method, status, \
             created_at, updated_at FROM store_order WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn set_order_status(&self, id: OrderId, status: OrderStatus) -> DataResult<Order> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT status FROM store_order WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DataError::NotFound("order"))?;
        let current: String = row.try_get("status")?;
        let current: OrderStatus = current.parse().map_err(DataError::Corruption)?;

        if !current.can_transition_to(status) {
            return Err(DataError::InvalidTransition {
                from: current,
                to: status,
            });
        }

        let row = sqlx::query(
            "UPDATE store_order SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING id, user_id, items, customer, subtotal, tax, total, payment_method, \
             status, created_at, updated_at",
        )
        .bind(id)
        .bind(status.to_string())
        .fetch_one(&mut *tx)
        .await?;
        let order = order_from_row(&row)?;

        tx.commit().await?;
        Ok(order)
    }

    async fn create_review(&self, new: NewReview) -> DataResult<Review> {
        let row = sqlx::query(
            "INSERT INTO review (id, product_id, user_id, user_name, rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, product_id, user_id, user_name, rating, comment, approved, \
             created_at, approved_at",
        )
        .bind(ReviewId::generate())
        .bind(new.product_id)
        .bind(new.user_id)
        .bind(&new.user_name)
        .bind(i16::from(new.rating.value()))
        .bind(&new.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return DataError::NotFound("product");
            }
            DataError::Database(e)
        })?;

        review_from_row(&row)
    }

    async fn get_review(&self, id: ReviewId) -> DataResult<Review> {
        let row = sqlx::query(
            "SELECT id, product_id, user_id, user_name, rating, comment, approved, created_at, \
             approved_at FROM review WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DataError::NotFound("review"))?;

        review_from_row(&row)
    }

    async fn approve_review(&self, id: ReviewId) -> DataResult<()> {
        // The whole read-compute-write unit runs in one transaction with the
        // review and product rows locked; concurrent approvals for the same
        // product serialize on the product lock.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT product_id, rating, approved FROM review WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DataError::NotFound("review"))?;

        let approved: bool = row.try_get("approved")?;
        if approved {
            // Idempotent: a retry of an already-approved review must not
            // touch the aggregate again.
            tx.commit().await?;
            return Ok(());
        }

        let product_id: ProductId = row.try_get("product_id")?;
        let rating: i16 = row.try_get("rating")?;
        let rating = Rating::new(u8::try_from(rating).unwrap_or(0))
            .map_err(|e| DataError::Corruption(format!("invalid rating in database: {e}")))?;

        let row = sqlx::query(
            "SELECT rating_avg, rating_count FROM product WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DataError::NotFound("product"))?;

        let aggregate = RatingAggregate {
            average: row.try_get::<Decimal, _>("rating_avg")?,
            count: to_u32(row.try_get("rating_count")?),
        }
        .fold(rating);

        sqlx::query("UPDATE review SET approved = TRUE, approved_at = now() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE product SET rating_avg = $2, rating_count = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(product_id)
        .bind(aggregate.average)
        .bind(to_i32(aggregate.count))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_review_comment(&self, id: ReviewId, comment: &str) -> DataResult<()> {
        let result = sqlx::query("UPDATE review SET comment = $2 WHERE id = $1")
            .bind(id)
            .bind(comment)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::NotFound("review"));
        }
        Ok(())
    }

    async fn delete_review(&self, id: ReviewId) -> DataResult<()> {
        let result = sqlx::query("DELETE FROM review WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::NotFound("review"));
        }
        Ok(())
    }

    async fn pending_reviews(&self) -> DataResult<Vec<Review>> {
        let rows = sqlx::query(
            "SELECT id, product_id, user_id, user_name, rating, comment, approved, created_at, \
             approved_at FROM review WHERE NOT approved ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(review_from_row).collect()
    }

    async fn reviews_for_product(&self, product_id: ProductId) -> DataResult<Vec<Review>> {
        let rows = sqlx::query(
            "SELECT id, product_id, user_id, user_name, rating, comment, approved, created_at, \
             approved_at FROM review WHERE approved AND product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(review_from_row).collect()
    }

    async fn cart_snapshot(&self, user_id: UserId) -> DataResult<Option<Vec<CartEntry>>> {
        let row = sqlx::query("SELECT items FROM cart_snapshot WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(items): Json<Vec<CartEntry>> = row.try_get("items")?;
                Ok(Some(items))
            }
            None => Ok(None),
        }
    }

    async fn put_cart_snapshot(&self, user_id: UserId, items: &[CartEntry]) -> DataResult<()> {
        sqlx::query(
            "INSERT INTO cart_snapshot (user_id, items, updated_at) VALUES ($1, $2, now()) \
             ON CONFLICT (user_id) DO UPDATE SET items = EXCLUDED.items, updated_at = now()",
        )
        .bind(user_id)
        .bind(Json(items))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_cart_snapshot(&self, user_id: UserId) -> DataResult<()> {
        sqlx::query("DELETE FROM cart_snapshot WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
