//! HTTP route handlers for the store API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Health check
//! GET  /ready                          - Readiness (data service reachable)
//!
//! # Products
//! GET  /products                       - Product listing
//! POST /products                       - Create product (back office)
//! GET  /products/{id}                  - Product detail
//! GET  /products/{id}/reviews          - Approved reviews for a product
//!
//! # Cart (per user)
//! GET    /cart/{user_id}               - Current cart with totals
//! POST   /cart/{user_id}/items         - Add a product to the cart
//! PUT    /cart/{user_id}/items/{id}    - Set an entry's quantity
//! DELETE /cart/{user_id}/items/{id}    - Remove an entry
//! DELETE /cart/{user_id}               - Clear the cart
//! POST   /cart/{user_id}/restore       - Seed an empty cart from the remote mirror
//! POST   /cart/{user_id}/checkout      - Place an order from the cart
//!
//! # Orders
//! GET  /users/{user_id}/orders         - Order history, newest first
//! GET  /orders/{id}                    - Order detail
//! PUT  /orders/{id}/status             - Transition order status (back office)
//!
//! # Reviews
//! POST   /reviews                      - Submit a review (starts unapproved)
//! GET    /reviews/pending              - Moderation queue (back office)
//! POST   /reviews/{id}/approve         - Approve a review (back office)
//! PATCH  /reviews/{id}                 - Edit a review's comment (back office)
//! DELETE /reviews/{id}                 - Delete a review (back office)
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod reviews;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", get(products::reviews))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(cart::show).delete(cart::clear))
        .route("/{user_id}/items", post(cart::add))
        .route(
            "/{user_id}/items/{product_id}",
            put(cart::update).delete(cart::remove),
        )
        .route("/{user_id}/restore", post(cart::restore))
        .route("/{user_id}/checkout", post(checkout::place_order))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::set_status))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/pending", get(reviews::pending))
        .route("/{id}/approve", post(reviews::approve))
        .route("/{id}", patch(reviews::update).delete(reviews::remove))
}

/// Create all routes for the store.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/reviews", review_routes())
        .route("/users/{user_id}/orders", get(orders::for_user))
}
