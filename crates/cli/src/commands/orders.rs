//! Order status management commands.

use creamline_core::{OrderId, OrderStatus};
use creamline_store::datastore::DataService;

use super::{CommandError, connect};

/// Transition an order to a new status, subject to the order state machine.
pub async fn set_status(id: &str, status: &str) -> Result<(), CommandError> {
    let id: OrderId = id
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("not an order id: {id}")))?;
    let status: OrderStatus = status
        .parse()
        .map_err(|e: String| CommandError::InvalidArgument(e))?;

    let data = connect().await?;
    let order = data.set_order_status(id, status).await?;
    tracing::info!(order_id = %order.id, status = %order.status, "order status updated");

    Ok(())
}
