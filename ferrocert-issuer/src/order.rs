//! Order coordination

use crate::certificate::Certificate;
use crate::context::PrepareContext;
use crate::error::{PrepareError, Result};
use ferrocert_acme::{Order, OrderCreate, Status};
use tracing::info;

/// Resume the certificate's recorded order if it is still usable, otherwise
/// create a new one
///
/// The recorded order is reused only when it covers exactly the
/// certificate's current domains and is valid, pending or processing. A
/// failed lookup is returned as-is rather than replaced by a new order.
pub async fn get_or_create_order(
    ctx: &PrepareContext<'_>,
    crt: &mut Certificate,
) -> Result<Order> {
    let Some(order_url) = crt.order_url().map(str::to_string) else {
        info!(certificate = %crt.name, "Existing order URL not set. Creating new order");
        return create_order(ctx, crt).await;
    };

    info!(certificate = %crt.name, order_url = %order_url, "Requesting existing order details");
    let mut order = ctx
        .guard(ctx.client.get_order(&order_url))
        .await
        .inspect_err(|e| {
            info!(certificate = %crt.name, order_url = %order_url, error = %e, "Error getting existing order");
        })?;

    if order.url.is_empty() {
        order.url = order_url;
    }

    if !order.is_bound_to(&crt.domains()) {
        info!(
            certificate = %crt.name,
            order_url = %order.url,
            "Certificate domains have changed since order was created. Creating new order"
        );
        return create_order(ctx, crt).await;
    }

    match order.status {
        Status::Deactivated | Status::Invalid | Status::Revoked => {
            info!(
                certificate = %crt.name,
                order_url = %order.url,
                status = %order.status,
                "Existing order is no longer usable. Creating new order"
            );
            create_order(ctx, crt).await
        }
        Status::Valid | Status::Pending | Status::Processing => {
            info!(
                certificate = %crt.name,
                order_url = %order.url,
                status = %order.status,
                "Using existing order"
            );
            Ok(order)
        }
        status => Err(PrepareError::UnknownOrderStatus {
            url: order.url,
            status,
        }),
    }
}

/// Create an order for the certificate's domains and record its URL on the
/// certificate
pub async fn create_order(ctx: &PrepareContext<'_>, crt: &mut Certificate) -> Result<Order> {
    let request = OrderCreate::new(crt.domains());
    let order = ctx.guard(ctx.client.create_order(&request)).await?;

    info!(certificate = %crt.name, order_url = %order.url, "Created order for certificate");
    crt.set_order_url(order.url.clone());
    Ok(order)
}
