//! Checkout command.

use bakehouse_storefront::checkout::{FulfillmentDetails, Schedule};
use bakehouse_storefront::error::AppError;
use bakehouse_storefront::state::AppState;
use bakehouse_storefront::view::format_price;
use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{info, warn};

/// Submit the cart as an order.
///
/// Exactly one of `date` (scheduled order) or `pickup_time` (same-day
/// pickup) must be given; clap enforces this before we get here.
///
/// # Errors
///
/// Returns an error if the entity API is not configured, validation fails,
/// or the API rejects the order.
pub async fn submit(
    state: &mut AppState,
    name: String,
    phone: String,
    notes: Option<String>,
    date: Option<NaiveDate>,
    pickup_time: Option<NaiveTime>,
) -> Result<(), AppError> {
    let schedule = match (date, pickup_time) {
        (Some(date), None) => Schedule::Scheduled { date },
        (None, Some(pickup_time)) => Schedule::SameDay { pickup_time },
        _ => {
            return Err(AppError::BadRequest(
                "pass either --date or --pickup-time".to_string(),
            ));
        }
    };

    let details = FulfillmentDetails {
        customer_name: name,
        customer_phone: phone,
        notes,
        schedule,
    };

    let today = Local::now().date_naive();
    let order = match state.checkout(&details, today).await {
        Ok(order) => order,
        Err(e) => {
            if e.is_transient() {
                warn!(
                    reference = state.cart().checkout_reference().unwrap_or_default(),
                    "Checkout can be retried; the cart was kept"
                );
            }
            return Err(e);
        }
    };

    info!(
        order_id = %order.id,
        reference = %order.reference,
        order_type = %order.order_type,
        status = %order.status,
        total = %format_price(order.total),
        "Order placed"
    );
    Ok(())
}
