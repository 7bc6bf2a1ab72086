//! Order submission.
//!
//! Checkout turns the cart into an [`OrderDraft`], creates it through the
//! entity API, and clears the cart only once the backend has accepted it.
//! The draft's `client_reference` is stored with the cart before the call,
//! so a failed attempt retried against unchanged contents resubmits under
//! the same reference and the backend can drop the duplicate.
//! Scheduled orders and same-day pickups need different fulfillment fields,
//! which is why a cart never mixes the two.

use bakehouse_core::{
    CartState, CartStore, KeyValueStore, LineItemId, OrderStatus, OrderType, Price, ProductId,
    Variations,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entities::{EntityClient, EntityError, record_id};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("A {cart} cart cannot be checked out with {schedule} details")]
    FulfillmentMismatch {
        cart: OrderType,
        schedule: OrderType,
    },

    #[error("Scheduled date {date} must be after {today}")]
    InvalidDate { date: NaiveDate, today: NaiveDate },

    #[error("Order total is too large")]
    TotalOverflow,

    #[error("Failed to encode order: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Entity API error: {0}")]
    Entity(#[from] EntityError),
}

/// When and how the order is fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Made-to-order, ready on `date`.
    Scheduled { date: NaiveDate },
    /// From the display case, collected today at `pickup_time`.
    SameDay { pickup_time: NaiveTime },
}

impl Schedule {
    /// The order type this schedule belongs to.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        match self {
            Self::Scheduled { .. } => OrderType::ScheduledOrder,
            Self::SameDay { .. } => OrderType::SameDayPickup,
        }
    }
}

/// Customer-supplied checkout fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentDetails {
    pub customer_name: String,
    pub customer_phone: String,
    pub notes: Option<String>,
    pub schedule: Schedule,
}

/// One line of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub line_id: LineItemId,
    pub product_id: ProductId,
    pub name: String,
    pub variations: Variations,
    pub quantity: u32,
    pub unit_price: Price,
    pub subtotal: Price,
}

/// The record created in the entity API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    /// Client-generated key, stable across retries of the same cart.
    pub client_reference: Uuid,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    pub item_count: u64,
    pub total: Price,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<NaiveTime>,
}

impl OrderDraft {
    /// Validate the cart and details and assemble the order payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty, a contact field is blank, the
    /// schedule does not match the cart's order type, a scheduled date is
    /// not after `today`, or the total cannot be represented.
    pub fn build(
        cart: &CartState,
        details: &FulfillmentDetails,
        today: NaiveDate,
        client_reference: Uuid,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = cart.checked_total().ok_or(CheckoutError::TotalOverflow)?;

        let customer_name = required(&details.customer_name, "customer_name")?;
        let customer_phone = required(&details.customer_phone, "customer_phone")?;

        let schedule_type = details.schedule.order_type();
        if schedule_type != cart.order_type {
            return Err(CheckoutError::FulfillmentMismatch {
                cart: cart.order_type,
                schedule: schedule_type,
            });
        }

        let (scheduled_date, pickup_time) = match details.schedule {
            Schedule::Scheduled { date } => {
                if date <= today {
                    return Err(CheckoutError::InvalidDate { date, today });
                }
                (Some(date), None)
            }
            Schedule::SameDay { pickup_time } => (None, Some(pickup_time)),
        };

        let items = cart
            .items
            .iter()
            .map(|item| OrderLine {
                line_id: item.id.clone(),
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                variations: item.variations.clone(),
                quantity: item.quantity,
                unit_price: item.price,
                subtotal: item.subtotal(),
            })
            .collect();

        Ok(Self {
            client_reference,
            order_type: cart.order_type,
            status: OrderStatus::Pending,
            items,
            item_count: cart.item_count(),
            total,
            customer_name,
            customer_phone,
            notes: details
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_owned),
            scheduled_date,
            pickup_time,
        })
    }
}

/// What the backend accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedOrder {
    /// Backend record ID.
    pub id: String,
    pub reference: Uuid,
    pub order_type: OrderType,
    /// Status reported by the backend, `pending` if it reported none.
    pub status: OrderStatus,
    pub total: Price,
}

/// Submit the cart as an order and clear it on success.
///
/// On any error the cart contents are left exactly as they were, and the
/// reference the attempt used stays pending for the next try.
///
/// # Errors
///
/// Returns validation errors from [`OrderDraft::build`], or an error if the
/// entity API rejects the order.
#[instrument(skip(cart, client, details), fields(lines = cart.items().len()))]
pub async fn submit_order<S, C>(
    cart: &mut CartStore<S>,
    client: &C,
    entity: &str,
    details: &FulfillmentDetails,
    today: NaiveDate,
) -> Result<SubmittedOrder, CheckoutError>
where
    S: KeyValueStore,
    C: EntityClient,
{
    let pending = cart
        .checkout_reference()
        .and_then(|reference| Uuid::parse_str(reference).ok());
    let draft = OrderDraft::build(
        cart.state(),
        details,
        today,
        pending.unwrap_or_else(Uuid::new_v4),
    )?;
    let payload = serde_json::to_value(&draft)?;

    if pending.is_some() {
        info!(reference = %draft.client_reference, "Retrying order submission");
    } else {
        cart.set_checkout_reference(draft.client_reference.to_string());
    }

    let record = match client.create(entity, payload).await {
        Ok(record) => record,
        Err(e) => {
            warn!(reference = %draft.client_reference, error = %e, "Order submission failed");
            return Err(e.into());
        }
    };
    let id = record_id(&record)?;
    let status = record
        .get("status")
        .and_then(|status| OrderStatus::deserialize(status).ok())
        .unwrap_or(draft.status);

    cart.clear();

    info!(
        order_id = %id,
        reference = %draft.client_reference,
        status = %status,
        total = %draft.total,
        "Order submitted"
    );

    Ok(SubmittedOrder {
        id,
        reference: draft.client_reference,
        order_type: draft.order_type,
        status,
        total: draft.total,
    })
}

fn required(value: &str, field: &'static str) -> Result<String, CheckoutError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    Ok(value.to_owned())
}
