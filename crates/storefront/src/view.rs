//! Cart display data.
//!
//! Flattens a cart into preformatted strings so renderers (the CLI today)
//! don't repeat price formatting or variation labelling.

use bakehouse_core::{CartState, LineItem, OrderType, Price};

/// Currency symbol prefixed to displayed prices.
pub const CURRENCY_SYMBOL: &str = "R$";

/// Cart item display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub variant_title: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub order_type: String,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&CartState::default())
    }
}

/// Format a price for display, e.g. `R$ 12.50`.
#[must_use]
pub fn format_price(price: Price) -> String {
    format!("{CURRENCY_SYMBOL} {price}")
}

/// Human label for an order type.
#[must_use]
pub const fn order_type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::ScheduledOrder => "Scheduled order",
        OrderType::SameDayPickup => "Same-day pickup",
    }
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            order_type: order_type_label(cart.order_type).to_string(),
            subtotal: format_price(cart.total()),
            item_count: cart.item_count(),
        }
    }
}

impl From<&LineItem> for CartItemView {
    fn from(line: &LineItem) -> Self {
        Self {
            id: line.id.to_string(),
            title: line.name.clone(),
            variant_title: if line.variations.is_empty() {
                None
            } else {
                Some(
                    line.variations
                        .iter()
                        .map(|(name, value)| format!("{name}: {value}"))
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            },
            quantity: line.quantity,
            price: format_price(line.price),
            line_price: format_price(line.subtotal()),
            image: line.image.clone(),
        }
    }
}
