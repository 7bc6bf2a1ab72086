//! Status enums for cart and order state.

use serde::{Deserialize, Serialize};

/// Fulfillment category of a cart.
///
/// A cart holds items of exactly one order type: scheduled orders are baked
/// to order for a future date, same-day pickup orders come from the display
/// case. The two have different checkout requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Made-to-order, picked up or delivered on a later date.
    #[default]
    ScheduledOrder,
    /// Ready-made items picked up today.
    SameDayPickup,
}

impl OrderType {
    /// The snake_case tag used in persisted state and API payloads.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ScheduledOrder => "scheduled_order",
            Self::SameDayPickup => "same_day_pickup",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled_order" => Ok(Self::ScheduledOrder),
            "same_day_pickup" => Ok(Self::SameDayPickup),
            _ => Err(format!("invalid order type: {s}")),
        }
    }
}

/// Lifecycle status of a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_default_is_scheduled() {
        assert_eq!(OrderType::default(), OrderType::ScheduledOrder);
    }

    #[test]
    fn test_order_type_tag_matches_serde() {
        for order_type in [OrderType::ScheduledOrder, OrderType::SameDayPickup] {
            let json = serde_json::to_string(&order_type).unwrap();
            assert_eq!(json, format!("\"{}\"", order_type.as_str()));
            assert_eq!(order_type.as_str().parse::<OrderType>().unwrap(), order_type);
        }
    }

    #[test]
    fn test_order_type_rejects_unknown_tag() {
        assert!("encomenda".parse::<OrderType>().is_err());
        assert!("".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_order_status_display_matches_serde() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Ready,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
    }
}
