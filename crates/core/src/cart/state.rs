//! Cart contents and the rules a persisted snapshot must satisfy.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::line_item::{LineItem, line_id};
use crate::storage::StorageError;
use crate::types::{LineItemId, OrderType, Price};

/// Why a persisted snapshot was rejected.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Storage(#[from] StorageError),

    #[error("malformed item list: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown order type tag: {0:?}")]
    UnknownOrderType(String),

    /// One of the two keys is present without the other.
    #[error("snapshot is incomplete")]
    Incomplete,

    #[error("line {0} has a zero quantity")]
    ZeroQuantity(LineItemId),

    #[error("line {0} appears more than once")]
    DuplicateLine(LineItemId),

    #[error("line {0} does not match its product and variations")]
    IdMismatch(LineItemId),

    #[error("line {0} has a negative price")]
    NegativePrice(LineItemId),

    #[error("cart total is too large to represent")]
    TotalOverflow,
}

/// A customer's in-progress order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    /// Lines in insertion order.
    pub items: Vec<LineItem>,
    /// Fulfillment category shared by every line.
    pub order_type: OrderType,
}

impl CartState {
    /// `Σ price × quantity`, recomputed on every call.
    ///
    /// Saturates rather than panicking. Carts built through
    /// [`CartStore`](super::CartStore) never reach the limit.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// `Σ price × quantity`, or `None` if any subtotal or the sum overflows.
    #[must_use]
    pub fn checked_total(&self) -> Option<Price> {
        self.items.iter().try_fold(Price::ZERO, |total, item| {
            total.checked_add(item.checked_subtotal()?)
        })
    }

    /// `Σ quantity`, recomputed on every call.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check the invariants a loaded snapshot must hold.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: a zero quantity, a negative price,
    /// a repeated line, a line whose key disagrees with its product and
    /// variations, or a total that cannot be represented.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if item.quantity == 0 {
                return Err(SnapshotError::ZeroQuantity(item.id.clone()));
            }
            if item.price.is_negative() {
                return Err(SnapshotError::NegativePrice(item.id.clone()));
            }
            if line_id(&item.product_id, &item.variations) != item.id {
                return Err(SnapshotError::IdMismatch(item.id.clone()));
            }
            if !seen.insert(&item.id) {
                return Err(SnapshotError::DuplicateLine(item.id.clone()));
            }
        }
        if self.checked_total().is_none() {
            return Err(SnapshotError::TotalOverflow);
        }
        Ok(())
    }

    pub(crate) fn position(&self, id: &LineItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::ProductSnapshot;
    use crate::types::Variations;

    fn line(id: &str, cents: i64, quantity: u32) -> LineItem {
        LineItem::from_product(
            ProductSnapshot::new(id, id, Price::from_cents(cents)),
            Variations::new(),
            quantity,
        )
    }

    #[test]
    fn test_empty_cart_derived_values() {
        let cart = CartState::default();
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.order_type, OrderType::ScheduledOrder);
    }

    #[test]
    fn test_total_and_count() {
        let cart = CartState {
            items: vec![line("a", 1000, 2), line("b", 350, 3)],
            order_type: OrderType::SameDayPickup,
        };
        assert_eq!(cart.total(), Price::from_cents(3050));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let cart = CartState {
            items: vec![line("a", 100, 0)],
            ..CartState::default()
        };
        assert!(matches!(cart.validate(), Err(SnapshotError::ZeroQuantity(_))));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let cart = CartState {
            items: vec![line("a", 100, 1), line("a", 100, 2)],
            ..CartState::default()
        };
        assert!(matches!(cart.validate(), Err(SnapshotError::DuplicateLine(_))));
    }

    #[test]
    fn test_validate_rejects_foreign_id() {
        let mut item = line("a", 100, 1);
        item.id = LineItemId::new("something-else");
        let cart = CartState {
            items: vec![item],
            ..CartState::default()
        };
        assert!(matches!(cart.validate(), Err(SnapshotError::IdMismatch(_))));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let cart = CartState {
            items: vec![line("a", 100, 1), line("b", -1, 1)],
            ..CartState::default()
        };
        assert!(matches!(cart.validate(), Err(SnapshotError::NegativePrice(_))));
    }

    #[test]
    fn test_validate_rejects_unrepresentable_total() {
        let mut huge = line("a", 0, 2);
        huge.price = Price::new(Decimal::MAX);
        let cart = CartState {
            items: vec![huge],
            ..CartState::default()
        };
        assert_eq!(cart.checked_total(), None);
        assert!(matches!(cart.validate(), Err(SnapshotError::TotalOverflow)));

        let mut half = line("a", 0, 1);
        half.price = Price::new(Decimal::MAX);
        let cart = CartState {
            items: vec![half, line("b", 100, 1)],
            ..CartState::default()
        };
        assert!(matches!(cart.validate(), Err(SnapshotError::TotalOverflow)));
    }

    #[test]
    fn test_checked_total_matches_total() {
        let cart = CartState {
            items: vec![line("a", 1000, 2), line("b", 350, 3)],
            ..CartState::default()
        };
        assert_eq!(cart.checked_total(), Some(cart.total()));
    }
}
