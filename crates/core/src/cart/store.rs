//! The cart store: authoritative in-memory cart plus write-through persistence.

use tracing::{debug, warn};

use super::line_item::{LineItem, ProductSnapshot, line_id};
use super::state::{CartState, SnapshotError};
use crate::storage::KeyValueStore;
use crate::types::{LineItemId, OrderType, Price, Variations};

/// Storage keys for the persisted cart.
pub mod keys {
    /// JSON array of line items.
    pub const ITEMS: &str = "cart_items";

    /// Order type tag (`scheduled_order` / `same_day_pickup`).
    pub const ORDER_TYPE: &str = "cart_order_type";

    /// Reference of a checkout attempt not yet confirmed. Absent otherwise.
    pub const CHECKOUT_REFERENCE: &str = "cart_checkout_reference";
}

/// A request to put a product in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
    pub variations: Variations,
    /// `None` keeps the cart's current order type.
    pub order_type: Option<OrderType>,
}

impl AddItem {
    #[must_use]
    pub fn new(product: ProductSnapshot, quantity: u32) -> Self {
        Self {
            product,
            quantity,
            variations: Variations::new(),
            order_type: None,
        }
    }

    #[must_use]
    pub fn with_variations(mut self, variations: Variations) -> Self {
        self.variations = variations;
        self
    }

    #[must_use]
    pub fn with_variation(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variations.insert(name, value);
        self
    }

    #[must_use]
    pub const fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Some(order_type);
        self
    }
}

/// Passed to the confirmation callback when an add would mix order types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTypeConflict {
    /// Type of the items already in the cart.
    pub current: OrderType,
    /// Type of the item being added.
    pub requested: OrderType,
    /// Number of lines that confirming would discard.
    pub lines_in_cart: usize,
}

/// What `add_item` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Added(LineItemId),
    /// An existing line's quantity was increased.
    Merged(LineItemId),
    /// The conflicting cart was cleared and the item added as its only line.
    Replaced(LineItemId),
    /// The caller declined to clear a conflicting cart. Nothing changed.
    Declined,
    /// Zero quantity. Nothing changed.
    Ignored,
    /// Negative price, or a line or cart total too large to represent.
    /// Nothing changed.
    Rejected,
}

impl AddOutcome {
    /// Whether the cart changed.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Added(_) | Self::Merged(_) | Self::Replaced(_))
    }
}

/// What `update_quantity` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityUpdate {
    Set,
    Removed,
    NotFound,
    /// The new quantity would make the total unrepresentable. Nothing changed.
    Rejected,
}

/// A customer's cart, persisted through a [`KeyValueStore`] on every change.
///
/// Construct one at startup with [`CartStore::load`] and hand it to whatever
/// renders or mutates the cart. Operations never fail: unknown line IDs are
/// no-ops and persistence errors are logged while the in-memory state stays
/// authoritative.
///
/// ```rust
/// use bakehouse_core::{AddItem, CartStore, MemoryStore, Price, ProductSnapshot};
///
/// let mut cart = CartStore::load(MemoryStore::new());
/// let cake = ProductSnapshot::new("p1", "Cake", Price::from_cents(1000));
/// cart.add_item(AddItem::new(cake, 2).with_variation("size", "M"), |_| false);
///
/// assert_eq!(cart.item_count(), 2);
/// assert_eq!(cart.total(), Price::from_cents(2000));
/// ```
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    state: CartState,
    checkout_reference: Option<String>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Start with an empty cart without reading `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: CartState::default(),
            checkout_reference: None,
        }
    }

    /// Restore the cart persisted in `storage`.
    ///
    /// A missing, unreadable, or inconsistent snapshot yields an empty cart
    /// with the default order type.
    #[must_use]
    pub fn load(storage: S) -> Self {
        let state = match read_snapshot(&storage) {
            Ok(Some(state)) => {
                debug!(
                    lines = state.items.len(),
                    order_type = %state.order_type,
                    "Restored cart"
                );
                state
            }
            Ok(None) => CartState::default(),
            Err(e) => {
                warn!(error = %e, "Discarding unusable cart snapshot");
                CartState::default()
            }
        };

        let checkout_reference = if state.is_empty() {
            None
        } else {
            storage.get(keys::CHECKOUT_REFERENCE).ok().flatten()
        };

        Self {
            storage,
            state,
            checkout_reference,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.state.items
    }

    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.state.order_type
    }

    /// Look up a line by ID.
    #[must_use]
    pub fn line(&self, id: &LineItemId) -> Option<&LineItem> {
        self.state.items.iter().find(|item| &item.id == id)
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.state.total()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.state.item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Reference of the last checkout attempt for the current contents.
    ///
    /// Set by checkout before submitting and kept until the cart changes, so
    /// a retried submission reuses it. Every mutation clears it.
    #[must_use]
    pub fn checkout_reference(&self) -> Option<&str> {
        self.checkout_reference.as_deref()
    }

    /// Record the reference a checkout attempt is about to submit under.
    pub fn set_checkout_reference(&mut self, reference: impl Into<String>) {
        self.checkout_reference = Some(reference.into());
        self.persist();
    }

    /// Add a product to the cart.
    ///
    /// If the cart holds items of a different order type, `confirm` decides:
    /// `true` clears the cart and adds the item, `false` leaves everything as
    /// it was. `confirm` is not called in any other case.
    pub fn add_item<F>(&mut self, request: AddItem, confirm: F) -> AddOutcome
    where
        F: FnOnce(&OrderTypeConflict) -> bool,
    {
        let AddItem {
            product,
            quantity,
            variations,
            order_type,
        } = request;

        if quantity == 0 {
            debug!(product_id = %product.id, "Ignoring add with zero quantity");
            return AddOutcome::Ignored;
        }
        if product.price.is_negative() {
            warn!(product_id = %product.id, price = %product.price, "Rejecting negative price");
            return AddOutcome::Rejected;
        }

        let requested = order_type.unwrap_or(self.state.order_type);
        let mut next = self.state.clone();
        let mut replaced = false;

        if requested != next.order_type {
            if !next.is_empty() {
                let conflict = OrderTypeConflict {
                    current: next.order_type,
                    requested,
                    lines_in_cart: next.items.len(),
                };
                if !confirm(&conflict) {
                    debug!(
                        current = %conflict.current,
                        requested = %conflict.requested,
                        "Order type change declined"
                    );
                    return AddOutcome::Declined;
                }
                next.items.clear();
                replaced = true;
            }
            next.order_type = requested;
        }

        let id = line_id(&product.id, &variations);
        let outcome = if let Some(index) = next.position(&id) {
            if let Some(line) = next.items.get_mut(index) {
                line.quantity = line.quantity.saturating_add(quantity);
            }
            AddOutcome::Merged(id)
        } else {
            next.items.push(LineItem::from_product(product, variations, quantity));
            if replaced {
                AddOutcome::Replaced(id)
            } else {
                AddOutcome::Added(id)
            }
        };

        if next.checked_total().is_none() {
            warn!(outcome = ?outcome, quantity, "Rejecting add: cart total would overflow");
            return AddOutcome::Rejected;
        }

        debug!(outcome = ?outcome, quantity, "Cart item added");
        self.commit(next);
        outcome
    }

    /// Set a line's quantity. Zero or negative removes the line.
    pub fn update_quantity(&mut self, id: &LineItemId, quantity: i64) -> QuantityUpdate {
        let Some(index) = self.state.position(id) else {
            return QuantityUpdate::NotFound;
        };

        let mut next = self.state.clone();
        let update = if quantity <= 0 {
            next.items.remove(index);
            QuantityUpdate::Removed
        } else {
            if let Some(line) = next.items.get_mut(index) {
                line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
            QuantityUpdate::Set
        };

        if next.checked_total().is_none() {
            warn!(line_id = %id, quantity, "Rejecting quantity: cart total would overflow");
            return QuantityUpdate::Rejected;
        }

        debug!(line_id = %id, quantity, update = ?update, "Cart quantity updated");
        self.commit(next);
        update
    }

    /// Remove a line. Returns whether one was removed.
    pub fn remove_item(&mut self, id: &LineItemId) -> bool {
        let Some(index) = self.state.position(id) else {
            return false;
        };

        let mut next = self.state.clone();
        next.items.remove(index);
        debug!(line_id = %id, "Cart item removed");
        self.commit(next);
        true
    }

    /// Empty the cart and reset the order type.
    pub fn clear(&mut self) {
        debug!("Cart cleared");
        self.commit(CartState::default());
    }

    /// Replace the contents. Any pending checkout reference belongs to the
    /// old contents and is dropped.
    fn commit(&mut self, state: CartState) {
        self.state = state;
        self.checkout_reference = None;
        self.persist();
    }

    /// Rewrite the full snapshot in one batch. Failures are logged, never
    /// returned.
    fn persist(&mut self) {
        let items = match serde_json::to_string(&self.state.items) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to encode cart items");
                return;
            }
        };

        let entries = [
            (keys::ITEMS, Some(items.as_str())),
            (keys::ORDER_TYPE, Some(self.state.order_type.as_str())),
            (keys::CHECKOUT_REFERENCE, self.checkout_reference.as_deref()),
        ];
        if let Err(e) = self.storage.set_many(&entries) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}

fn read_snapshot<S: KeyValueStore>(storage: &S) -> Result<Option<CartState>, SnapshotError> {
    let items = storage.get(keys::ITEMS)?;
    let order_type = storage.get(keys::ORDER_TYPE)?;

    let (items, order_type) = match (items, order_type) {
        (None, None) => return Ok(None),
        (Some(items), Some(order_type)) => (items, order_type),
        _ => return Err(SnapshotError::Incomplete),
    };

    let state = CartState {
        items: serde_json::from_str(&items)?,
        order_type: order_type
            .parse()
            .map_err(|_| SnapshotError::UnknownOrderType(order_type.clone()))?,
    };
    state.validate()?;

    Ok(Some(state))
}
