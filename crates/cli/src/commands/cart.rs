//! Cart commands.

use std::io::{self, BufRead, Write};

use bakehouse_core::{
    AddItem, AddOutcome, CartStore, KeyValueStore, LineItemId, OrderType, OrderTypeConflict, Price,
    ProductSnapshot, QuantityUpdate, Variations,
};
use bakehouse_storefront::state::AppState;
use bakehouse_storefront::view::{CartView, order_type_label};
use tracing::{info, warn};

/// How to settle an order type conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAnswer {
    /// Ask on the terminal.
    Prompt,
    Replace,
    Keep,
}

impl ConflictAnswer {
    #[must_use]
    pub const fn from_flags(yes: bool, no: bool) -> Self {
        match (yes, no) {
            (true, _) => Self::Replace,
            (false, true) => Self::Keep,
            (false, false) => Self::Prompt,
        }
    }
}

/// Raw `cart add` arguments.
#[derive(Debug)]
pub struct AddInput {
    pub product_id: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub variations: Vec<String>,
    pub order_type: Option<OrderType>,
    pub answer: ConflictAnswer,
}

impl AddInput {
    /// Validate the arguments into a cart request.
    ///
    /// # Errors
    ///
    /// Returns an error for an unparseable or negative price, a zero
    /// quantity, or a malformed variation.
    pub fn into_request(self) -> Result<AddItem, Box<dyn std::error::Error>> {
        let price: Price = self
            .price
            .parse()
            .map_err(|e| format!("invalid price {:?}: {e}", self.price))?;
        if price.is_negative() {
            return Err(format!("price cannot be negative: {price}").into());
        }
        if self.quantity == 0 {
            return Err("quantity must be at least 1".into());
        }

        let variations = self
            .variations
            .iter()
            .map(|pair| Variations::parse_pair(pair))
            .collect::<Result<Variations, _>>()?;

        let mut product = ProductSnapshot::new(self.product_id, self.name, price);
        if let Some(image) = self.image {
            product = product.with_image(image);
        }

        let mut request = AddItem::new(product, self.quantity).with_variations(variations);
        if let Some(order_type) = self.order_type {
            request = request.with_order_type(order_type);
        }
        Ok(request)
    }
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn show(state: &AppState) -> io::Result<()> {
    let view = CartView::from(state.cart().state());
    let mut out = io::stdout().lock();

    if view.items.is_empty() {
        writeln!(out, "Cart is empty ({})", view.order_type)?;
        return Ok(());
    }

    writeln!(out, "{} - {} item(s)", view.order_type, view.item_count)?;
    for (position, item) in view.items.iter().enumerate() {
        writeln!(
            out,
            "#{:<3} {:>3} x {} @ {} = {}",
            position + 1,
            item.quantity,
            item.title,
            item.price,
            item.line_price
        )?;
        if let Some(variant) = &item.variant_title {
            writeln!(out, "       {variant}")?;
        }
        writeln!(out, "       id: {}", item.id)?;
    }
    writeln!(out, "Subtotal: {}", view.subtotal)?;
    Ok(())
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns an error if the arguments are invalid or the prompt cannot be read.
pub fn add(state: &mut AppState, input: AddInput) -> Result<(), Box<dyn std::error::Error>> {
    let answer = input.answer;
    let request = input.into_request()?;

    let mut prompt_error = None;
    let outcome = state.cart_mut().add_item(request, |conflict| match answer {
        ConflictAnswer::Replace => true,
        ConflictAnswer::Keep => false,
        ConflictAnswer::Prompt => match confirm_replace(conflict) {
            Ok(answer) => answer,
            Err(e) => {
                prompt_error = Some(e);
                false
            }
        },
    });
    if let Some(e) = prompt_error {
        return Err(e.into());
    }

    let cart = state.cart();
    match outcome {
        AddOutcome::Added(id) | AddOutcome::Merged(id) | AddOutcome::Replaced(id) => {
            let quantity = cart.line(&id).map_or(0, |line| line.quantity);
            info!(line_id = %id, quantity, total = %cart.total(), "Cart updated");
        }
        AddOutcome::Declined => {
            warn!(
                order_type = %cart.order_type(),
                "Kept existing cart; item not added"
            );
        }
        AddOutcome::Ignored => warn!("Nothing added"),
        AddOutcome::Rejected => {
            return Err("item rejected: price is negative or the cart total would overflow".into());
        }
    }
    Ok(())
}

/// Set a line's quantity.
///
/// # Errors
///
/// Returns an error if the line reference is malformed.
pub fn update(
    state: &mut AppState,
    line: &str,
    quantity: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(id) = resolve_line(state.cart(), line)? else {
        warn!(line, "No such line");
        return Ok(());
    };

    match state.cart_mut().update_quantity(&id, quantity) {
        QuantityUpdate::Set => info!(line_id = %id, quantity, "Quantity updated"),
        QuantityUpdate::Removed => info!(line_id = %id, "Line removed"),
        QuantityUpdate::NotFound => warn!(line_id = %id, "No such line"),
        QuantityUpdate::Rejected => {
            return Err(format!("quantity {quantity} would overflow the cart total").into());
        }
    }
    info!(total = %state.cart().total(), "Cart total");
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns an error if the line reference is malformed.
pub fn remove(state: &mut AppState, line: &str) -> Result<(), Box<dyn std::error::Error>> {
    let removed = match resolve_line(state.cart(), line)? {
        Some(id) => state.cart_mut().remove_item(&id),
        None => false,
    };

    if removed {
        info!(total = %state.cart().total(), "Line removed");
    } else {
        warn!(line, "No such line");
    }
    Ok(())
}

/// Empty the cart.
pub fn clear(state: &mut AppState) {
    state.cart_mut().clear();
    info!("Cart cleared");
}

/// Resolve `#N` (1-based position) or a literal line ID.
///
/// Returns `Ok(None)` when the position is out of range or the ID is unknown.
fn resolve_line<S: KeyValueStore>(
    cart: &CartStore<S>,
    reference: &str,
) -> Result<Option<LineItemId>, String> {
    if let Some(position) = reference.strip_prefix('#') {
        let position: usize = position
            .parse()
            .map_err(|_| format!("invalid line position: {reference}"))?;
        return Ok(position
            .checked_sub(1)
            .and_then(|index| cart.items().get(index))
            .map(|line| line.id.clone()));
    }

    let id = LineItemId::new(reference);
    Ok(cart.line(&id).map(|line| line.id.clone()))
}

fn confirm_replace(conflict: &OrderTypeConflict) -> io::Result<bool> {
    let mut err = io::stderr().lock();
    write!(
        err,
        "Your cart holds a {} ({} line(s)). Clear it and start a {}? [y/N] ",
        order_type_label(conflict.current).to_lowercase(),
        conflict.lines_in_cart,
        order_type_label(conflict.requested).to_lowercase(),
    )?;
    err.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES" | "Yes"))
}
