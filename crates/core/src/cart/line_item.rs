//! Cart line items and the key that deduplicates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{LineItemId, Price, ProductId, Variations};

/// The product attributes copied into a line at add time.
///
/// Later catalog edits do not reach lines already in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
    pub price: Price,
}

impl ProductSnapshot {
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: None,
            price,
        }
    }

    /// Builder-style image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// One distinct product + variation combination with an aggregated quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub variations: Variations,
    pub quantity: u32,
}

impl LineItem {
    /// Build a line from a product snapshot.
    #[must_use]
    pub fn from_product(product: ProductSnapshot, variations: Variations, quantity: u32) -> Self {
        Self {
            id: line_id(&product.id, &variations),
            product_id: product.id,
            name: product.name,
            image: product.image,
            price: product.price,
            variations,
            quantity,
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// `price × quantity`, or `None` if it is not representable.
    #[must_use]
    pub fn checked_subtotal(&self) -> Option<Price> {
        self.price.checked_times(self.quantity)
    }
}

/// Derive the line key for a product and variation selection.
///
/// Without variations the key is the product ID. Otherwise the sorted
/// `[name, value]` pairs are appended as a JSON array, e.g.
/// `p1:[["flavor","lemon"],["size","M"]]`. JSON string escaping keeps
/// distinct selections from producing the same key.
#[must_use]
pub fn line_id(product_id: &ProductId, variations: &Variations) -> LineItemId {
    if variations.is_empty() {
        return LineItemId::new(product_id.as_str());
    }

    let pairs = variations
        .iter()
        .map(|(name, value)| Value::Array(vec![Value::from(name), Value::from(value)]))
        .collect();

    LineItemId::new(format!("{product_id}:{}", Value::Array(pairs)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProductId {
        ProductId::new(s)
    }

    #[test]
    fn test_line_id_without_variations_is_product_id() {
        assert_eq!(line_id(&pid("p1"), &Variations::new()).as_str(), "p1");
    }

    #[test]
    fn test_line_id_is_order_independent() {
        let a = Variations::new().with("size", "M").with("flavor", "lemon");
        let b = Variations::new().with("flavor", "lemon").with("size", "M");
        assert_eq!(line_id(&pid("p1"), &a), line_id(&pid("p1"), &b));
        assert_eq!(
            line_id(&pid("p1"), &a).as_str(),
            r#"p1:[["flavor","lemon"],["size","M"]]"#
        );
    }

    #[test]
    fn test_line_id_distinguishes_selections() {
        let m = Variations::new().with("size", "M");
        let l = Variations::new().with("size", "L");
        assert_ne!(line_id(&pid("p1"), &m), line_id(&pid("p1"), &l));
        assert_ne!(line_id(&pid("p1"), &m), line_id(&pid("p2"), &m));
    }

    #[test]
    fn test_line_id_escapes_separators() {
        // A value containing the pair delimiters must not alias two options.
        let tricky = Variations::new().with("a", r#"x"],["b","y"#);
        let split = Variations::new().with("a", "x").with("b", "y");
        assert_ne!(line_id(&pid("p1"), &tricky), line_id(&pid("p1"), &split));
    }

    #[test]
    fn test_subtotal() {
        let line = LineItem::from_product(
            ProductSnapshot::new("p1", "Pão de mel", Price::from_cents(450)),
            Variations::new(),
            4,
        );
        assert_eq!(line.subtotal(), Price::from_cents(1800));
    }

    #[test]
    fn test_line_item_json_shape() {
        let line = LineItem::from_product(
            ProductSnapshot::new("p1", "Cake", Price::from_cents(1000)),
            Variations::new().with("size", "M"),
            2,
        );
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["product_id"], "p1");
        assert_eq!(json["price"], "10.00");
        assert_eq!(json["variations"]["size"], "M");
        assert_eq!(json["quantity"], 2);
        assert!(json.get("image").is_none());
    }
}
