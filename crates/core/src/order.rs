//! Orders, checkout pricing, discounts and shipping times.
//!
//! An order is a denormalised snapshot taken at checkout: item names, prices
//! and images are copied from the catalog so later catalog edits never change
//! a placed order. Only [`Order::status`] changes afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Email, OrderId, OrderStatus, Price, ProductId, ShippingTimeId, UserId};

/// Most units of one product a single order line may carry.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    /// Unit price at checkout.
    pub price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Where and to whom an order ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub full_name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub postcode: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_time_id: Option<ShippingTimeId>,
}

impl ShippingDetails {
    /// Check required address fields are filled in.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let required = [
            ("fullName", &self.full_name),
            ("addressLine1", &self.address_line1),
            ("city", &self.city),
            ("postcode", &self.postcode),
            ("country", &self.country),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }
        Ok(())
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub items: Vec<OrderItem>,
    pub shipping: ShippingDetails,
    pub subtotal: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub discount_amount: Price,
    pub total: Price,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// The outcome of an admin status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same status; nothing to write.
    Unchanged,
    /// Along the fulfilment path, or to `Cancelled`.
    Forward { from: OrderStatus },
    /// Against the fulfilment path. Allowed, but worth logging.
    Backward { from: OrderStatus },
}

impl Order {
    /// Build a new `Processing` order from a priced cart.
    #[must_use]
    pub fn place(
        id: OrderId,
        user_id: Option<UserId>,
        priced: PricedCart,
        shipping: ShippingDetails,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            items: priced.items,
            shipping,
            subtotal: priced.subtotal,
            discount_code: priced.discount_code,
            discount_amount: priced.discount_amount,
            total: priced.total,
            status: OrderStatus::Processing,
            created_at,
        }
    }

    /// Move the order to `next`. Every transition is permitted.
    pub fn transition(&mut self, next: OrderStatus) -> Transition {
        let from = self.status;
        if from == next {
            return Transition::Unchanged;
        }
        self.status = next;
        if from.is_backward(next) {
            Transition::Backward { from }
        } else {
            Transition::Forward { from }
        }
    }

    /// Total item units.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// A checkout discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub code: String,
    pub percent_off: u8,
    pub active: bool,
}

impl Discount {
    /// Codes are matched case-insensitively and stored uppercase.
    #[must_use]
    pub fn normalise_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Check a discount before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutOptionError`] for a blank code or a percentage
    /// outside 1 to 100.
    pub fn validate(&self) -> Result<(), CheckoutOptionError> {
        if self.code.trim().is_empty() {
            return Err(CheckoutOptionError::EmptyCode);
        }
        if !(1..=100).contains(&self.percent_off) {
            return Err(CheckoutOptionError::PercentOutOfRange(self.percent_off));
        }
        Ok(())
    }
}

/// A delivery window offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingTime {
    pub id: ShippingTimeId,
    pub label: String,
    pub min_days: i32,
    pub max_days: i32,
    #[serde(default)]
    pub sort_order: i32,
}

impl ShippingTime {
    /// Check a shipping time before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutOptionError`] for a blank label, negative days, or
    /// `min_days` after `max_days`.
    pub fn validate(&self) -> Result<(), CheckoutOptionError> {
        if self.label.trim().is_empty() {
            return Err(CheckoutOptionError::EmptyLabel);
        }
        if self.min_days < 0 {
            return Err(CheckoutOptionError::NegativeDays);
        }
        if self.min_days > self.max_days {
            return Err(CheckoutOptionError::DayRangeInverted {
                min: self.min_days,
                max: self.max_days,
            });
        }
        Ok(())
    }
}

/// Invalid discount or shipping time definitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutOptionError {
    #[error("discount code is empty")]
    EmptyCode,
    #[error("discount must be between 1 and 100 percent, got {0}")]
    PercentOutOfRange(u8),
    #[error("shipping time label is empty")]
    EmptyLabel,
    #[error("shipping days cannot be negative")]
    NegativeDays,
    #[error("minimum days ({min}) is after maximum days ({max})")]
    DayRangeInverted { min: i32, max: i32 },
}

/// A cart line as submitted by the shopper. Prices are never trusted from the
/// client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Checkout failures. All are caller mistakes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("quantity for {0} must be between 1 and {MAX_LINE_QUANTITY}")]
    InvalidQuantity(ProductId),
    #[error("product {0} is no longer available")]
    UnknownProduct(ProductId),
    #[error("discount code {0} is not valid")]
    InvalidDiscount(String),
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Cart lines priced against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub items: Vec<OrderItem>,
    pub subtotal: Price,
    pub discount_code: Option<String>,
    pub discount_amount: Price,
    pub total: Price,
}

/// Price `lines` from catalog `products` and apply `discount`.
///
/// Lines for the same product are merged. The discount is a percentage of the
/// subtotal rounded to pence.
///
/// # Errors
///
/// Returns [`CheckoutError`] for an empty cart, a bad quantity, a product
/// missing from `products`, or an inactive discount.
pub fn price_cart(
    lines: &[CartLine],
    products: &[Product],
    discount: Option<&Discount>,
) -> Result<PricedCart, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some(existing) = items.iter_mut().find(|i| i.product_id == line.product_id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            continue;
        }
        let product = products
            .iter()
            .find(|p| p.id == line.product_id)
            .ok_or_else(|| CheckoutError::UnknownProduct(line.product_id.clone()))?;
        items.push(OrderItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: line.quantity,
            image: product.primary_image().map(|img| img.url.clone()),
        });
    }
    if let Some(bad) = items
        .iter()
        .find(|i| i.quantity == 0 || i.quantity > MAX_LINE_QUANTITY)
    {
        return Err(CheckoutError::InvalidQuantity(bad.product_id.clone()));
    }

    let subtotal: Price = items.iter().map(OrderItem::line_total).sum();
    let (discount_code, discount_amount) = match discount {
        Some(d) if !d.active => return Err(CheckoutError::InvalidDiscount(d.code.clone())),
        Some(d) => (Some(d.code.clone()), subtotal.percent(d.percent_off.min(100))),
        None => (None, Price::ZERO),
    };

    Ok(PricedCart {
        items,
        subtotal,
        discount_code,
        discount_amount,
        total: subtotal - discount_amount,
    })
}
