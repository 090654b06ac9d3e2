//! Order domain types and order arithmetic.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bozor_core::{OrderId, OrderItemId, OrderStatusId, PaymentStatusId, ProductId, UserId};

use super::product::ProductImage;

/// Highest valid order status id.
pub const MAX_ORDER_STATUS: i64 = 8;

/// Highest valid payment status id.
pub const MAX_PAYMENT_STATUS: i64 = 5;

/// Delivery lead time in hours applied when an order names no date.
pub const DEFAULT_DELIVERY_LEAD_HOURS: i64 = 72;

/// Key reported for orders without a payment status.
pub const UNPAID_KEY: &str = "pending";

/// Label reported for orders without a payment status.
pub const UNPAID_LABEL: &str = "Not paid";

/// Rejected order input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderInputError {
    /// The order has no line items.
    #[error("order must contain at least one item")]
    NoItems,

    /// A line item quantity is zero or negative.
    #[error("item quantity must be positive")]
    InvalidQuantity,

    /// A line item price is negative.
    #[error("item price must not be negative")]
    NegativePrice,

    /// A line or order total does not fit in a decimal.
    #[error("order amount is too large")]
    AmountOverflow,

    /// Order status id outside the seeded range.
    #[error("order_status must be between 1 and {MAX_ORDER_STATUS}")]
    OrderStatusOutOfRange,

    /// Payment status id outside the seeded range.
    #[error("payment_status must be between 1 and {MAX_PAYMENT_STATUS}")]
    PaymentStatusOutOfRange,
}

/// A status reference embedded in order views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRef {
    /// Status ID, absent for the unpaid placeholder.
    pub id: Option<i64>,
    /// Stable machine key.
    pub key: Option<String>,
    /// Name in the request language.
    pub value: Option<String>,
}

impl StatusRef {
    /// The placeholder used when an order has no payment status.
    #[must_use]
    pub fn unpaid() -> Self {
        Self {
            id: None,
            key: Some(UNPAID_KEY.to_owned()),
            value: Some(UNPAID_LABEL.to_owned()),
        }
    }
}

/// An order as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    /// Order ID.
    pub id: OrderId,
    /// Ordering customer.
    pub customer_id: UserId,
    /// Current order status.
    pub order_status: StatusRef,
    /// Current payment status.
    pub payment_status: StatusRef,
    /// Planned delivery date.
    pub delivery_date: Option<NaiveDate>,
    /// Sum of line totals at creation time.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Customer first and last name.
    pub customer_name: String,
    /// Number of live line items.
    pub items_count: i64,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A single order with customer contact details and line items.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Listing fields.
    #[serde(flatten)]
    pub summary: OrderSummary,
    /// Customer email.
    pub email: Option<String>,
    /// Customer phone number.
    pub phone_number: Option<String>,
    /// Customer district name in the request language.
    pub district_name: Option<String>,
    /// Customer region name in the request language.
    pub region_name: Option<String>,
    /// Live line items.
    pub items: Vec<OrderLine>,
}

/// A line item joined to the current product row.
///
/// Product fields reflect the product as it is now, not as it was when
/// ordered; only `quantity` comes from the order itself.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    /// Line item ID.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Ordered product.
    pub product_id: ProductId,
    /// Product name in the request language.
    pub name: Option<String>,
    /// Product description in the request language.
    pub description: Option<String>,
    /// Product images.
    pub images: Vec<ProductImage>,
    /// Ordered quantity.
    pub quantity: i32,
    /// Product rating.
    pub rating: Option<f32>,
    /// Current product price.
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    /// Current product discount.
    pub discount_percent: Option<i16>,
}

/// A line item of a new order.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    /// Ordered product.
    pub product_id: ProductId,
    /// Quantity.
    pub quantity: i32,
    /// Unit price as quoted to the customer.
    pub price: Decimal,
}

impl OrderItemInput {
    /// Line total (`price × quantity`).
    ///
    /// # Errors
    ///
    /// Returns `OrderInputError::AmountOverflow` if the product overflows.
    pub fn total(&self) -> Result<Decimal, OrderInputError> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .ok_or(OrderInputError::AmountOverflow)
    }
}

/// Checked line totals of an order, in item order, and their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTotals {
    /// `price × quantity` per item.
    pub lines: Vec<Decimal>,
    /// Sum of `lines`.
    pub total: Decimal,
}

/// Input for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderInput {
    /// Initial order status.
    pub order_status: OrderStatusId,
    /// Initial payment status.
    pub payment_status: Option<PaymentStatusId>,
    /// Planned delivery date, three days out when omitted.
    pub delivery_date: Option<NaiveDate>,
    /// Line items.
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}

impl CreateOrderInput {
    /// Check line items and status ids, and compute the totals to store.
    ///
    /// # Errors
    ///
    /// Returns the first rule the input breaks.
    pub fn validate(&self) -> Result<OrderTotals, OrderInputError> {
        if self.items.is_empty() {
            return Err(OrderInputError::NoItems);
        }
        if self.items.iter().any(|item| item.quantity <= 0) {
            return Err(OrderInputError::InvalidQuantity);
        }
        if self.items.iter().any(|item| item.price.is_sign_negative()) {
            return Err(OrderInputError::NegativePrice);
        }
        check_status_range(Some(self.order_status), self.payment_status)?;
        self.totals()
    }

    /// Line totals and their sum, with overflow checked.
    ///
    /// # Errors
    ///
    /// Returns `OrderInputError::AmountOverflow` if any product or the sum
    /// overflows.
    pub fn totals(&self) -> Result<OrderTotals, OrderInputError> {
        let lines = self
            .items
            .iter()
            .map(OrderItemInput::total)
            .collect::<Result<Vec<_>, _>>()?;
        let total = lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(*line))
            .ok_or(OrderInputError::AmountOverflow)?;
        Ok(OrderTotals { lines, total })
    }

    /// The delivery date to store, defaulting relative to `now`.
    #[must_use]
    pub fn delivery_date_or_default(&self, now: DateTime<Utc>) -> NaiveDate {
        self.delivery_date
            .unwrap_or_else(|| default_delivery_date(now))
    }
}

/// Input for updating an order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrderInput {
    /// New order status.
    pub order_status: Option<OrderStatusId>,
    /// New payment status.
    pub payment_status: Option<PaymentStatusId>,
    /// New delivery date.
    pub delivery_date: Option<NaiveDate>,
}

/// The stored `(order_status, payment_status, delivery_date)` of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderState {
    /// Order status.
    pub order_status: OrderStatusId,
    /// Payment status.
    pub payment_status: Option<PaymentStatusId>,
    /// Delivery date.
    pub delivery_date: Option<NaiveDate>,
}

impl OrderState {
    /// Overlay the present fields of `input`.
    #[must_use]
    pub fn merge(self, input: &UpdateOrderInput) -> Self {
        Self {
            order_status: input.order_status.unwrap_or(self.order_status),
            payment_status: input.payment_status.or(self.payment_status),
            delivery_date: input.delivery_date.or(self.delivery_date),
        }
    }
}

/// Default delivery date: 72 hours after `now`, truncated to a date.
#[must_use]
pub fn default_delivery_date(now: DateTime<Utc>) -> NaiveDate {
    (now + Duration::hours(DEFAULT_DELIVERY_LEAD_HOURS)).date_naive()
}

/// Check status ids against the seeded ranges.
///
/// # Errors
///
/// Returns `OrderStatusOutOfRange` or `PaymentStatusOutOfRange` for ids
/// outside `1..=8` and `1..=5`.
pub fn check_status_range(
    order_status: Option<OrderStatusId>,
    payment_status: Option<PaymentStatusId>,
) -> Result<(), OrderInputError> {
    if order_status.is_some_and(|id| !(1..=MAX_ORDER_STATUS).contains(&id.as_i64())) {
        return Err(OrderInputError::OrderStatusOutOfRange);
    }
    if payment_status.is_some_and(|id| !(1..=MAX_PAYMENT_STATUS).contains(&id.as_i64())) {
        return Err(OrderInputError::PaymentStatusOutOfRange);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn item(quantity: i32, price: Decimal) -> OrderItemInput {
        OrderItemInput {
            product_id: ProductId::new(1),
            quantity,
            price,
        }
    }

    fn input(items: Vec<OrderItemInput>) -> CreateOrderInput {
        CreateOrderInput {
            order_status: OrderStatusId::new(1),
            payment_status: None,
            delivery_date: None,
            items,
        }
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let order = input(vec![
            item(2, Decimal::new(10_000, 2)),
            item(1, Decimal::new(5_000, 2)),
        ]);
        let totals = order.totals().unwrap();
        assert_eq!(totals.total, Decimal::new(25_000, 2));
        assert_eq!(
            totals.lines,
            vec![Decimal::new(20_000, 2), Decimal::new(5_000, 2)]
        );
    }

    #[test]
    fn test_huge_price_is_rejected_not_panicking() {
        let order: CreateOrderInput = serde_json::from_str(
            r#"{"order_status":1,"items":[{"product_id":1,"quantity":2,"price":"79228162514264337593543950335"}]}"#,
        )
        .unwrap();
        assert_eq!(order.validate(), Err(OrderInputError::AmountOverflow));

        let sum_overflows = input(vec![item(1, Decimal::MAX), item(1, Decimal::ONE)]);
        assert_eq!(sum_overflows.validate(), Err(OrderInputError::AmountOverflow));
    }

    #[test]
    fn test_default_delivery_is_three_days_out() {
        let now = Utc.with_ymd_and_hms(2024, 2, 27, 23, 30, 0).unwrap();
        assert_eq!(
            default_delivery_date(now),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_explicit_delivery_date_wins() {
        let mut order = input(vec![item(1, Decimal::ONE)]);
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        order.delivery_date = Some(date);
        assert_eq!(order.delivery_date_or_default(Utc::now()), date);
    }

    #[test]
    fn test_validate_rejects_empty_and_bad_items() {
        assert_eq!(input(Vec::new()).validate(), Err(OrderInputError::NoItems));
        assert_eq!(
            input(vec![item(0, Decimal::ONE)]).validate(),
            Err(OrderInputError::InvalidQuantity)
        );
        assert_eq!(
            input(vec![item(1, Decimal::NEGATIVE_ONE)]).validate(),
            Err(OrderInputError::NegativePrice)
        );
        assert!(input(vec![item(1, Decimal::ONE)]).validate().is_ok());
    }

    #[test]
    fn test_status_range() {
        assert!(check_status_range(Some(OrderStatusId::new(8)), Some(PaymentStatusId::new(5))).is_ok());
        assert!(check_status_range(None, None).is_ok());
        assert_eq!(
            check_status_range(Some(OrderStatusId::new(9)), None),
            Err(OrderInputError::OrderStatusOutOfRange)
        );
        assert_eq!(
            check_status_range(Some(OrderStatusId::new(0)), None),
            Err(OrderInputError::OrderStatusOutOfRange)
        );
        assert_eq!(
            check_status_range(None, Some(PaymentStatusId::new(6))),
            Err(OrderInputError::PaymentStatusOutOfRange)
        );
    }

    #[test]
    fn test_state_merge_keeps_absent_fields() {
        let state = OrderState {
            order_status: OrderStatusId::new(1),
            payment_status: Some(PaymentStatusId::new(2)),
            delivery_date: NaiveDate::from_ymd_opt(2024, 5, 1),
        };
        let merged = state.merge(&UpdateOrderInput {
            order_status: Some(OrderStatusId::new(3)),
            ..UpdateOrderInput::default()
        });
        assert_eq!(merged.order_status, OrderStatusId::new(3));
        assert_eq!(merged.payment_status, state.payment_status);
        assert_eq!(merged.delivery_date, state.delivery_date);
    }

    #[test]
    fn test_unpaid_placeholder() {
        let json = serde_json::to_value(StatusRef::unpaid()).unwrap();
        assert_eq!(json["key"], "pending");
        assert_eq!(json["value"], "Not paid");
        assert!(json["id"].is_null());
    }
}
