//! Order service.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use bozor_core::{Language, ListFilter, OrderId, OrderItemId};

use super::{TokenValidator, authorize};
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::models::Page;
use crate::models::order::{
    CreateOrderInput, Order, OrderSummary, UpdateOrderInput, check_status_range,
};

/// Order operations. Every method requires a valid token.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    tokens: &'a dyn TokenValidator,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a dyn TokenValidator) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            tokens,
        }
    }

    /// Place an order for the acting user.
    ///
    /// The total is the sum of `price * quantity` over the submitted items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token, `AppError::BadRequest` for
    /// an order without items, with out-of-range status ids or with amounts
    /// too large to total.
    pub async fn create(&self, token: &str, input: CreateOrderInput) -> Result<OrderId> {
        let actor = authorize(self.tokens, token)?;
        let totals = input.validate()?;

        let delivery_date = input.delivery_date_or_default(Utc::now());
        let id = self
            .orders
            .create(actor.id, &input, &totals, delivery_date)
            .await?;

        info!(
            order_id = %id,
            customer_id = %actor.id,
            items = input.items.len(),
            total = %totals.total,
            "Order created"
        );
        Ok(id)
    }

    /// List orders.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` for a bad token.
    pub async fn list(&self, token: &str, filter: &ListFilter) -> Result<Page<OrderSummary>> {
        authorize(self.tokens, token)?;
        Ok(self.orders.list(filter).await?)
    }

    /// An order with its customer details and items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order does not exist.
    pub async fn get(&self, token: &str, id: OrderId, language: Language) -> Result<Order> {
        authorize(self.tokens, token)?;
        self.orders
            .get_by_id(id, language)
            .await?
            .ok_or_else(|| AppError::NotFound("not found".to_owned()))
    }

    /// Change the status triple of an order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for out-of-range status ids,
    /// `AppError::NotFound` if the order does not exist.
    pub async fn update(&self, token: &str, id: OrderId, input: UpdateOrderInput) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        check_status_range(input.order_status, input.payment_status)?;

        self.orders.update(id, &input, actor.id).await?;
        info!(order_id = %id, user_id = %actor.id, "Order updated");
        Ok(())
    }

    /// Soft-delete an order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order does not exist.
    pub async fn delete(&self, token: &str, id: OrderId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.orders.delete(id, actor.id).await?;
        info!(order_id = %id, user_id = %actor.id, "Order deleted");
        Ok(())
    }

    /// Soft-delete one line item.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item does not exist.
    pub async fn delete_item(&self, token: &str, id: OrderItemId) -> Result<()> {
        let actor = authorize(self.tokens, token)?;
        self.orders.delete_item(id, actor.id).await?;
        info!(order_item_id = %id, user_id = %actor.id, "Order item deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bozor_core::{OrderStatusId, PaymentStatusId, ProductId};
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    use super::*;
    use crate::models::order::OrderItemInput;
    use crate::services::testing::FixedToken;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://bozor@localhost/bozor")
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_rejects_empty_order() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = OrderService::new(&pool, &tokens);

        let input = CreateOrderInput {
            order_status: OrderStatusId::new(1),
            payment_status: None,
            delivery_date: None,
            items: Vec::new(),
        };
        let err = service.create("good", input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_overflowing_total() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = OrderService::new(&pool, &tokens);

        let input = CreateOrderInput {
            order_status: OrderStatusId::new(1),
            payment_status: None,
            delivery_date: None,
            items: vec![OrderItemInput {
                product_id: ProductId::new(1),
                quantity: 2,
                price: Decimal::MAX,
            }],
        };
        let err = service.create("good", input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "order amount is too large"));
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_status() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = OrderService::new(&pool, &tokens);

        let input = UpdateOrderInput {
            order_status: Some(OrderStatusId::new(9)),
            ..UpdateOrderInput::default()
        };
        let err = service.update("good", OrderId::new(1), input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let input = UpdateOrderInput {
            payment_status: Some(PaymentStatusId::new(0)),
            ..UpdateOrderInput::default()
        };
        let err = service.update("good", OrderId::new(1), input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_list_is_gated() {
        let pool = lazy_pool();
        let tokens = FixedToken("good");
        let service = OrderService::new(&pool, &tokens);

        let err = service.list("nope", &ListFilter::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }
}
