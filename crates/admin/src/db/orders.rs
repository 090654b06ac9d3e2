//! Order repository for database operations.
//!
//! Order views embed both status references and customer fields, so listing
//! and detail share one select built by [`push_order_select`]. Line items of
//! the detail view are joined to the live product row: name, price and images
//! are today's values, only `quantity` is the ordered one.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use bozor_core::{
    Language, ListFilter, OrderId, OrderItemId, OrderStatusId, PaymentStatusId, ProductId,
    UserId,
};

use super::listing::{OrderColumns, push_localized, push_page, push_text_search};
use super::{RepositoryError, count_live, soft_delete};
use crate::models::Page;
use crate::models::order::{
    CreateOrderInput, Order, OrderLine, OrderState, OrderSummary, OrderTotals, StatusRef,
    UpdateOrderInput,
};
use crate::models::product::ProductImage;

const ORDER: OrderColumns = OrderColumns::new(
    "o.id DESC",
    &[
        ("id", "o.id"),
        ("total_amount", "o.total_amount"),
        ("delivery_date", "o.delivery_date"),
        ("order_status", "o.order_status_id"),
        ("payment_status", "o.payment_status_id"),
        ("created_at", "o.created_at"),
    ],
);

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    customer_id: UserId,
    order_status_id: i64,
    order_status_key: Option<String>,
    order_status_name: Option<String>,
    payment_status_id: Option<i64>,
    payment_status_key: Option<String>,
    payment_status_name: Option<String>,
    delivery_date: Option<NaiveDate>,
    total_amount: Decimal,
    customer_name: String,
    items_count: i64,
    created_at: DateTime<Utc>,
}

impl From<OrderSummaryRow> for OrderSummary {
    fn from(row: OrderSummaryRow) -> Self {
        let payment_status = match row.payment_status_id {
            Some(id) => StatusRef {
                id: Some(id),
                key: row.payment_status_key,
                value: row.payment_status_name,
            },
            None => StatusRef::unpaid(),
        };

        Self {
            id: row.id,
            customer_id: row.customer_id,
            order_status: StatusRef {
                id: Some(row.order_status_id),
                key: row.order_status_key,
                value: row.order_status_name,
            },
            payment_status,
            delivery_date: row.delivery_date,
            total_amount: row.total_amount,
            customer_name: row.customer_name,
            items_count: row.items_count,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderDetailRow {
    #[sqlx(flatten)]
    summary: OrderSummaryRow,
    email: Option<String>,
    phone_number: Option<String>,
    district_name: Option<String>,
    region_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    name: Option<String>,
    description: Option<String>,
    images: Json<Vec<ProductImage>>,
    quantity: i32,
    rating: Option<f32>,
    price: Option<Decimal>,
    discount_percent: Option<i16>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            name: row.name,
            description: row.description,
            images: row.images.0,
            quantity: row.quantity,
            rating: row.rating,
            price: row.price,
            discount_percent: row.discount_percent,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderStateRow {
    order_status_id: OrderStatusId,
    payment_status_id: Option<PaymentStatusId>,
    delivery_date: Option<NaiveDate>,
}

impl From<OrderStateRow> for OrderState {
    fn from(row: OrderStateRow) -> Self {
        Self {
            order_status: row.order_status_id,
            payment_status: row.payment_status_id,
            delivery_date: row.delivery_date,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order and its line items in one transaction.
    ///
    /// Line prices and totals are stored as given and never change afterwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(
        &self,
        customer: UserId,
        input: &CreateOrderInput,
        totals: &OrderTotals,
        delivery_date: NaiveDate,
    ) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders (
                order_status_id, payment_status_id, delivery_date,
                total_amount, customer_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id
            ",
        )
        .bind(input.order_status)
        .bind(input.payment_status)
        .bind(delivery_date)
        .bind(totals.total)
        .bind(customer)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = QueryBuilder::<Postgres>::new(
            "INSERT INTO order_items (order_id, product_id, quantity, price, total, created_by) ",
        );
        items.push_values(input.items.iter().zip(&totals.lines), |mut row, (item, line)| {
            row.push_bind(id)
                .push_bind(item.product_id)
                .push_bind(item.quantity)
                .push_bind(item.price)
                .push_bind(*line)
                .push_bind(customer);
        });
        items.build().execute(&mut *tx).await?;

        tx.commit().await?;
        Ok(id)
    }

    /// List orders, optionally of one customer.
    ///
    /// Search matches the customer's first or last name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ListFilter) -> Result<Page<OrderSummary>, RepositoryError> {
        let rows = list_query(filter)
            .build_query_as::<OrderSummaryRow>()
            .fetch_all(self.pool)
            .await?;
        let count = count_live(self.pool, "orders").await?;

        Ok(Page::new(rows.into_iter().map(Into::into).collect(), count))
    }

    /// Get an order with customer contact details and line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(
        &self,
        id: OrderId,
        language: Language,
    ) -> Result<Option<Order>, RepositoryError> {
        let Some(row) = detail_query(id, language)
            .build_query_as::<OrderDetailRow>()
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id,
                   p.name ->> $2::text AS name,
                   p.description ->> $2::text AS description,
                   COALESCE(p.images, '[]'::jsonb) AS images,
                   oi.quantity,
                   p.rating_avg AS rating,
                   p.price,
                   p.discount_percent
            FROM order_items oi
            LEFT JOIN products p ON p.id = oi.product_id AND p.deleted_at IS NULL
            WHERE oi.order_id = $1 AND oi.deleted_at IS NULL
            ORDER BY oi.id
            ",
        )
        .bind(id)
        .bind(language.as_str())
        .fetch_all(self.pool)
        .await?;

        Ok(Some(Order {
            summary: row.summary.into(),
            email: row.email,
            phone_number: row.phone_number,
            district_name: row.district_name,
            region_name: row.region_name,
            items: items.into_iter().map(Into::into).collect(),
        }))
    }

    /// Overlay the present fields of `input` on the stored status triple.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live order has this id.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: OrderId,
        input: &UpdateOrderInput,
        actor: UserId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderState = sqlx::query_as::<_, OrderStateRow>(
            r"
            SELECT order_status_id, payment_status_id, delivery_date
            FROM orders
            WHERE id = $1 AND deleted_at IS NULL
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .into();

        let next = current.merge(input);

        sqlx::query(
            r"
            UPDATE orders
            SET order_status_id = $1, payment_status_id = $2, delivery_date = $3,
                updated_at = NOW(), updated_by = $4
            WHERE id = $5
            ",
        )
        .bind(next.order_status)
        .bind(next.payment_status)
        .bind(next.delivery_date)
        .bind(actor)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Soft-delete an order. Its line items stay as they are.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live order has this id.
    pub async fn delete(&self, id: OrderId, actor: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "orders", id.as_i64(), actor).await
    }

    /// Soft-delete a single line item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no live item has this id.
    pub async fn delete_item(&self, id: OrderItemId, actor: UserId) -> Result<(), RepositoryError> {
        soft_delete(self.pool, "order_items", id.as_i64(), actor).await
    }
}

/// Push the select list and joins shared by order listing and detail.
fn push_order_select(qb: &mut QueryBuilder<'static, Postgres>, language: Language, detail: bool) {
    qb.push(
        "SELECT o.id, o.customer_id, \
         o.order_status_id, os.key AS order_status_key, ",
    );
    push_localized(qb, "os.name", language);
    qb.push(" AS order_status_name, o.payment_status_id, ps.key AS payment_status_key, ");
    push_localized(qb, "ps.name", language);
    qb.push(
        " AS payment_status_name, o.delivery_date, o.total_amount, \
         TRIM(CONCAT(u.first_name, ' ', u.last_name)) AS customer_name, \
         (SELECT COUNT(*) FROM order_items oi \
          WHERE oi.order_id = o.id AND oi.deleted_at IS NULL) AS items_count, \
         o.created_at",
    );

    if detail {
        qb.push(", u.email, u.phone_number, ");
        push_localized(qb, "d.name", language);
        qb.push(" AS district_name, ");
        push_localized(qb, "r.name", language);
        qb.push(" AS region_name");
    }

    qb.push(
        " FROM orders o \
         LEFT JOIN order_statuses os ON os.id = o.order_status_id \
         LEFT JOIN payment_statuses ps ON ps.id = o.payment_status_id \
         LEFT JOIN users u ON u.id = o.customer_id",
    );

    if detail {
        qb.push(
            " LEFT JOIN districts d ON d.id = u.district_id \
             LEFT JOIN regions r ON r.id = u.region_id",
        );
    }

    qb.push(" WHERE o.deleted_at IS NULL");
}

fn list_query(filter: &ListFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("");
    push_order_select(&mut qb, filter.language, false);

    if let Some(customer) = filter.customer_id {
        qb.push(" AND o.customer_id = ").push_bind(customer);
    }
    push_text_search(&mut qb, &["u.first_name", "u.last_name"], filter);
    push_page(&mut qb, &ORDER, filter);
    qb
}

fn detail_query(id: OrderId, language: Language) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("");
    push_order_select(&mut qb, language, true);
    qb.push(" AND o.id = ").push_bind(id);
    qb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_filters_by_customer() {
        let filter = ListFilter {
            customer_id: Some(UserId::new(12)),
            limit: Some(10),
            ..ListFilter::default()
        };
        let qb = list_query(&filter);
        let sql = qb.sql();

        assert!(sql.starts_with("SELECT o.id, o.customer_id, o.order_status_id"));
        assert!(sql.contains("AS items_count"));
        assert!(!sql.contains("region_name"));
        assert!(sql.contains("WHERE o.deleted_at IS NULL AND o.customer_id = $3"));
        assert!(sql.ends_with("ORDER BY o.id DESC LIMIT $4"));
    }

    #[test]
    fn test_detail_query_joins_geography() {
        let qb = detail_query(OrderId::new(5), Language::En);
        let sql = qb.sql();

        assert!(sql.contains("d.name ->> $3::text AS district_name"));
        assert!(sql.contains("r.name ->> $4::text AS region_name"));
        assert!(sql.contains("LEFT JOIN regions r ON r.id = u.region_id"));
        assert!(sql.ends_with("AND o.id = $5"));
    }

    #[test]
    fn test_missing_payment_status_reads_as_unpaid() {
        let row = OrderSummaryRow {
            id: OrderId::new(1),
            customer_id: UserId::new(2),
            order_status_id: 1,
            order_status_key: Some("new".to_owned()),
            order_status_name: Some("Yangi".to_owned()),
            payment_status_id: None,
            payment_status_key: None,
            payment_status_name: None,
            delivery_date: None,
            total_amount: Decimal::ZERO,
            customer_name: "Ali Valiyev".to_owned(),
            items_count: 0,
            created_at: Utc::now(),
        };

        let summary = OrderSummary::from(row);
        assert_eq!(summary.payment_status, StatusRef::unpaid());
        assert_eq!(summary.order_status.id, Some(1));
    }
}
