//! Shared query building for listing endpoints.
//!
//! Listings are assembled with `sqlx::QueryBuilder`: every client-supplied
//! value (search term, language key, limit, offset, narrowing ids) is bound as
//! a parameter. The only text spliced into SQL comes from the static
//! [`OrderColumns`] allow-list of each listing.

use sqlx::{Postgres, QueryBuilder};

use bozor_core::{Language, ListFilter, SortOrder};

/// Allow-list mapping client sort tokens to SQL expressions.
#[derive(Debug, Clone, Copy)]
pub struct OrderColumns {
    default: &'static str,
    columns: &'static [(&'static str, &'static str)],
}

impl OrderColumns {
    /// Create an allow-list with a default `ORDER BY` body.
    #[must_use]
    pub const fn new(default: &'static str, columns: &'static [(&'static str, &'static str)]) -> Self {
        Self { default, columns }
    }

    /// Resolve the requested ordering into an `ORDER BY` body.
    ///
    /// Unknown columns and malformed requests fall back to the default.
    #[must_use]
    pub fn resolve(&self, order: Option<&SortOrder>) -> String {
        order
            .and_then(|order| {
                self.columns
                    .iter()
                    .find(|(token, _)| *token == order.column)
                    .map(|(_, expr)| format!("{expr} {}", order.direction.as_sql()))
            })
            .unwrap_or_else(|| self.default.to_owned())
    }
}

/// Push a localized projection such as `c.name ->> $1`.
pub fn push_localized(qb: &mut QueryBuilder<'_, Postgres>, column: &'static str, language: Language) {
    qb.push(column)
        .push(" ->> ")
        .push_bind(language.as_str())
        .push("::text");
}

/// Push `AND (<col> ->> lang ILIKE %term% OR ...)` when a search term is set.
pub fn push_search(
    qb: &mut QueryBuilder<'_, Postgres>,
    columns: &[&'static str],
    filter: &ListFilter,
) {
    let Some(term) = filter.search_term() else {
        return;
    };

    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        push_localized(qb, column, filter.language);
        qb.push(" ILIKE '%' || ").push_bind(term.to_owned()).push(" || '%'");
    }
    qb.push(")");
}

/// Push `AND (<col> ILIKE %term% OR ...)` over plain text columns.
pub fn push_text_search(
    qb: &mut QueryBuilder<'_, Postgres>,
    columns: &[&'static str],
    filter: &ListFilter,
) {
    let Some(term) = filter.search_term() else {
        return;
    };

    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(*column)
            .push(" ILIKE '%' || ")
            .push_bind(term.to_owned())
            .push(" || '%'");
    }
    qb.push(")");
}

/// Push `ORDER BY`, `LIMIT` and `OFFSET` clauses.
pub fn push_page(qb: &mut QueryBuilder<'_, Postgres>, columns: &OrderColumns, filter: &ListFilter) {
    qb.push(" ORDER BY ").push(columns.resolve(filter.order.as_ref()));

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = filter.offset {
        qb.push(" OFFSET ").push_bind(offset);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const COLUMNS: OrderColumns = OrderColumns::new(
        "p.id DESC",
        &[("id", "p.id"), ("price", "p.price"), ("name", "p.name")],
    );

    fn filter_with(order: &str) -> ListFilter {
        ListFilter {
            order: SortOrder::parse(order),
            ..ListFilter::default()
        }
    }

    #[test]
    fn test_resolve_known_column() {
        let order = SortOrder::parse("price desc").unwrap();
        assert_eq!(COLUMNS.resolve(Some(&order)), "p.price DESC");
    }

    #[test]
    fn test_resolve_unknown_column_uses_default() {
        let order = SortOrder::parse("password asc").unwrap();
        assert_eq!(COLUMNS.resolve(Some(&order)), "p.id DESC");
        assert_eq!(COLUMNS.resolve(None), "p.id DESC");
    }

    #[test]
    fn test_resolve_never_emits_client_text() {
        let order = SortOrder::parse("id;DROP+asc").unwrap();
        assert_eq!(COLUMNS.resolve(Some(&order)), "p.id DESC");
    }

    #[test]
    fn test_push_page_binds_limit_and_offset() {
        let mut filter = filter_with("name asc");
        filter.limit = Some(10);
        filter.offset = Some(20);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT p.id FROM products p");
        push_page(&mut qb, &COLUMNS, &filter);

        assert_eq!(
            qb.sql(),
            "SELECT p.id FROM products p ORDER BY p.name ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_push_page_without_limit_is_unbounded() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT p.id FROM products p");
        push_page(&mut qb, &COLUMNS, &ListFilter::default());
        assert_eq!(qb.sql(), "SELECT p.id FROM products p ORDER BY p.id DESC");
    }

    #[test]
    fn test_push_search_binds_term_per_column() {
        let filter = ListFilter {
            search: Some("shoe".to_owned()),
            language: Language::Ru,
            ..ListFilter::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        push_search(&mut qb, &["p.name", "c.name"], &filter);

        assert_eq!(
            qb.sql(),
            "SELECT 1 WHERE TRUE AND (p.name ->> $1::text ILIKE '%' || $2 || '%' \
             OR c.name ->> $3::text ILIKE '%' || $4 || '%')"
        );
    }

    #[test]
    fn test_push_text_search_has_no_language_key() {
        let filter = ListFilter {
            search: Some("ali".to_owned()),
            ..ListFilter::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        push_text_search(&mut qb, &["u.first_name", "u.last_name"], &filter);

        assert_eq!(
            qb.sql(),
            "SELECT 1 WHERE TRUE AND (u.first_name ILIKE '%' || $1 || '%' \
             OR u.last_name ILIKE '%' || $2 || '%')"
        );
    }

    #[test]
    fn test_push_search_skips_blank_term() {
        let filter = ListFilter {
            search: Some("   ".to_owned()),
            ..ListFilter::default()
        };

        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 WHERE TRUE");
        push_search(&mut qb, &["p.name"], &filter);
        assert_eq!(qb.sql(), "SELECT 1 WHERE TRUE");
    }
}
