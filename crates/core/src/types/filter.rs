//! List filtering shared by every listing endpoint.
//!
//! A listing accepts `limit`, `offset`, `order`, `search` and a handful of
//! entity-specific narrowing filters. The language used for projections and
//! search comes from the `Accept-Language` header.
//!
//! Ordering is parsed into a [`SortOrder`] here, but mapping the column token
//! to SQL is the repository's job: each listing resolves the token through
//! its own allow-list and falls back to its default ordering.

use core::fmt;

use crate::{CategoryId, Language, ParamId, RegionId, RoleId, UserId};

/// Errors from parsing listing query parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// `limit` is not a positive integer.
    #[error("Limit must be number!")]
    InvalidLimit,
    /// `offset` is not a non-negative integer.
    #[error("Offset must be number!")]
    InvalidOffset,
    /// A numeric filter such as `role` or `category_id` did not parse.
    #[error("{0} must be number!")]
    InvalidNumber(&'static str),
}

/// Sort direction of an ordered listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending; also used for any unrecognized direction token.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Parse a direction token. Anything other than `desc` is ascending.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        if token.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A requested ordering: a column token and a direction.
///
/// The column is untrusted client text and must never reach SQL directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Column token as sent by the client, lowercased.
    pub column: String,
    /// Requested direction.
    pub direction: SortDirection,
}

impl SortOrder {
    /// Parse `"column direction"` or `"column+direction"`.
    ///
    /// Returns `None` for anything that is not exactly two tokens, in which
    /// case the listing's default ordering applies.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut tokens = raw
            .split(|c: char| c == '+' || c.is_whitespace())
            .filter(|token| !token.is_empty());

        let column = tokens.next()?;
        let direction = tokens.next()?;
        if tokens.next().is_some() {
            return None;
        }

        Some(Self {
            column: column.to_ascii_lowercase(),
            direction: SortDirection::parse(direction),
        })
    }
}

/// Parse an optional `limit` parameter.
///
/// # Errors
///
/// Returns `FilterError::InvalidLimit` when the value is not a positive integer.
pub fn parse_limit(raw: Option<&str>) -> Result<Option<i64>, FilterError> {
    raw.map(|value| match value.trim().parse::<i64>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(FilterError::InvalidLimit),
    })
    .transpose()
}

/// Parse an optional `offset` parameter.
///
/// # Errors
///
/// Returns `FilterError::InvalidOffset` when the value is not a non-negative
/// integer.
pub fn parse_offset(raw: Option<&str>) -> Result<Option<i64>, FilterError> {
    raw.map(|value| match value.trim().parse::<i64>() {
        Ok(offset) if offset >= 0 => Ok(offset),
        _ => Err(FilterError::InvalidOffset),
    })
    .transpose()
}

/// Parse an optional numeric id filter such as `role` or `category_id`.
///
/// # Errors
///
/// Returns `FilterError::InvalidNumber` naming `field` when the value does
/// not parse.
pub fn parse_id<T: From<i64>>(field: &'static str, raw: Option<&str>) -> Result<Option<T>, FilterError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<i64>()
            .map(T::from)
            .map_err(|_| FilterError::InvalidNumber(field))
    })
    .transpose()
}

/// Parsed listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Maximum number of rows; `None` means unbounded.
    pub limit: Option<i64>,
    /// Rows to skip.
    pub offset: Option<i64>,
    /// Requested ordering, if well-formed.
    pub order: Option<SortOrder>,
    /// Case-insensitive substring to match against localized names.
    pub search: Option<String>,
    /// Language for projections and search.
    pub language: Language,
    /// Narrow products and params to a category.
    pub category_id: Option<CategoryId>,
    /// Narrow users to a role.
    pub role: Option<RoleId>,
    /// Narrow orders to a customer.
    pub customer_id: Option<UserId>,
    /// Narrow param values to a param.
    pub param_id: Option<ParamId>,
    /// Narrow districts to a region.
    pub region_id: Option<RegionId>,
}

impl ListFilter {
    /// The search term, if present and non-blank.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_accepts_space_and_plus() {
        let spaced = SortOrder::parse("name desc").unwrap();
        assert_eq!(spaced.column, "name");
        assert_eq!(spaced.direction, SortDirection::Desc);

        let plus = SortOrder::parse("Price+DESC").unwrap();
        assert_eq!(plus.column, "price");
        assert_eq!(plus.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_order_unknown_direction_is_ascending() {
        let order = SortOrder::parse("name sideways").unwrap();
        assert_eq!(order.direction, SortDirection::Asc);
        assert_eq!(SortOrder::parse("id asc").unwrap().direction.as_sql(), "ASC");
    }

    #[test]
    fn test_sort_order_rejects_malformed() {
        assert!(SortOrder::parse("").is_none());
        assert!(SortOrder::parse("name").is_none());
        assert!(SortOrder::parse("name desc extra").is_none());
        assert!(SortOrder::parse("   ").is_none());
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None), Ok(None));
        assert_eq!(parse_limit(Some("10")), Ok(Some(10)));
        assert_eq!(parse_limit(Some("abc")), Err(FilterError::InvalidLimit));
        assert_eq!(parse_limit(Some("0")), Err(FilterError::InvalidLimit));
        assert_eq!(parse_limit(Some("-3")), Err(FilterError::InvalidLimit));
        assert_eq!(parse_limit(Some("")), Err(FilterError::InvalidLimit));
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset(None), Ok(None));
        assert_eq!(parse_offset(Some("0")), Ok(Some(0)));
        assert_eq!(parse_offset(Some("x")), Err(FilterError::InvalidOffset));
        assert_eq!(parse_offset(Some("-1")), Err(FilterError::InvalidOffset));
    }

    #[test]
    fn test_parse_id() {
        let role: Option<RoleId> = parse_id("Role", Some("2")).unwrap();
        assert_eq!(role, Some(RoleId::new(2)));

        let err = parse_id::<RoleId>("Role", Some("admin")).unwrap_err();
        assert_eq!(err.to_string(), "Role must be number!");
    }

    #[test]
    fn test_filter_error_messages() {
        assert_eq!(FilterError::InvalidLimit.to_string(), "Limit must be number!");
        assert_eq!(FilterError::InvalidOffset.to_string(), "Offset must be number!");
    }

    #[test]
    fn test_search_term_ignores_blank() {
        let mut filter = ListFilter::default();
        assert_eq!(filter.search_term(), None);

        filter.search = Some("  ".to_owned());
        assert_eq!(filter.search_term(), None);

        filter.search = Some(" shoe ".to_owned());
        assert_eq!(filter.search_term(), Some("shoe"));
    }
}
