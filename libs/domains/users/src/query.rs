//! Dynamic query construction for user list and search endpoints.
//!
//! Sort tokens arrive from the wire as `field:direction` strings. Field names
//! are API-level (camelCase) and are mapped through an allow-list onto column
//! names before they are ever interpolated into SQL. Search terms and paging
//! bounds are always bound as parameters, never interpolated.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use sea_orm::Value;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{UserError, UserResult};

/// Matches one sort token: a field name, a colon, and the direction.
static SORT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+):(.*)$").unwrap());

/// API sort field -> users table column. Only these fields may appear in an
/// ORDER BY clause; everything else is rejected before query construction.
const SORTABLE_FIELDS: &[(&str, &str)] = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("email", "email"),
    ("dateOfBirth", "date_of_birth"),
    ("username", "username"),
    ("status", "status"),
    ("type", "user_type"),
];

/// Resolve an API field name to its column, if sortable.
pub fn sortable_column(field: &str) -> Option<&'static str> {
    SORTABLE_FIELDS
        .iter()
        .find(|(api, _)| *api == field)
        .map(|(_, column)| *column)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Ascending)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Descending)
        } else {
            Err(())
        }
    }
}

/// A single parsed sort instruction, field still in API form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortCriterion {
    pub field: String,
    pub direction: SortDirection,
}

/// Parse raw `field:direction` tokens into sort criteria.
///
/// Tokens that do not match the `field:direction` shape, or whose direction
/// is neither `asc` nor `desc`, are dropped without error. Field names are
/// not checked here; validation against the allow-list happens when the
/// criteria are turned into a query.
pub fn parse_sort_tokens(tokens: &[String]) -> Vec<SortCriterion> {
    tokens
        .iter()
        .filter_map(|token| {
            let captures = SORT_TOKEN.captures(token)?;
            let direction = captures[2].parse().ok()?;
            Some(SortCriterion {
                field: captures[1].to_string(),
                direction,
            })
        })
        .collect()
}

/// Resolve every criterion against the allow-list, failing on the first
/// unknown field.
pub fn resolve_sort(sort: &[SortCriterion]) -> UserResult<Vec<(&'static str, SortDirection)>> {
    sort.iter()
        .map(|criterion| {
            sortable_column(&criterion.field)
                .map(|column| (column, criterion.direction))
                .ok_or_else(|| UserError::InvalidSortField(criterion.field.clone()))
        })
        .collect()
}

/// Check every criterion against the allow-list without resolving columns.
pub fn validate_sort(sort: &[SortCriterion]) -> UserResult<()> {
    resolve_sort(sort).map(|_| ())
}

/// Escape LIKE metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A validated paging request shared by list and search.
///
/// `page` is zero-based internally; the constructor takes the one-based page
/// number used on the wire.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
    pub sort: Vec<SortCriterion>,
    pub search: Option<String>,
}

impl PageRequest {
    /// Build a page request from wire-level parameters.
    ///
    /// The wire page number is one-based; zero and one both map to the first
    /// page. A zero page size is rejected since it would make the total page
    /// count undefined.
    pub fn new(
        page_no: u64,
        page_size: u64,
        sort_tokens: &[String],
        search: Option<String>,
    ) -> UserResult<Self> {
        if page_size == 0 {
            return Err(UserError::InvalidPageSize(page_size));
        }
        let search = search.filter(|term| !term.trim().is_empty());
        Ok(Self {
            page: page_no.saturating_sub(1),
            page_size,
            sort: parse_sort_tokens(sort_tokens),
            search,
        })
    }

    pub fn offset(&self) -> u64 {
        self.page * self.page_size
    }
}

/// Which column set a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// All user columns except the password hash.
    Detail,
    /// Id and name columns only.
    Summary,
}

impl Projection {
    fn columns(self) -> &'static str {
        match self {
            Projection::Detail => {
                "id, first_name, last_name, email, phone, date_of_birth, \
                 gender, username, status, user_type, created_at, updated_at"
            }
            Projection::Summary => "id, first_name, last_name",
        }
    }
}

/// A SQL string paired with its bind values, positionally numbered.
#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub sql: String,
    pub values: Vec<Value>,
}

/// The data and count statements for one page of users.
///
/// Both statements share the same WHERE clause so the count always describes
/// the same result set the data query pages over.
#[derive(Debug, Clone)]
pub struct UserSearchQuery {
    pub data: SqlQuery,
    pub count: SqlQuery,
}

impl UserSearchQuery {
    /// Build the paired statements for a page request.
    ///
    /// Fails with `InvalidSortField` when a well-formed sort token names a
    /// field outside the allow-list.
    pub fn build(request: &PageRequest, projection: Projection) -> UserResult<Self> {
        let sort_columns = resolve_sort(&request.sort)?;

        let mut where_clause = String::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(term) = &request.search {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            where_clause.push_str(
                " WHERE (LOWER(first_name) LIKE $1 ESCAPE '\\' \
                 OR LOWER(last_name) LIKE $2 ESCAPE '\\' \
                 OR LOWER(email) LIKE $3 ESCAPE '\\')",
            );
            values.push(pattern.clone().into());
            values.push(pattern.clone().into());
            values.push(pattern.into());
        }

        let count = SqlQuery {
            sql: format!("SELECT COUNT(*) AS total FROM users{}", where_clause),
            values: values.clone(),
        };

        let mut sql = format!(
            "SELECT {} FROM users{}",
            projection.columns(),
            where_clause
        );

        if !sort_columns.is_empty() {
            let order_terms: Vec<String> = sort_columns
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_terms.join(", "));
        }

        let limit_idx = values.len() + 1;
        let offset_idx = values.len() + 2;
        sql.push_str(&format!(" LIMIT ${} OFFSET ${}", limit_idx, offset_idx));
        values.push((request.page_size as i64).into());
        values.push((request.offset() as i64).into());

        Ok(Self {
            data: SqlQuery { sql, values },
            count,
        })
    }
}

/// One page of results with the paging envelope used on the wire.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page<T> {
    /// One-based page number as requested by the client
    #[serde(rename = "pageNo")]
    pub page_no: u64,
    #[serde(rename = "pageSize")]
    pub page_size: u64,
    #[serde(rename = "totalPage")]
    pub total_pages: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from a fetched slice and the matching total count.
    ///
    /// The page number is reported one-based. A request past the last page
    /// yields an empty `items` with the total page count intact.
    pub fn assemble(request: &PageRequest, items: Vec<T>, total: u64) -> Self {
        Self {
            page_no: request.page + 1,
            page_size: request.page_size,
            total_pages: total.div_ceil(request.page_size),
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_valid_tokens() {
        let parsed = parse_sort_tokens(&tokens(&["firstName:asc", "email:DESC"]));
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].field, "firstName");
        assert_eq!(parsed[0].direction, SortDirection::Ascending);
        assert_eq!(parsed[1].field, "email");
        assert_eq!(parsed[1].direction, SortDirection::Descending);
    }

    #[test]
    fn test_parse_drops_malformed_tokens() {
        let parsed = parse_sort_tokens(&tokens(&[
            "firstName",      // no colon
            "name:upward",    // unknown direction
            ":asc",           // empty field
            "",               // empty token
            "lastName:desc",  // valid
        ]));
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].field, "lastName");
    }

    #[test]
    fn test_parse_keeps_unknown_fields_for_later_validation() {
        let parsed = parse_sort_tokens(&tokens(&["password:asc"]));
        assert_eq!(parsed.len(), 1);
        assert!(validate_sort(&parsed).is_err());
    }

    #[test]
    fn test_page_request_rejects_zero_page_size() {
        let result = PageRequest::new(1, 0, &[], None);
        assert!(matches!(result, Err(UserError::InvalidPageSize(0))));
    }

    #[test]
    fn test_page_request_normalizes_one_based_page() {
        let first = PageRequest::new(1, 10, &[], None).unwrap();
        assert_eq!(first.page, 0);
        assert_eq!(first.offset(), 0);

        let zero = PageRequest::new(0, 10, &[], None).unwrap();
        assert_eq!(zero.page, 0);

        let third = PageRequest::new(3, 10, &[], None).unwrap();
        assert_eq!(third.offset(), 20);
    }

    #[test]
    fn test_page_request_discards_blank_search() {
        let request = PageRequest::new(1, 10, &[], Some("   ".to_string())).unwrap();
        assert!(request.search.is_none());
    }

    #[test]
    fn test_build_without_search_or_sort() {
        let request = PageRequest::new(1, 20, &[], None).unwrap();
        let query = UserSearchQuery::build(&request, Projection::Detail).unwrap();

        assert!(query.data.sql.starts_with("SELECT id, first_name"));
        assert!(query.data.sql.ends_with("LIMIT $1 OFFSET $2"));
        assert!(!query.data.sql.contains("WHERE"));
        assert_eq!(query.data.values.len(), 2);
        assert_eq!(query.count.sql, "SELECT COUNT(*) AS total FROM users");
        assert!(query.count.values.is_empty());
    }

    #[test]
    fn test_build_with_search_binds_pattern_three_times() {
        let request = PageRequest::new(2, 10, &[], Some("Ali".to_string())).unwrap();
        let query = UserSearchQuery::build(&request, Projection::Summary).unwrap();

        assert!(query.data.sql.contains("LOWER(first_name) LIKE $1"));
        assert!(query.data.sql.contains("LOWER(last_name) LIKE $2"));
        assert!(query.data.sql.contains("LOWER(email) LIKE $3"));
        assert!(query.data.sql.ends_with("LIMIT $4 OFFSET $5"));
        assert_eq!(query.data.values.len(), 5);
        assert_eq!(query.data.values[0], Value::from("%ali%".to_string()));
        assert_eq!(query.data.values[3], Value::from(10i64));
        assert_eq!(query.data.values[4], Value::from(10i64));

        assert!(query.count.sql.contains("COUNT(*)"));
        assert_eq!(query.count.values.len(), 3);
    }

    #[test]
    fn test_build_escapes_like_metacharacters() {
        // "%", "_" and "\" in the term must match literally, not as wildcards
        let request = PageRequest::new(1, 10, &[], Some("50%_o\\ff".to_string())).unwrap();
        let query = UserSearchQuery::build(&request, Projection::Summary).unwrap();

        assert!(query.data.sql.contains("ESCAPE '\\'"));
        assert_eq!(
            query.data.values[0],
            Value::from("%50\\%\\_o\\\\ff%".to_string())
        );
    }

    #[test]
    fn test_build_maps_sort_fields_to_columns() {
        let request = PageRequest::new(
            1,
            20,
            &tokens(&["lastName:asc", "firstName:desc", "type:asc"]),
            None,
        )
        .unwrap();
        let query = UserSearchQuery::build(&request, Projection::Detail).unwrap();

        assert!(query
            .data
            .sql
            .contains("ORDER BY last_name ASC, first_name DESC, user_type ASC"));
        // count query never carries ORDER BY
        assert!(!query.count.sql.contains("ORDER BY"));
    }

    #[test]
    fn test_build_rejects_non_sortable_field() {
        let request = PageRequest::new(1, 20, &tokens(&["password:asc"]), None).unwrap();
        let result = UserSearchQuery::build(&request, Projection::Detail);
        assert!(matches!(result, Err(UserError::InvalidSortField(field)) if field == "password"));
    }

    #[test]
    fn test_build_ignores_malformed_token_but_rejects_bad_field() {
        // malformed token dropped silently, well-formed unknown field rejected
        let request =
            PageRequest::new(1, 20, &tokens(&["name:upward", "password:asc"]), None).unwrap();
        assert_eq!(request.sort.len(), 1);
        assert!(UserSearchQuery::build(&request, Projection::Detail).is_err());
    }

    #[test]
    fn test_page_assembly_rounds_total_up() {
        let request = PageRequest::new(1, 10, &[], None).unwrap();
        assert_eq!(Page::assemble(&request, vec![1, 2], 0).total_pages, 0);
        assert_eq!(Page::assemble(&request, vec![1], 10).total_pages, 1);
        assert_eq!(Page::assemble(&request, vec![1], 11).total_pages, 2);
        assert_eq!(Page::assemble(&request, vec![1], 20).total_pages, 2);
    }

    #[test]
    fn test_page_assembly_reports_one_based_page_no() {
        let request = PageRequest::new(3, 5, &[], None).unwrap();
        let page: Page<i32> = Page::assemble(&request, vec![], 12);
        assert_eq!(page.page_no, 3);
        assert_eq!(page.page_size, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_page_serializes_wire_field_names() {
        let request = PageRequest::new(1, 2, &[], None).unwrap();
        let page = Page::assemble(&request, vec!["a"], 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageNo"], 1);
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["totalPage"], 1);
        assert_eq!(json["items"][0], "a");
    }
}
