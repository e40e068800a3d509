//! Directory search: HTTP filter inputs → parameterized SQL.
//!
//! The builder produces a SELECT over the `directory_listings` materialized
//! view plus a matching COUNT for the pagination envelope. Placeholders are
//! numbered in input order; the page query binds `limit` and `offset` as the
//! final two parameters.

/// Sort mode for directory search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Featured listings first, then rating. The view carries no text-rank
    /// column, so "relevance" is a fixed editorial ordering.
    #[default]
    Relevance,
    Rating,
    Newest,
    Products,
}

impl SortKey {
    /// Parse the `sort` query parameter; unknown values fall back to relevance.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("rating") => Self::Rating,
            Some("newest") => Self::Newest,
            Some("products") => Self::Products,
            _ => Self::Relevance,
        }
    }

    /// ORDER BY clause for this key. Ties always break on `created_at DESC`.
    fn order_by(self) -> &'static str {
        match self {
            Self::Relevance => {
                "ORDER BY is_featured DESC, rating_avg DESC NULLS LAST, created_at DESC"
            }
            Self::Rating => "ORDER BY rating_avg DESC NULLS LAST, rating_count DESC, created_at DESC",
            Self::Newest => "ORDER BY created_at DESC",
            Self::Products => "ORDER BY product_count DESC, created_at DESC",
        }
    }
}

/// Sanitized search inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub query: Option<String>,
    pub sort: SortKey,
}

impl SearchFilter {
    /// Drop blank strings so they don't turn into vacuous WHERE clauses.
    pub fn new(
        category: Option<String>,
        city: Option<String>,
        state: Option<String>,
        query: Option<String>,
        sort: SortKey,
    ) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            category: clean(category),
            city: clean(city),
            state: clean(state),
            query: clean(query),
            sort,
        }
    }
}

/// A ready-to-execute search: page SQL, count SQL, and string parameters in
/// placeholder order (the page SQL additionally binds limit and offset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub sql: String,
    pub count_sql: String,
    pub params: Vec<String>,
}

const LISTING_COLUMNS: &str = "tenant_id, store_name, slug, description, address, city, state, \
     latitude, longitude, primary_category, secondary_category, \
     rating_avg, rating_count, product_count, is_featured, created_at";

impl SearchQuery {
    /// Build page + count statements for a filter. The executor binds
    /// `limit` and `offset` into the final two placeholders.
    pub fn build(filter: &SearchFilter) -> Self {
        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(category) = &filter.category {
            params.push(category.clone());
            conditions.push(format!(
                "(primary_category = ${n} OR secondary_category = ${n})",
                n = params.len()
            ));
        }
        if let Some(city) = &filter.city {
            params.push(city.clone());
            conditions.push(format!("LOWER(city) = LOWER(${})", params.len()));
        }
        if let Some(state) = &filter.state {
            params.push(state.clone());
            conditions.push(format!("LOWER(state) = LOWER(${})", params.len()));
        }
        if let Some(query) = &filter.query {
            params.push(format!("%{query}%"));
            conditions.push(format!(
                "(store_name ILIKE ${n} OR description ILIKE ${n})",
                n = params.len()
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM directory_listings{where_clause} {} LIMIT ${} OFFSET ${}",
            filter.sort.order_by(),
            params.len() + 1,
            params.len() + 2,
        );
        let count_sql = format!("SELECT COUNT(*) FROM directory_listings{where_clause}");

        Self {
            sql,
            count_sql,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_filters_produces_unfiltered_query() {
        let q = SearchQuery::build(&SearchFilter::default());
        assert!(q.params.is_empty());
        assert!(!q.sql.contains("WHERE"));
        assert!(q.sql.ends_with("LIMIT $1 OFFSET $2"));
        assert_eq!(q.count_sql, "SELECT COUNT(*) FROM directory_listings");
        // Default sort is relevance: featured first.
        assert!(q.sql.contains("ORDER BY is_featured DESC"));
    }

    #[test]
    fn placeholders_are_numbered_in_input_order() {
        let filter = SearchFilter::new(
            Some("bakery".into()),
            Some("Austin".into()),
            Some("TX".into()),
            Some("sourdough".into()),
            SortKey::Rating,
        );
        let q = SearchQuery::build(&filter);

        assert_eq!(
            q.params,
            vec!["bakery", "Austin", "TX", "%sourdough%"]
        );
        assert!(q.sql.contains("(primary_category = $1 OR secondary_category = $1)"));
        assert!(q.sql.contains("LOWER(city) = LOWER($2)"));
        assert!(q.sql.contains("LOWER(state) = LOWER($3)"));
        assert!(q.sql.contains("(store_name ILIKE $4 OR description ILIKE $4)"));
        assert!(q.sql.contains("LIMIT $5 OFFSET $6"));
    }

    #[test]
    fn count_query_matches_page_query_filters() {
        let filter = SearchFilter::new(None, Some("Austin".into()), None, None, SortKey::Newest);
        let q = SearchQuery::build(&filter);

        assert_eq!(
            q.count_sql,
            "SELECT COUNT(*) FROM directory_listings WHERE LOWER(city) = LOWER($1)"
        );
        assert!(!q.count_sql.contains("ORDER BY"));
    }

    #[test]
    fn every_sort_key_breaks_ties_on_created_at() {
        for sort in [SortKey::Relevance, SortKey::Rating, SortKey::Newest, SortKey::Products] {
            let q = SearchQuery::build(&SearchFilter::new(None, None, None, None, sort));
            assert!(q.sql.contains("created_at DESC"), "sort {sort:?}");
        }
    }

    #[test]
    fn blank_filter_values_are_dropped() {
        let filter = SearchFilter::new(Some("  ".into()), None, Some(String::new()), None, SortKey::Relevance);
        assert_eq!(filter, SearchFilter::default());
    }

    #[test]
    fn unknown_sort_falls_back_to_relevance() {
        assert_eq!(SortKey::from_raw(Some("bogus")), SortKey::Relevance);
        assert_eq!(SortKey::from_raw(None), SortKey::Relevance);
        assert_eq!(SortKey::from_raw(Some("products")), SortKey::Products);
    }

    #[test]
    fn free_text_is_wrapped_for_ilike() {
        let filter = SearchFilter::new(None, None, None, Some("coffee".into()), SortKey::Relevance);
        let q = SearchQuery::build(&filter);
        assert_eq!(q.params, vec!["%coffee%"]);
    }
}
