// src/filters.rs
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::models::{Product, normalize_category};

pub const DEFAULT_PAGE_SIZE: i64 = 8;

/// Raw query string of `GET /product/all`. Everything arrives as text and is
/// parsed leniently: a bad `page` means page 1, a bad `price` means no cap.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
}

impl ListingParams {
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    pub fn into_query(self, page_size: i64) -> CatalogQuery {
        let page = self.page();
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let filter = ProductFilter {
            search: non_empty(self.search).map(|s| s.trim().to_string()),
            max_price: self
                .price
                .as_deref()
                .and_then(|p| p.trim().parse::<f64>().ok())
                .filter(|p| p.is_finite())
                .map(|p| p.floor() as i64),
            category: non_empty(self.category).map(|c| normalize_category(&c)),
        };

        CatalogQuery {
            filter,
            sort: non_empty(self.sort).map(|s| PriceSort::from_param(&s)),
            page,
            limit: page_size.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSort {
    Ascending,
    Descending,
}

impl PriceSort {
    /// Exactly `asc` sorts ascending; any other value, `ASC` included, sorts
    /// descending.
    pub fn from_param(value: &str) -> Self {
        if value.trim() == "asc" {
            PriceSort::Ascending
        } else {
            PriceSort::Descending
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            PriceSort::Ascending => "ASC",
            PriceSort::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub max_price: Option<i64>,
    pub category: Option<String>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(search) = &self.search {
            if !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
            {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if product.price > max_price {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        true
    }

    /// Appends the WHERE clause for this filter. Shared by the page query and
    /// the count query so both see exactly the same rows.
    pub fn push_where<'a>(&self, builder: &mut QueryBuilder<'a, Postgres>) {
        let mut conditions_added = false;
        let mut append_where_or_and = |builder: &mut QueryBuilder<'a, Postgres>| {
            if !conditions_added {
                builder.push(" WHERE ");
                conditions_added = true;
            } else {
                builder.push(" AND ");
            }
        };

        if let Some(search) = &self.search {
            append_where_or_and(builder);
            let like_pattern = format!("%{}%", escape_like(search));
            builder.push("name ILIKE ").push_bind(like_pattern);
        }
        if let Some(max_price) = self.max_price {
            append_where_or_and(builder);
            builder.push("price <= ").push_bind(max_price);
        }
        if let Some(category) = &self.category {
            append_where_or_and(builder);
            builder.push("category = ").push_bind(category.clone());
        }
    }

    pub fn build_count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
        self.push_where(&mut builder);
        builder
    }
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// A filtered, sorted page of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub filter: ProductFilter,
    pub sort: Option<PriceSort>,
    pub page: i64,
    pub limit: i64,
}

impl CatalogQuery {
    /// Rows to skip. Saturates so an absurd page number reads past the end
    /// instead of overflowing.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn build_page_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut builder = QueryBuilder::new("SELECT * FROM products");
        self.filter.push_where(&mut builder);
        match self.sort {
            Some(sort) => {
                builder.push(format!(
                    " ORDER BY price {}, created_at ASC, id ASC",
                    sort.as_sql()
                ));
            }
            None => {
                builder.push(" ORDER BY created_at ASC, id ASC");
            }
        }
        builder.push(" LIMIT ").push_bind(self.limit);
        builder.push(" OFFSET ").push_bind(self.offset());
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListingParams {
        let mut params = ListingParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "search" => params.search = value,
                "sort" => params.sort = value,
                "category" => params.category = value,
                "price" => params.price = value,
                "page" => params.page = value,
                _ => unreachable!(),
            }
        }
        params
    }

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(params(&[]).page(), 1);
        assert_eq!(params(&[("page", "abc")]).page(), 1);
        assert_eq!(params(&[("page", "0")]).page(), 1);
        assert_eq!(params(&[("page", "-3")]).page(), 1);
        assert_eq!(params(&[("page", "3")]).page(), 3);
    }

    #[test]
    fn offset_follows_page_and_size() {
        let query = params(&[("page", "3")]).into_query(8);
        assert_eq!(query.offset(), 16);
        assert_eq!(query.limit, 8);
    }

    #[test]
    fn huge_page_reads_past_the_end() {
        let query = params(&[("page", "9223372036854775807")]).into_query(8);
        assert_eq!(query.page, i64::MAX);
        assert_eq!(query.offset(), i64::MAX);
    }

    #[test]
    fn uppercase_asc_sorts_descending() {
        assert_eq!(
            params(&[("sort", "ASC")]).into_query(8).sort,
            Some(PriceSort::Descending)
        );
    }

    #[test]
    fn sort_is_descending_unless_asc() {
        assert_eq!(
            params(&[("sort", "asc")]).into_query(8).sort,
            Some(PriceSort::Ascending)
        );
        assert_eq!(
            params(&[("sort", "dsc")]).into_query(8).sort,
            Some(PriceSort::Descending)
        );
        assert_eq!(params(&[("sort", "")]).into_query(8).sort, None);
        assert_eq!(params(&[]).into_query(8).sort, None);
    }

    #[test]
    fn bad_price_is_ignored() {
        assert_eq!(
            params(&[("price", "oops")]).into_query(8).filter.max_price,
            None
        );
        assert_eq!(
            params(&[("price", "99.9")]).into_query(8).filter.max_price,
            Some(99)
        );
    }

    #[test]
    fn page_and_count_queries_share_filter() {
        let query = params(&[
            ("search", "lap"),
            ("price", "1000"),
            ("category", "Electronics"),
            ("sort", "asc"),
        ])
        .into_query(8);

        let page_sql = query.build_page_query().into_sql();
        let count_sql = query.filter.build_count_query().into_sql();

        let where_clause = " WHERE name ILIKE $1 AND price <= $2 AND category = $3";
        assert_eq!(
            page_sql,
            format!(
                "SELECT * FROM products{} ORDER BY price ASC, created_at ASC, id ASC LIMIT $4 OFFSET $5",
                where_clause
            )
        );
        assert_eq!(
            count_sql,
            format!("SELECT COUNT(*) FROM products{}", where_clause)
        );
    }

    #[test]
    fn unsorted_query_keeps_insertion_order() {
        let sql = params(&[]).into_query(8).build_page_query().into_sql();
        assert_eq!(
            sql,
            "SELECT * FROM products ORDER BY created_at ASC, id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn category_filter_is_normalized() {
        let query = params(&[("category", "Electronics")]).into_query(8);
        assert_eq!(query.filter.category.as_deref(), Some("electronics"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
