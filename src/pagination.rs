// src/pagination.rs
use crate::models::Product;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedProductsResponse {
    pub success: bool,
    pub products: Vec<Product>,
    pub total_page: i64,
}

/// Number of pages needed to show `total_items` at `per_page` per page.
pub fn total_pages(total_items: i64, per_page: i64) -> i64 {
    if total_items <= 0 || per_page <= 0 {
        0
    } else {
        (total_items + per_page - 1) / per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_partial_pages_up() {
        assert_eq!(total_pages(17, 8), 3);
        assert_eq!(total_pages(16, 8), 2);
        assert_eq!(total_pages(1, 8), 1);
    }

    #[test]
    fn empty_result_has_no_pages() {
        assert_eq!(total_pages(0, 8), 0);
    }
}
