// src/cache/keys.rs
use std::fmt;

use uuid::Uuid;

/// Every key this service ever reads or deletes. Rendered form is what the
/// cache store sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    LatestProducts,
    Categories,
    AllProducts,
    Product(Uuid),
    AllOrders,
    MyOrders(Uuid),
    Order(Uuid),
    Reviews(Uuid),
    AdminStats,
    AdminPieCharts,
    AdminBarCharts,
    AdminLineCharts,
}

impl CacheKey {
    pub const CATALOG: [CacheKey; 3] = [
        CacheKey::LatestProducts,
        CacheKey::Categories,
        CacheKey::AllProducts,
    ];

    pub const ADMIN_DASHBOARD: [CacheKey; 4] = [
        CacheKey::AdminStats,
        CacheKey::AdminPieCharts,
        CacheKey::AdminBarCharts,
        CacheKey::AdminLineCharts,
    ];
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::LatestProducts => f.write_str("latest-products"),
            CacheKey::Categories => f.write_str("categories"),
            CacheKey::AllProducts => f.write_str("all-products"),
            CacheKey::Product(id) => write!(f, "product-{}", id),
            CacheKey::AllOrders => f.write_str("all-orders"),
            CacheKey::MyOrders(user_id) => write!(f, "my-orders-{}", user_id),
            CacheKey::Order(order_id) => write!(f, "order-{}", order_id),
            CacheKey::Reviews(product_id) => write!(f, "reviews-{}", product_id),
            CacheKey::AdminStats => f.write_str("admin-stats"),
            CacheKey::AdminPieCharts => f.write_str("admin-pie-charts"),
            CacheKey::AdminBarCharts => f.write_str("admin-bar-charts"),
            CacheKey::AdminLineCharts => f.write_str("admin-line-charts"),
        }
    }
}
