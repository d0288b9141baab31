// src/dashboard_service.rs
//
// Admin dashboard aggregates. Everything is computed in memory from the full
// product and order lists and cached under the admin keys.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, Days, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{CacheKey, cached};
use crate::errors::AppError;
use crate::models::{Order, OrderStatus, Product};
use crate::state::AppState;

const LATEST_TRANSACTIONS: usize = 4;
const MARKETING_SHARE: f64 = 0.3;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Figures {
    pub revenue: i64,
    pub product: i64,
    pub user: i64,
    pub order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderChart {
    pub order: Vec<i64>,
    pub revenue: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub discount: i64,
    pub amount: i64,
    pub quantity: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub category_count: Vec<BTreeMap<String, i64>>,
    pub changed_percent: Figures,
    pub count: Figures,
    pub chart: OrderChart,
    pub latest_transaction: Vec<Transaction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Fulfillment {
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockAvailability {
    pub in_stock: i64,
    pub out_of_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevenueDistribution {
    pub net_margin: i64,
    pub discount: i64,
    pub production_cost: i64,
    pub burnt: i64,
    pub marketing_cost: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PieCharts {
    pub order_fulfillment: Fulfillment,
    pub product_categories: Vec<BTreeMap<String, i64>>,
    pub stock_availability: StockAvailability,
    pub revenue_distribution: RevenueDistribution,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarCharts {
    pub products: Vec<i64>,
    pub customers: Vec<i64>,
    pub orders: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineCharts {
    pub products: Vec<i64>,
    pub discount: Vec<i64>,
    pub revenue: Vec<i64>,
}

/// Month-over-month change. With nothing last month the change is
/// `this_month * 100`.
pub fn calculate_percentage(this_month: i64, last_month: i64) -> i64 {
    if last_month == 0 {
        return this_month * 100;
    }
    (this_month as f64 / last_month as f64 * 100.0).round() as i64
}

/// Midnight on the first day of the month `months_back` months before `today`.
fn month_start(today: DateTime<Utc>, months_back: u32) -> DateTime<Utc> {
    let date = today.date_naive();
    let first = date - Days::new(u64::from(date.day0()));
    first
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(first)
        .and_time(NaiveTime::default())
        .and_utc()
}

/// Buckets `items` into `length` calendar months ending with the current
/// one, oldest first. Each item adds `value(item)` to its month.
pub fn chart_data<T>(
    length: u32,
    items: &[T],
    today: DateTime<Utc>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    value: impl Fn(&T) -> i64,
) -> Vec<i64> {
    let len = length as usize;
    let mut data = vec![0; len];
    let window_start = month_start(today, length.saturating_sub(1));

    for item in items {
        let created = created_at(item);
        if created < window_start || created > today {
            continue;
        }
        let diff = ((today.month() + 12 - created.month()) % 12) as usize;
        if diff < len {
            data[len - diff - 1] += value(item);
        }
    }
    data
}

/// Share of products per category, rounded percent, one single-key map per
/// category in name order.
pub fn category_inventory(products: &[Product]) -> Vec<BTreeMap<String, i64>> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for product in products {
        *counts.entry(product.category.as_str()).or_default() += 1;
    }

    let total = products.len() as f64;
    counts
        .into_iter()
        .map(|(category, count)| {
            let percent = (count as f64 / total * 100.0).round() as i64;
            BTreeMap::from([(category.to_string(), percent)])
        })
        .collect()
}

/// When each distinct user placed their first order.
fn first_orders(orders: &[Order]) -> Vec<DateTime<Utc>> {
    let mut first: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
    for order in orders {
        first
            .entry(order.user)
            .and_modify(|at| *at = (*at).min(order.created_at))
            .or_insert(order.created_at);
    }
    first.into_values().collect()
}

fn distinct_users<'a>(orders: impl Iterator<Item = &'a Order>) -> i64 {
    orders.map(|o| o.user).collect::<HashSet<_>>().len() as i64
}

pub fn build_stats(
    products: &[Product],
    orders: &[Order],
    today: DateTime<Utc>,
) -> DashboardStats {
    let this_month = month_start(today, 0);
    let last_month = month_start(today, 1);
    let in_this_month = |at: DateTime<Utc>| at >= this_month && at <= today;
    let in_last_month = |at: DateTime<Utc>| at >= last_month && at < this_month;

    let orders_this: Vec<&Order> = orders
        .iter()
        .filter(|o| in_this_month(o.created_at))
        .collect();
    let orders_last: Vec<&Order> = orders
        .iter()
        .filter(|o| in_last_month(o.created_at))
        .collect();
    let products_this = products
        .iter()
        .filter(|p| in_this_month(p.created_at))
        .count() as i64;
    let products_last = products
        .iter()
        .filter(|p| in_last_month(p.created_at))
        .count() as i64;

    let revenue_this: i64 = orders_this.iter().map(|o| o.total).sum();
    let revenue_last: i64 = orders_last.iter().map(|o| o.total).sum();

    let changed_percent = Figures {
        revenue: calculate_percentage(revenue_this, revenue_last),
        product: calculate_percentage(products_this, products_last),
        user: calculate_percentage(
            distinct_users(orders_this.iter().copied()),
            distinct_users(orders_last.iter().copied()),
        ),
        order: calculate_percentage(orders_this.len() as i64, orders_last.len() as i64),
    };

    let count = Figures {
        revenue: orders.iter().map(|o| o.total).sum(),
        product: products.len() as i64,
        user: distinct_users(orders.iter()),
        order: orders.len() as i64,
    };

    let chart = OrderChart {
        order: chart_data(6, orders, today, |o| o.created_at, |_| 1),
        revenue: chart_data(6, orders, today, |o| o.created_at, |o| o.total),
    };

    let mut newest: Vec<&Order> = orders.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let latest_transaction = newest
        .into_iter()
        .take(LATEST_TRANSACTIONS)
        .map(|o| Transaction {
            id: o.id,
            discount: o.discount,
            amount: o.total,
            quantity: o.order_items.len() as i64,
            status: o.status,
        })
        .collect();

    DashboardStats {
        category_count: category_inventory(products),
        changed_percent,
        count,
        chart,
        latest_transaction,
    }
}

pub fn build_pie_charts(products: &[Product], orders: &[Order]) -> PieCharts {
    let mut order_fulfillment = Fulfillment::default();
    for order in orders {
        match order.status {
            OrderStatus::Processing => order_fulfillment.processing += 1,
            OrderStatus::Shipped => order_fulfillment.shipped += 1,
            OrderStatus::Delivered => order_fulfillment.delivered += 1,
        }
    }

    let out_of_stock = products.iter().filter(|p| p.stock <= 0).count() as i64;
    let stock_availability = StockAvailability {
        in_stock: products.len() as i64 - out_of_stock,
        out_of_stock,
    };

    let gross_income: i64 = orders.iter().map(|o| o.total).sum();
    let discount: i64 = orders.iter().map(|o| o.discount).sum();
    let production_cost: i64 = orders.iter().map(|o| o.shipping_charges).sum();
    let burnt: i64 = orders.iter().map(|o| o.tax).sum();
    let marketing_cost = (gross_income as f64 * MARKETING_SHARE).round() as i64;

    PieCharts {
        order_fulfillment,
        product_categories: category_inventory(products),
        stock_availability,
        revenue_distribution: RevenueDistribution {
            net_margin: gross_income - discount - production_cost - burnt - marketing_cost,
            discount,
            production_cost,
            burnt,
            marketing_cost,
        },
    }
}

pub fn build_bar_charts(
    products: &[Product],
    orders: &[Order],
    today: DateTime<Utc>,
) -> BarCharts {
    BarCharts {
        products: chart_data(6, products, today, |p| p.created_at, |_| 1),
        customers: chart_data(6, &first_orders(orders), today, |at| *at, |_| 1),
        orders: chart_data(12, orders, today, |o| o.created_at, |_| 1),
    }
}

pub fn build_line_charts(
    products: &[Product],
    orders: &[Order],
    today: DateTime<Utc>,
) -> LineCharts {
    LineCharts {
        products: chart_data(12, products, today, |p| p.created_at, |_| 1),
        discount: chart_data(12, orders, today, |o| o.created_at, |o| o.discount),
        revenue: chart_data(12, orders, today, |o| o.created_at, |o| o.total),
    }
}

async fn load_all(state: &AppState) -> Result<(Vec<Product>, Vec<Order>), AppError> {
    tokio::try_join!(state.products.all(), state.orders.all())
}

pub async fn dashboard_stats(state: &AppState) -> Result<DashboardStats, AppError> {
    cached(state.cache.as_ref(), CacheKey::AdminStats, || async {
        let (products, orders) = load_all(state).await?;
        Ok::<_, AppError>(build_stats(&products, &orders, Utc::now()))
    })
    .await
}

pub async fn pie_charts(state: &AppState) -> Result<PieCharts, AppError> {
    cached(state.cache.as_ref(), CacheKey::AdminPieCharts, || async {
        let (products, orders) = load_all(state).await?;
        Ok::<_, AppError>(build_pie_charts(&products, &orders))
    })
    .await
}

pub async fn bar_charts(state: &AppState) -> Result<BarCharts, AppError> {
    cached(state.cache.as_ref(), CacheKey::AdminBarCharts, || async {
        let (products, orders) = load_all(state).await?;
        Ok::<_, AppError>(build_bar_charts(&products, &orders, Utc::now()))
    })
    .await
}

pub async fn line_charts(state: &AppState) -> Result<LineCharts, AppError> {
    cached(state.cache.as_ref(), CacheKey::AdminLineCharts, || async {
        let (products, orders) = load_all(state).await?;
        Ok::<_, AppError>(build_line_charts(&products, &orders, Utc::now()))
    })
    .await
}
