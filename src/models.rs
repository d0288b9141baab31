// src/models.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;

pub const MIN_PHOTOS: usize = 1;
pub const MAX_PHOTOS: usize = 5;

/// Photo stored on the media host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub stock: i64,
    pub category: String,
    pub description: String,
    #[sqlx(json)]
    pub photos: Vec<Photo>,
    pub ratings: i32,
    pub num_of_reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Categories are stored lowercase so filtering and the category list agree.
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Text fields of the admin product form after parsing.
#[derive(Debug, Clone, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, max = 255, message = "Product name must be 1 to 255 characters"))]
    pub name: String,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,
    #[validate(length(min = 1, max = 100, message = "Category must be 1 to 100 characters"))]
    pub category: String,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: String,
}

impl ProductDraft {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let required = |name: &str| {
            fields
                .get(name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AppError::BadRequest("Please enter All Fields".to_string()))
        };

        let name = required("name")?.to_string();
        let price = parse_whole_number("price", required("price")?)?;
        let stock = parse_whole_number("stock", required("stock")?)?;
        let category = normalize_category(required("category")?);
        let description = required("description")?.to_string();

        Ok(ProductDraft {
            name,
            price,
            stock,
            category,
            description,
        })
    }
}

/// Partial update: only fields that were sent are applied.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProductChanges {
    #[validate(length(min = 1, max = 255, message = "Product name must be 1 to 255 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,
    #[validate(length(min = 1, max = 100, message = "Category must be 1 to 100 characters"))]
    pub category: Option<String>,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
}

impl ProductChanges {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let optional = |name: &str| {
            fields
                .get(name)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        Ok(ProductChanges {
            name: optional("name").map(str::to_string),
            price: optional("price")
                .map(|value| parse_whole_number("price", value))
                .transpose()?,
            stock: optional("stock")
                .map(|value| parse_whole_number("stock", value))
                .transpose()?,
            category: optional("category").map(normalize_category),
            description: optional("description").map(str::to_string),
        })
    }

    pub fn apply_to(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
    }
}

fn parse_whole_number(field: &str, value: &str) -> Result<i64, AppError> {
    value
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Field '{}' must be a whole number", field)))
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Type, Display, EnumString, AsRefStr,
)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// Next fulfillment step. `Delivered` is terminal.
    pub fn next(self) -> Self {
        match self {
            OrderStatus::Processing => OrderStatus::Shipped,
            OrderStatus::Shipped | OrderStatus::Delivered => OrderStatus::Delivered,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    #[validate(length(min = 1, message = "Please Enter all Fields"))]
    pub address: String,
    #[validate(length(min = 1, message = "Please Enter all Fields"))]
    pub city: String,
    #[validate(length(min = 1, message = "Please Enter all Fields"))]
    pub state: String,
    #[validate(length(min = 1, message = "Please Enter all Fields"))]
    pub country: String,
    pub pin_code: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub photo: String,
    pub price: i64,
    pub quantity: i64,
    pub product_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[sqlx(rename = "user_id")]
    pub user: Uuid,
    #[sqlx(json)]
    pub shipping_info: ShippingInfo,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_charges: i64,
    pub discount: i64,
    pub total: i64,
    pub status: OrderStatus,
    #[sqlx(json)]
    pub order_items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /order/new`. Every field is optional at the wire level so a
/// missing one produces the uniform "Please Enter all Fields" error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderPayload {
    pub shipping_info: Option<ShippingInfo>,
    pub order_items: Option<Vec<OrderItem>>,
    pub subtotal: Option<i64>,
    pub tax: Option<i64>,
    pub shipping_charges: Option<i64>,
    pub discount: Option<i64>,
    pub total: Option<i64>,
}

impl NewOrderPayload {
    pub fn into_order(self, user: Uuid) -> Result<Order, AppError> {
        let missing = || AppError::BadRequest("Please Enter all Fields".to_string());

        let shipping_info = self.shipping_info.ok_or_else(missing)?;
        shipping_info.validate()?;
        let order_items = self
            .order_items
            .filter(|items| !items.is_empty())
            .ok_or_else(missing)?;
        if order_items.iter().any(|item| item.quantity < 1) {
            return Err(AppError::BadRequest(
                "Item quantity must be at least 1".to_string(),
            ));
        }

        let now = Utc::now();
        Ok(Order {
            id: Uuid::new_v4(),
            user,
            shipping_info,
            subtotal: self.subtotal.ok_or_else(missing)?,
            tax: self.tax.ok_or_else(missing)?,
            shipping_charges: self.shipping_charges.unwrap_or(0),
            discount: self.discount.unwrap_or(0),
            total: self.total.ok_or_else(missing)?,
            status: OrderStatus::Processing,
            order_items,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub comment: String,
    pub rating: i32,
    #[sqlx(rename = "user_id")]
    pub user: Uuid,
    #[sqlx(rename = "product_id")]
    pub product: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReviewPayload {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1 to 2000 characters"))]
    pub comment: String,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
}
