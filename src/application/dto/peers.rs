//! Payloads owned by peer services
//!
//! These mirror what `user-service`, `product-service` and `order-service`
//! return from `GET /{resource}/{id}`. Every field is optional: a reference
//! carries only the identity, a placeholder carries the identity plus
//! [`UNAVAILABLE`] in its descriptive field.

use serde::{Deserialize, Serialize};

use crate::application::resilience::{DependencyKey, PeerResource, UNAVAILABLE};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl PeerResource for UserDto {
    const DEPENDENCY: DependencyKey = DependencyKey::USER_SERVICE;
    const RESOURCE: &'static str = "user-service/api/users";

    fn id(&self) -> Option<i32> {
        self.user_id
    }

    fn reference(id: i32) -> Self {
        Self {
            user_id: Some(id),
            ..Default::default()
        }
    }

    fn placeholder(id: i32) -> Self {
        Self {
            user_id: Some(id),
            first_name: Some(UNAVAILABLE.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
}

impl PeerResource for ProductDto {
    const DEPENDENCY: DependencyKey = DependencyKey::PRODUCT_SERVICE;
    const RESOURCE: &'static str = "product-service/api/products";

    fn id(&self) -> Option<i32> {
        self.product_id
    }

    fn reference(id: i32) -> Self {
        Self {
            product_id: Some(id),
            ..Default::default()
        }
    }

    fn placeholder(id: i32) -> Self {
        Self {
            product_id: Some(id),
            product_title: Some(UNAVAILABLE.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_fee: Option<f64>,
}

impl PeerResource for OrderDto {
    const DEPENDENCY: DependencyKey = DependencyKey::ORDER_SERVICE;
    const RESOURCE: &'static str = "order-service/api/orders";

    fn id(&self) -> Option<i32> {
        self.order_id
    }

    fn reference(id: i32) -> Self {
        Self {
            order_id: Some(id),
            ..Default::default()
        }
    }

    fn placeholder(id: i32) -> Self {
        Self {
            order_id: Some(id),
            order_desc: Some(UNAVAILABLE.to_string()),
            ..Default::default()
        }
    }
}
