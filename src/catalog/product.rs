//! Products on the menu

use serde::{Deserialize, Serialize};

use super::Entity;

/// A sellable product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price in minor currency units
    pub price: i64,
    /// Quantity on hand
    pub stock: i64,
}

/// Product body for create/replace
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductPayload {
    pub name: String,
    pub price: i64,
    pub stock: i64,
}

impl Entity for Product {
    type Payload = ProductPayload;

    const KIND: &'static str = "Product";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_payload(id: i64, payload: ProductPayload) -> Self {
        Self {
            id,
            name: payload.name,
            price: payload.price,
            stock: payload.stock,
        }
    }
}

/// Products the in-memory store starts with
pub fn seed() -> Vec<Product> {
    vec![
        Product {
            id: 1,
            name: "Kopi Susu".to_string(),
            price: 5000,
            stock: 100,
        },
        Product {
            id: 2,
            name: "Es Teh".to_string(),
            price: 3000,
            stock: 100,
        },
    ]
}
