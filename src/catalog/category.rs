//! Product categories

use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryPayload {
    pub name: String,
}

impl Entity for Category {
    type Payload = CategoryPayload;

    const KIND: &'static str = "Category";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_payload(id: i64, payload: CategoryPayload) -> Self {
        Self {
            id,
            name: payload.name,
        }
    }
}

/// Categories the in-memory store starts with
pub fn seed() -> Vec<Category> {
    vec![
        Category {
            id: 1,
            name: "Makanan".to_string(),
        },
        Category {
            id: 2,
            name: "Minuman".to_string(),
        },
    ]
}
