use serde::{Deserialize, Serialize};

use crate::store::HasId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image_url: String,
}

impl HasId for Dish {
    fn id(&self) -> &str {
        &self.id
    }
}
