use crate::models::dish::Dish;
use crate::models::order::Order;
use crate::observability::metrics::Metrics;
use crate::store::ResourceStore;

pub struct AppState {
    pub dishes: ResourceStore<Dish>,
    pub orders: ResourceStore<Order>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            dishes: ResourceStore::new(),
            orders: ResourceStore::new(),
            metrics: Metrics::new(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
