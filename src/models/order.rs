use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::store::HasId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    OutForDelivery,
    Delivered,
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "out-for-delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            _ => Err(()),
        }
    }
}

/// One line of an order: which dish, how many of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDish {
    #[serde(rename = "dishId")]
    pub dish_id: String,
    pub quantity: i64,
}

/// A customer order. `status` stays unset when a creation payload carries
/// none, and the field is omitted from the serialized record in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(rename = "deliverTo")]
    pub deliver_to: String,
    #[serde(rename = "mobileNumber")]
    pub mobile_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    pub dishes: Vec<OrderDish>,
}

impl HasId for Order {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Order, OrderStatus};

    #[test]
    fn status_parses_the_four_wire_spellings() {
        assert_eq!("pending".parse(), Ok(OrderStatus::Pending));
        assert_eq!("preparing".parse(), Ok(OrderStatus::Preparing));
        assert_eq!("out-for-delivery".parse(), Ok(OrderStatus::OutForDelivery));
        assert_eq!("delivered".parse(), Ok(OrderStatus::Delivered));
        assert_eq!("canceled".parse::<OrderStatus>(), Err(()));
        assert_eq!("Pending".parse::<OrderStatus>(), Err(()));
    }

    #[test]
    fn status_serializes_in_kebab_case() {
        let value = serde_json::to_value(OrderStatus::OutForDelivery).unwrap();
        assert_eq!(value, json!("out-for-delivery"));
    }

    #[test]
    fn an_order_without_a_status_serializes_without_the_key() {
        let order = Order {
            id: "1".to_string(),
            deliver_to: "221B Baker Street".to_string(),
            mobile_number: "555-0100".to_string(),
            status: None,
            dishes: Vec::new(),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert!(value.get("status").is_none());
        assert_eq!(value["deliverTo"], "221B Baker Street");
        assert_eq!(value["mobileNumber"], "555-0100");
    }
}
