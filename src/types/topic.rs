use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad category a webhook event is filed under. Several topics map onto
/// the same kind (all four order topics are `Order`, etc).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Order,
    Product,
    Inventory,
    Customer,
    Refund,
    App,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Order => "order",
            EventKind::Product => "product",
            EventKind::Inventory => "inventory",
            EventKind::Customer => "customer",
            EventKind::Refund => "refund",
            EventKind::App => "app",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The Shopify webhook topics this server subscribes to. One POST route per
/// variant; the route table is the only place the mapping is spelled out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Topic {
    #[serde(rename = "orders/create")]
    OrdersCreate,
    #[serde(rename = "orders/updated")]
    OrdersUpdated,
    #[serde(rename = "orders/fulfilled")]
    OrdersFulfilled,
    #[serde(rename = "orders/cancelled")]
    OrdersCancelled,
    #[serde(rename = "products/create")]
    ProductsCreate,
    #[serde(rename = "products/update")]
    ProductsUpdate,
    #[serde(rename = "products/delete")]
    ProductsDelete,
    #[serde(rename = "inventory_levels/update")]
    InventoryLevelsUpdate,
    #[serde(rename = "customers/create")]
    CustomersCreate,
    #[serde(rename = "customers/update")]
    CustomersUpdate,
    #[serde(rename = "refunds/create")]
    RefundsCreate,
    #[serde(rename = "app/uninstalled")]
    AppUninstalled,
}

impl Topic {
    pub const ALL: [Topic; 12] = [
        Topic::OrdersCreate,
        Topic::OrdersUpdated,
        Topic::OrdersFulfilled,
        Topic::OrdersCancelled,
        Topic::ProductsCreate,
        Topic::ProductsUpdate,
        Topic::ProductsDelete,
        Topic::InventoryLevelsUpdate,
        Topic::CustomersCreate,
        Topic::CustomersUpdate,
        Topic::RefundsCreate,
        Topic::AppUninstalled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::OrdersCreate => "orders/create",
            Topic::OrdersUpdated => "orders/updated",
            Topic::OrdersFulfilled => "orders/fulfilled",
            Topic::OrdersCancelled => "orders/cancelled",
            Topic::ProductsCreate => "products/create",
            Topic::ProductsUpdate => "products/update",
            Topic::ProductsDelete => "products/delete",
            Topic::InventoryLevelsUpdate => "inventory_levels/update",
            Topic::CustomersCreate => "customers/create",
            Topic::CustomersUpdate => "customers/update",
            Topic::RefundsCreate => "refunds/create",
            Topic::AppUninstalled => "app/uninstalled",
        }
    }

    pub fn kind(self) -> EventKind {
        match self {
            Topic::OrdersCreate
            | Topic::OrdersUpdated
            | Topic::OrdersFulfilled
            | Topic::OrdersCancelled => EventKind::Order,
            Topic::ProductsCreate | Topic::ProductsUpdate | Topic::ProductsDelete => {
                EventKind::Product
            }
            Topic::InventoryLevelsUpdate => EventKind::Inventory,
            Topic::CustomersCreate | Topic::CustomersUpdate => EventKind::Customer,
            Topic::RefundsCreate => EventKind::Refund,
            Topic::AppUninstalled => EventKind::App,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_topic_maps_to_a_kind() {
        for topic in Topic::ALL {
            // Kind is total over the topic set; exercise the mapping.
            let _ = topic.kind();
        }
        assert_eq!(Topic::OrdersFulfilled.kind(), EventKind::Order);
        assert_eq!(Topic::InventoryLevelsUpdate.kind(), EventKind::Inventory);
        assert_eq!(Topic::AppUninstalled.kind(), EventKind::App);
    }

    #[test]
    fn topic_serializes_as_shopify_string() {
        let json = serde_json::to_string(&Topic::InventoryLevelsUpdate).unwrap_or_default();
        assert_eq!(json, "\"inventory_levels/update\"");
    }
}
