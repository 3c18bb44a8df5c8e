use crate::models::OrderRecord;
use serde::Serialize;
use std::fmt;

/// Stable identity of a table row: one counterparty's order id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub counterparty: String,
    pub order_id: String,
}

impl RowKey {
    pub fn new(counterparty: &str, order_id: &str) -> Self {
        Self {
            counterparty: counterparty.to_string(),
            order_id: order_id.to_string(),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.counterparty, self.order_id)
    }
}

impl Serialize for RowKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An order as shown in the table: the untouched record plus view-only annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub key: RowKey,
    pub highlighted: bool,
    #[serde(flatten)]
    pub order: OrderRecord,
}

impl OrderRow {
    pub fn new(order: OrderRecord, highlighted: bool) -> Self {
        Self {
            key: order.key(),
            highlighted,
            order,
        }
    }
}

impl AsRef<OrderRecord> for OrderRow {
    fn as_ref(&self) -> &OrderRecord {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::order;
    use crate::models::OrderType;

    #[test]
    fn test_row_key_display() {
        assert_eq!(RowKey::new("alice", "12").to_string(), "alice_12");
    }

    #[test]
    fn test_row_serializes_flat() {
        let row = OrderRow::new(order("alice", "2", OrderType::Relative, "0.3%"), true);
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["key"], "alice_2");
        assert_eq!(v["highlighted"], true);
        assert_eq!(v["counterparty"], "alice");
        assert_eq!(v["fee"], "0.3%");
    }
}
