use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const ABSOLUTE_ORDER_TYPE_VAL: &str = "sw0absoffer";
pub const RELATIVE_ORDER_TYPE_VAL: &str = "sw0reloffer";

/// Offer type as announced by the maker. Decides how `fee` is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderType {
    /// Fixed fee in sats (`sw0absoffer`).
    Absolute,
    /// Fee as a percentage of the coinjoin amount (`sw0reloffer`).
    Relative,
    /// Any other announced type, kept verbatim.
    Other(String),
}

impl OrderType {
    pub fn from_wire(value: &str) -> Self {
        match value {
            ABSOLUTE_ORDER_TYPE_VAL => OrderType::Absolute,
            RELATIVE_ORDER_TYPE_VAL => OrderType::Relative,
            other => OrderType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OrderType::Absolute => ABSOLUTE_ORDER_TYPE_VAL,
            OrderType::Relative => RELATIVE_ORDER_TYPE_VAL,
            OrderType::Other(s) => s,
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(OrderType::from_wire(&s))
    }
}

/// A single standing offer from one counterparty.
///
/// `(counterparty, order_id)` is unique within one snapshot; `order_id` alone is not.
/// `fee` stays text so the original precision survives display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: String,
    pub counterparty: String,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub fee: String,
    pub minimum_size: f64,
    pub maximum_size: f64,
    pub miner_fee_contribution: f64,
    pub bond_value: f64,
}

impl OrderRecord {
    pub fn key(&self) -> crate::models::RowKey {
        crate::models::RowKey::new(&self.counterparty, &self.order_id)
    }

    /// Every field the search box looks at, in display form.
    pub fn searchable_fields(&self) -> [String; 8] {
        [
            self.order_type.as_str().to_string(),
            self.counterparty.clone(),
            self.fee.clone(),
            self.minimum_size.to_string(),
            self.maximum_size.to_string(),
            self.miner_fee_contribution.to_string(),
            self.bond_value.to_string(),
            self.order_id.clone(),
        ]
    }
}

impl AsRef<OrderRecord> for OrderRecord {
    fn as_ref(&self) -> &OrderRecord {
        self
    }
}

#[cfg(test)]
pub(crate) fn order(
    counterparty: &str,
    order_id: &str,
    order_type: OrderType,
    fee: &str,
) -> OrderRecord {
    OrderRecord {
        order_id: order_id.to_string(),
        counterparty: counterparty.to_string(),
        order_type,
        fee: fee.to_string(),
        minimum_size: 0.0,
        maximum_size: 0.0,
        miner_fee_contribution: 0.0,
        bond_value: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_type_wire_values() {
        assert_eq!(OrderType::from_wire("sw0absoffer"), OrderType::Absolute);
        assert_eq!(OrderType::from_wire("sw0reloffer"), OrderType::Relative);
        assert_eq!(
            OrderType::from_wire("swreloffer"),
            OrderType::Other("swreloffer".to_string())
        );
        assert_eq!(OrderType::Other("absoffer".into()).as_str(), "absoffer");
    }

    #[test]
    fn test_order_record_json_shape() {
        let json = r#"{
            "orderId": "3",
            "counterparty": "J5abc",
            "type": "sw0reloffer",
            "fee": "0.002%",
            "minimumSize": 27300,
            "maximumSize": 1000000,
            "minerFeeContribution": 0,
            "bondValue": 0.5
        }"#;
        let record: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.order_type, OrderType::Relative);
        assert_eq!(record.minimum_size, 27300.0);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["type"], "sw0reloffer");
        assert_eq!(back["orderId"], "3");
    }

    #[test]
    fn test_searchable_fields_use_display_form() {
        let mut o = order("bob", "7", OrderType::Absolute, "1000");
        o.minimum_size = 0.1234;
        let fields = o.searchable_fields();
        assert_eq!(fields[0], "sw0absoffer");
        assert_eq!(fields[3], "0.1234");
        assert_eq!(fields[7], "7");
    }
}
