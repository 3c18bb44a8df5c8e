//! Free-text search over orders.
//!
//! Query and fields go through the same normalization: lower-cased with every
//! decimal separator removed, so `"01234"` finds a size shown as `"0.1234"`.

use crate::models::OrderRecord;

pub fn normalize(value: &str) -> String {
    value.replace('.', "").to_lowercase()
}

/// True when any displayable field of `order` contains `query` after normalization.
/// An empty query matches everything.
pub fn matches(order: &OrderRecord, query: &str) -> bool {
    let query = normalize(query);
    matches_normalized(order, &query)
}

fn matches_normalized(order: &OrderRecord, normalized_query: &str) -> bool {
    if normalized_query.is_empty() {
        return true;
    }
    order
        .searchable_fields()
        .iter()
        .any(|field| normalize(field).contains(normalized_query))
}

/// Keep the matching orders, preserving their input order.
pub fn filter_orders<'a>(orders: &'a [OrderRecord], query: &str) -> Vec<&'a OrderRecord> {
    let query = normalize(query);
    orders
        .iter()
        .filter(|o| matches_normalized(o, &query))
        .collect()
}
