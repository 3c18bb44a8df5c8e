use crate::models::{OrderRecord, RowKey};
use std::collections::HashSet;

/// Rows belonging to `identity`. Empty when highlighting is off or no identity is known.
///
/// Always derived from the order slice being displayed, never cached across refreshes.
pub fn compute_highlights<T: AsRef<OrderRecord>>(
    orders: &[T],
    identity: Option<&str>,
    enabled: bool,
) -> HashSet<RowKey> {
    let identity = match identity {
        Some(id) if enabled => id,
        _ => return HashSet::new(),
    };
    orders
        .iter()
        .map(|o| o.as_ref())
        .filter(|o: &&OrderRecord| o.counterparty == identity)
        .map(OrderRecord::key)
        .collect()
}
