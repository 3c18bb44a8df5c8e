//! Column sorting for the order table.
//!
//! Each sortable column has an ascending comparator. Descending is the
//! ascending result reversed, so the two directions are exact mirrors.

use crate::models::{OrderRecord, OrderType};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Type,
    Counterparty,
    Fee,
    MinimumSize,
    MaximumSize,
    MinerFeeContribution,
    BondValue,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::Type,
        SortKey::Counterparty,
        SortKey::Fee,
        SortKey::MinimumSize,
        SortKey::MaximumSize,
        SortKey::MinerFeeContribution,
        SortKey::BondValue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Type => "TYPE",
            SortKey::Counterparty => "COUNTERPARTY",
            SortKey::Fee => "FEE",
            SortKey::MinimumSize => "MINIMUM_SIZE",
            SortKey::MaximumSize => "MAXIMUM_SIZE",
            SortKey::MinerFeeContribution => "MINER_FEE_CONTRIBUTION",
            SortKey::BondValue => "BOND_VALUE",
        }
    }

    /// Ascending comparator for this column.
    pub fn compare(&self, a: &OrderRecord, b: &OrderRecord) -> Ordering {
        match self {
            SortKey::Type => a.order_type.as_str().cmp(b.order_type.as_str()),
            SortKey::Counterparty => compare_counterparty(a, b),
            SortKey::Fee => compare_fee(a, b),
            SortKey::MinimumSize => compare_numbers(a.minimum_size, b.minimum_size),
            SortKey::MaximumSize => compare_numbers(a.maximum_size, b.maximum_size),
            SortKey::MinerFeeContribution => {
                compare_numbers(a.miner_fee_contribution, b.miner_fee_contribution)
            }
            SortKey::BondValue => compare_numbers(a.bond_value, b.bond_value),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    /// Accepts the column constants (`MINIMUM_SIZE`) as well as field names (`minimumSize`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|k| k.as_str().replace('_', "").to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown sort key '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
    Unsorted,
}

/// Active column and direction. Selecting a column cycles
/// ascending → descending → unsorted; a different column starts ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::MinimumSize,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Unsorted,
                SortDirection::Unsorted => SortDirection::Ascending,
            };
        } else {
            self.key = key;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn apply<T: AsRef<OrderRecord>>(&self, items: &mut Vec<T>) {
        sort_orders(items, self.key, self.direction);
    }
}

pub fn sort_orders<T: AsRef<OrderRecord>>(items: &mut Vec<T>, key: SortKey, direction: SortDirection) {
    if direction == SortDirection::Unsorted {
        return;
    }
    stable_sort_by(items, |a, b| key.compare(a.as_ref(), b.as_ref()));
    if direction == SortDirection::Descending {
        items.reverse();
    }
}

/// Type priority first (relative < other < absolute), then the fee value
/// within a type. Unreadable fee values compare equal.
pub fn compare_fee(a: &OrderRecord, b: &OrderRecord) -> Ordering {
    if a.order_type != b.order_type {
        let by_rank = type_rank(&a.order_type).cmp(&type_rank(&b.order_type));
        return by_rank.then_with(|| a.order_type.as_str().cmp(b.order_type.as_str()));
    }
    match a.order_type {
        OrderType::Absolute => match (parse_number(&a.fee), parse_number(&b.fee)) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => Ordering::Equal,
        },
        OrderType::Relative => match (percent_value(&a.fee), percent_value(&b.fee)) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => Ordering::Equal,
        },
        OrderType::Other(_) => Ordering::Equal,
    }
}

/// Counterparty name, then numeric order id (`"2"` before `"10"`).
pub fn compare_counterparty(a: &OrderRecord, b: &OrderRecord) -> Ordering {
    a.counterparty.cmp(&b.counterparty).then_with(|| {
        match (parse_number(&a.order_id), parse_number(&b.order_id)) {
            (Some(x), Some(y)) => compare_numbers(x, y),
            _ => a.order_id.cmp(&b.order_id),
        }
    })
}

fn type_rank(order_type: &OrderType) -> u8 {
    match order_type {
        OrderType::Relative => 0,
        OrderType::Other(_) => 1,
        OrderType::Absolute => 2,
    }
}

fn compare_numbers(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Number in front of the first `%`, if `%` is not the leading character.
fn percent_value(fee: &str) -> Option<f64> {
    match fee.find('%') {
        Some(idx) if idx > 0 => parse_number(&fee[..idx]),
        _ => None,
    }
}

/// Stable top-down merge sort.
///
/// `compare_fee` is not transitive once unreadable fees are involved, and
/// `slice::sort_by` may panic on such comparators.
pub fn stable_sort_by<T, F>(items: &mut Vec<T>, mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let taken = std::mem::take(items);
    *items = merge_sort(taken, &mut compare);
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r) == Ordering::Greater,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::order;

    fn ids(orders: &[OrderRecord]) -> Vec<String> {
        orders.iter().map(|o| o.key().to_string()).collect()
    }

    fn sized() -> Vec<OrderRecord> {
        let sizes = [(500.0, 3.0), (100.0, 1.0), (300.0, 9.0), (100.0, 4.0), (900.0, 0.5)];
        sizes
            .iter()
            .enumerate()
            .map(|(i, (min, bond))| {
                let mut o = order(&format!("cp{}", i), &i.to_string(), OrderType::Absolute, "0");
                o.minimum_size = *min;
                o.maximum_size = min * 10.0;
                o.miner_fee_contribution = *bond * 2.0;
                o.bond_value = *bond;
                o
            })
            .collect()
    }

    #[test]
    fn test_relative_fee_sorts_before_absolute() {
        let abs = order("bob", "1", OrderType::Absolute, "1000");
        let rel = order("alice", "2", OrderType::Relative, "0.5%");
        assert_eq!(compare_fee(&rel, &abs), Ordering::Less);
        assert_eq!(compare_fee(&abs, &rel), Ordering::Greater);

        let mut orders = vec![abs, rel];
        sort_orders(&mut orders, SortKey::Fee, SortDirection::Ascending);
        assert_eq!(ids(&orders), vec!["alice_2", "bob_1"]);
    }

    #[test]
    fn test_relative_fees_compare_numerically() {
        let mut orders = vec![
            order("a", "1", OrderType::Relative, "0.1%"),
            order("b", "1", OrderType::Relative, "0.05%"),
        ];
        sort_orders(&mut orders, SortKey::Fee, SortDirection::Ascending);
        assert_eq!(orders[0].fee, "0.05%");
        assert_eq!(orders[1].fee, "0.1%");
    }

    #[test]
    fn test_malformed_relative_fee_compares_equal() {
        let bad = order("a", "1", OrderType::Relative, "abc%");
        let leading = order("b", "1", OrderType::Relative, "%0.2");
        let missing = order("c", "1", OrderType::Relative, "0.2");
        let good = order("d", "1", OrderType::Relative, "0.1%");
        assert_eq!(compare_fee(&bad, &good), Ordering::Equal);
        assert_eq!(compare_fee(&good, &bad), Ordering::Equal);
        assert_eq!(compare_fee(&leading, &good), Ordering::Equal);
        assert_eq!(compare_fee(&missing, &good), Ordering::Equal);

        let mut orders = vec![bad.clone(), good.clone()];
        sort_orders(&mut orders, SortKey::Fee, SortDirection::Ascending);
        assert_eq!(orders, vec![bad, good]);
    }

    #[test]
    fn test_malformed_fees_never_panic() {
        let fees = ["abc%", "0.3%", "%", "0.1%", "x", "0.2%", "abc%", "0.05%"];
        let mut orders: Vec<OrderRecord> = (0..64)
            .map(|i| order("cp", &i.to_string(), OrderType::Relative, fees[i % fees.len()]))
            .collect();
        sort_orders(&mut orders, SortKey::Fee, SortDirection::Ascending);
        assert_eq!(orders.len(), 64);
    }

    #[test]
    fn test_absolute_fees_compare_numerically() {
        let a = order("a", "1", OrderType::Absolute, "250");
        let b = order("b", "1", OrderType::Absolute, "1000");
        let junk = order("c", "1", OrderType::Absolute, "n/a");
        assert_eq!(compare_fee(&a, &b), Ordering::Less);
        assert_eq!(compare_fee(&junk, &a), Ordering::Equal);
    }

    #[test]
    fn test_other_type_sits_between_relative_and_absolute() {
        let rel = order("a", "1", OrderType::Relative, "0.1%");
        let other = order("b", "1", OrderType::Other("swreloffer".into()), "0.0001");
        let abs = order("c", "1", OrderType::Absolute, "1");
        assert_eq!(compare_fee(&rel, &other), Ordering::Less);
        assert_eq!(compare_fee(&other, &abs), Ordering::Less);
        assert_eq!(compare_fee(&other, &rel), Ordering::Greater);
    }

    #[test]
    fn test_counterparty_tie_break_is_numeric() {
        let mut orders = vec![
            order("alice", "10", OrderType::Absolute, "1"),
            order("alice", "2", OrderType::Absolute, "1"),
            order("aaron", "5", OrderType::Absolute, "1"),
        ];
        sort_orders(&mut orders, SortKey::Counterparty, SortDirection::Ascending);
        assert_eq!(ids(&orders), vec!["aaron_5", "alice_2", "alice_10"]);
    }

    #[test]
    fn test_type_sorts_lexicographically() {
        let mut orders = vec![
            order("a", "1", OrderType::Relative, "0.1%"),
            order("b", "1", OrderType::Absolute, "1"),
            order("c", "1", OrderType::Other("absoffer".into()), "1"),
        ];
        sort_orders(&mut orders, SortKey::Type, SortDirection::Ascending);
        assert_eq!(ids(&orders), vec!["c_1", "b_1", "a_1"]);
    }

    #[test]
    fn test_numeric_keys_reverse_exactly() {
        for key in [
            SortKey::MinimumSize,
            SortKey::MaximumSize,
            SortKey::MinerFeeContribution,
            SortKey::BondValue,
        ] {
            let mut asc = sized();
            let mut desc = sized();
            sort_orders(&mut asc, key, SortDirection::Ascending);
            sort_orders(&mut desc, key, SortDirection::Descending);
            desc.reverse();
            assert_eq!(ids(&asc), ids(&desc), "key {key}");
        }

        let mut asc = sized();
        sort_orders(&mut asc, SortKey::MinimumSize, SortDirection::Ascending);
        assert_eq!(ids(&asc), vec!["cp1_1", "cp3_3", "cp2_2", "cp0_0", "cp4_4"]);
    }

    #[test]
    fn test_unsorted_keeps_input_order() {
        let mut orders = sized();
        sort_orders(&mut orders, SortKey::BondValue, SortDirection::Unsorted);
        assert_eq!(ids(&orders), ids(&sized()));
    }

    #[test]
    fn test_sort_toggle_cycles() {
        let mut state = SortState::default();
        assert_eq!(state.key, SortKey::MinimumSize);
        assert_eq!(state.direction, SortDirection::Ascending);

        state.select(SortKey::MinimumSize);
        assert_eq!(state.direction, SortDirection::Descending);
        state.select(SortKey::MinimumSize);
        assert_eq!(state.direction, SortDirection::Unsorted);
        state.select(SortKey::MinimumSize);
        assert_eq!(state.direction, SortDirection::Ascending);

        state.select(SortKey::MinimumSize);
        state.select(SortKey::Fee);
        assert_eq!(state.key, SortKey::Fee);
        assert_eq!(state.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("MINIMUM_SIZE".parse::<SortKey>().unwrap(), SortKey::MinimumSize);
        assert_eq!("minerFeeContribution".parse::<SortKey>().unwrap(), SortKey::MinerFeeContribution);
        assert_eq!("fee".parse::<SortKey>().unwrap(), SortKey::Fee);
        assert!("price".parse::<SortKey>().is_err());
    }
}
