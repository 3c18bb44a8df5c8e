//! Pure derivation of the displayed table from the order snapshot and the
//! user's view settings: filter → sort → highlight → paginate.

use serde::Serialize;
use std::collections::HashSet;

use crate::filter::filter_orders;
use crate::highlight::compute_highlights;
use crate::models::{OrderRecord, OrderRow};
use crate::pagination::paginate;
use crate::sort::SortState;

pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Everything the user can change about the table.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub search_text: String,
    pub sort: SortState,
    pub highlight_identity: Option<String>,
    pub highlight_enabled: bool,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            sort: SortState::default(),
            highlight_identity: None,
            highlight_enabled: false,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderbookView {
    pub rows: Vec<OrderRow>,
    /// Clamped page index actually shown.
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub order_count: usize,
    pub filtered_count: usize,
    pub counterparty_count: usize,
    pub filtered_counterparty_count: usize,
    pub is_filtered: bool,
}

impl OrderbookView {
    pub fn summary(&self) -> String {
        if self.is_filtered {
            format!(
                "Showing {} of {} orders from {} counterparties (filtered)",
                self.filtered_count, self.order_count, self.filtered_counterparty_count
            )
        } else {
            format!(
                "{} orders from {} counterparties",
                self.order_count, self.counterparty_count
            )
        }
    }

    pub fn highlighted_rows(&self) -> impl Iterator<Item = &OrderRow> {
        self.rows.iter().filter(|r| r.highlighted)
    }
}

pub fn counterparty_count<T: AsRef<OrderRecord>>(orders: &[T]) -> usize {
    orders
        .iter()
        .map(|o| o.as_ref().counterparty.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Derive the page to display. Deterministic in `(orders, state)`.
pub fn assemble(orders: &[OrderRecord], state: &ViewState) -> OrderbookView {
    let mut filtered = filter_orders(orders, &state.search_text);
    let filtered_count = filtered.len();
    let filtered_counterparty_count = counterparty_count(&filtered);

    state.sort.apply(&mut filtered);

    let highlights = compute_highlights(
        &filtered,
        state.highlight_identity.as_deref(),
        state.highlight_enabled,
    );
    let rows: Vec<OrderRow> = filtered
        .into_iter()
        .map(|o| {
            let highlighted = highlights.contains(&o.key());
            OrderRow::new(o.clone(), highlighted)
        })
        .collect();

    let page = paginate(rows, state.page, state.page_size);

    OrderbookView {
        rows: page.items,
        page: page.page_index,
        total_pages: page.total_pages,
        page_size: state.page_size.max(1),
        order_count: orders.len(),
        filtered_count,
        counterparty_count: counterparty_count(orders),
        filtered_counterparty_count,
        is_filtered: !state.search_text.is_empty(),
    }
}
