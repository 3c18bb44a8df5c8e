//! One display session of the orderbook: the order snapshot (behind the
//! refresh coordinator) plus the user's view settings.

use log::debug;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::models::OrderRecord;
use crate::refresh::{OrderSource, RefreshCoordinator, RefreshOutcome};
use crate::sort::SortKey;
use crate::view::{assemble, OrderbookView, ViewState};

/// Derived view plus refresh status, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub view: OrderbookView,
    pub loading: bool,
    /// False until the first refresh settled.
    pub initialized: bool,
    /// Banner text for the last failed refresh.
    pub error: Option<String>,
}

pub struct OrderbookSession {
    coordinator: Arc<RefreshCoordinator>,
    state: ViewState,
}

impl OrderbookSession {
    pub fn new(source: Arc<dyn OrderSource>, config: &Config) -> Self {
        Self {
            coordinator: Arc::new(RefreshCoordinator::new(
                source,
                config.min_loading_duration,
            )),
            state: ViewState::with_page_size(config.page_size),
        }
    }

    pub fn with_identity(mut self, identity: &str) -> Self {
        self.state.highlight_identity = Some(identity.to_string());
        self
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn orders(&self) -> Arc<Vec<OrderRecord>> {
        self.coordinator.orders()
    }

    /// Showing the orderbook triggers the initial refresh.
    pub fn open(&self) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        debug!("orderbook opened");
        self.refresh()
    }

    /// Hiding the orderbook drops any in-flight refresh.
    pub fn close(&self) {
        debug!("orderbook closed");
        self.coordinator.cancel();
    }

    /// Independent of `self`, so it can be spawned while view settings keep changing.
    pub fn refresh(&self) -> impl Future<Output = RefreshOutcome> + Send + 'static {
        let coordinator = Arc::clone(&self.coordinator);
        async move { coordinator.refresh().await }
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.state.search_text = text.to_string();
    }

    pub fn select_sort(&mut self, key: SortKey) {
        self.state.sort.select(key);
    }

    pub fn set_highlight_identity(&mut self, identity: Option<&str>) {
        self.state.highlight_identity = identity.map(String::from);
    }

    pub fn set_highlight_enabled(&mut self, enabled: bool) {
        self.state.highlight_enabled = enabled;
    }

    pub fn set_page(&mut self, page: usize) {
        self.state.page = page;
    }

    pub fn next_page(&mut self) {
        self.state.page = self.state.page.saturating_add(1);
    }

    pub fn previous_page(&mut self) {
        self.state.page = self.state.page.saturating_sub(1);
    }

    /// Assemble the current page and keep the clamped page index.
    pub fn view(&mut self) -> SessionView {
        let orders = self.coordinator.orders();
        let view = assemble(&orders, &self.state);
        self.state.page = view.page;
        SessionView {
            view,
            loading: self.coordinator.is_loading(),
            initialized: self.coordinator.is_initialized(),
            error: self.coordinator.last_error().map(|e| e.display_message()),
        }
    }
}
