//! # obwatch-view
//!
//! Order book aggregation and presentation engine for a JoinMarket
//! ob-watcher. Takes the raw, unordered offer snapshot and derives the table a
//! user sees: searched, sorted, highlighted and paginated. Refreshing the
//! snapshot from the watcher goes through a coordinator that never lets an
//! overlapping or torn-down refresh overwrite newer data.
//!
//! ## Pipeline
//!
//! | Step | Module | Input → Output |
//! |------|--------|----------------|
//! | Search | [`filter`] | orders + query → matching orders |
//! | Sort | [`sort`] | matching orders + column/direction → ordered orders |
//! | Highlight | [`highlight`] | ordered orders + own nickname → flagged rows |
//! | Paginate | [`pagination`] | rows + page → one page, clamped |
//! | Assemble | [`view`] | all of the above + counterparty counts |
//! | Refresh | [`refresh`] | [`OrderSource`] → atomically replaced snapshot |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use obwatch_view::{Config, ObwatchApi, OrderbookSession, SortKey};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let api = ObwatchApi::new(&config)?;
//!     let mut session = OrderbookSession::new(Arc::new(api), &config).with_identity("J5myNick");
//!
//!     session.open().await;
//!     session.set_search_text("reloffer");
//!     session.select_sort(SortKey::Fee);
//!     session.set_highlight_enabled(true);
//!
//!     let view = session.view();
//!     println!("{}", view.view.summary());
//!     for row in &view.view.rows {
//!         println!("{} {} {}", row.key, row.order.fee, row.highlighted);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod filter;
pub mod highlight;
pub mod models;
pub mod obwatch;
pub mod pagination;
pub mod refresh;
pub mod session;
pub mod sort;
pub mod utils;
pub mod view;

pub use config::Config;
pub use models::{OrderRecord, OrderRow, OrderType, RowKey};
pub use obwatch::ObwatchApi;
pub use pagination::{paginate, Page};
pub use refresh::{
    CancellationToken, OrderSource, RefreshCoordinator, RefreshError, RefreshOutcome,
    RefreshStatus,
};
pub use session::{OrderbookSession, SessionView};
pub use sort::{SortDirection, SortKey, SortState};
pub use view::{assemble, OrderbookView, ViewState};
