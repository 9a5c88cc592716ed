//! View state behind the pages: what is shown, and the refresh logic that
//! keeps it current

pub mod chart_view;
pub mod live;
pub mod quote_view;

pub use chart_view::{ChartSnapshot, ChartView};
pub use live::{LiveKind, LiveRegistry, LiveSettings, LiveViews};
pub use quote_view::{DetailSnapshot, DetailView, WatchlistView};
