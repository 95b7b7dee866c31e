//! 服务模块

pub mod dashboard;
pub mod locations;
pub mod parse;
pub mod query;
pub mod timeseries;
pub mod window;

pub use dashboard::{Dashboard, RefreshTarget};
pub use locations::LocationIndex;
pub use query::{QueryService, create_query_service};
pub use timeseries::TimeSeriesProjector;
pub use window::WindowAggregator;
