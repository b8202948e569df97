pub mod series;
pub mod state;
pub mod time;

pub use series::{SeriesSpec, SERIES};
pub use state::{ChartData, ChartError, ChartState, Dataset, CHART_CANVAS_ID};
pub use time::{TimeUnit, TimestampParser};
