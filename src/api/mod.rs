mod chart;
mod choropleth;
mod config;
mod dashboard;
mod format;
mod grouped_bar;
mod line;
mod single_bar;

pub use chart::{Chart, ChartInstance, ChartRenderSummary, HoverDatum, MarkLayout, MarkSet};
pub use choropleth::{ChoroplethChart, ChoroplethLayout, DEFAULT_MAP_METRIC, Region};
pub use config::ChartConfig;
pub use dashboard::{Dashboard, FilterChange};
pub use format::{format_grouped, metric_display_name};
pub use grouped_bar::{GroupedBar, GroupedBarChart, GroupedBarLayout};
pub use line::{LineChart, LineLayout, TrendMark, point_key};
pub use single_bar::{MetricBar, SingleBarChart, SingleBarLayout};
