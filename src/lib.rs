//! statchart: a statistics-to-chart pipeline.
//!
//! Raw tabular records are normalized through fallback-chain column
//! resolution, aggregated exactly, projected through band/point/linear/log
//! scales, and drawn as keyed marks whose enter/update/exit transitions are
//! driven by an explicit clock. Rendering goes through the [`render::Surface`]
//! capability so the same charts run headless in tests or against a real
//! drawing backend.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod source;
pub mod telemetry;

pub use api::{
    Chart, ChartConfig, ChoroplethChart, ChoroplethLayout, Dashboard, FilterChange,
    GroupedBarChart, GroupedBarLayout, LineChart, LineLayout, SingleBarChart, SingleBarLayout,
};
pub use error::{ChartError, ChartResult};
