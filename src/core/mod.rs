pub mod aggregate;
pub mod candidates;
pub mod color;
pub mod dataset;
pub mod geo;
pub mod normalize;
pub mod primitives;
pub mod scale;
pub mod scale_resolver;
pub mod types;
pub mod vocabulary;

pub use aggregate::{
    GroupBy, GroupedGrid, GroupedSeries, RowFilter, aggregate, aggregate_filtered, complete_grid,
    grand_total,
};
pub use candidates::{
    CandidateChain, CandidateSource, Provenance, Resolved, non_empty_trimmed,
    resolve_by_candidates,
};
pub use color::{
    Color, Interpolator, NO_DATA, OrdinalColorScale, Palette, SequentialColorScale,
};
pub use dataset::Dataset;
pub use geo::{GeoKeyResolver, GeoLookup, GeoMatch, GeometryFeature};
pub use normalize::{NormalizeReport, NormalizerConfig, RowNormalizer, RowPolicy};
pub use scale::{BandPadding, BandScale, LinearScale, LogScale, NumericScale, PointScale};
pub use scale_resolver::{
    CategoryAxis, ChartKind, ColorScale, MIN_LINEAR_EXTENT, MIN_LOG_EXTENT, ScaleSet,
    resolve_scales,
};
pub use types::{
    AggregateRow, Dimension, DimensionValue, GroupKey, Margins, NormalizedRow, PlotArea,
    RawRecord, UNKNOWN_JURISDICTION, UNKNOWN_METRIC, Viewport,
};
pub use vocabulary::{JurisdictionStyle, JurisdictionVocabulary};
