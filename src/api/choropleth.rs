use tracing::{debug, trace};

use crate::api::chart::{ChartInstance, HoverDatum, MarkLayout, MarkSet};
use crate::api::format::{format_grouped, metric_display_name};
use crate::core::{
    ChartKind, Color, Dataset, Dimension, DimensionValue, GeoKeyResolver, GeoLookup,
    GeometryFeature, GroupBy, JurisdictionVocabulary, NO_DATA, PlotArea, RowFilter,
    aggregate_filtered, resolve_scales,
};
use crate::error::ChartResult;
use crate::interaction::TooltipContent;
use crate::render::{Attributes, ElementKind, ElementSpec};

/// Metric the map shows when none is selected and the data carries it.
pub const DEFAULT_MAP_METRIC: &str = "Sum(FINES)";

const REGION_STROKE: Color = Color::rgb_u8(0x44, 0x44, 0x44);

/// One map region and the statistic matched to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub label: String,
    pub metric: String,
    /// `None` when no property of the feature matched the statistics table.
    pub value: Option<f64>,
    pub matched_property: Option<String>,
}

impl HoverDatum for Region {
    fn highlight(&self) -> Option<Attributes> {
        Some(
            Attributes::new()
                .with("stroke", Color::rgb(0.0, 0.0, 0.0))
                .with("stroke-width", 3.0),
        )
    }

    fn tooltip(&self) -> TooltipContent {
        let body = match self.value {
            Some(value) => format!(
                "{}: {}",
                metric_display_name(&self.metric),
                format_grouped(value)
            ),
            None => "No data".to_owned(),
        };
        TooltipContent::new(self.label.clone()).with_line(body)
    }
}

/// Regions colored by the selected metric's total for the selected year.
///
/// Statistics are keyed by jurisdiction; each feature is matched through the
/// resolver's property candidates (and the vocabulary, so codes and names
/// meet). Unmatched regions are drawn in the no-data color and counted.
#[derive(Debug, Clone)]
pub struct ChoroplethLayout {
    dataset: Dataset,
    features: Vec<GeometryFeature>,
    resolver: GeoKeyResolver,
}

pub type ChoroplethChart = ChartInstance<ChoroplethLayout>;

impl ChoroplethLayout {
    #[must_use]
    pub fn new(dataset: Dataset, features: Vec<GeometryFeature>) -> Self {
        Self {
            dataset,
            features,
            resolver: GeoKeyResolver::default()
                .with_vocabulary(JurisdictionVocabulary::australia()),
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: GeoKeyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn features(&self) -> &[GeometryFeature] {
        &self.features
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl MarkLayout for ChoroplethLayout {
    type Datum = Region;

    fn kind(&self) -> ChartKind {
        ChartKind::Choropleth
    }

    /// Defaults to the earliest year and to `Sum(FINES)` when present,
    /// otherwise the first metric.
    fn effective_filter(&self, filter: &RowFilter) -> RowFilter {
        let mut filter = filter.clone();
        if filter.year.is_none() {
            filter.year = self.dataset.years().first().copied();
        }
        if filter.metric.is_none() {
            let metrics = self.dataset.metrics();
            filter.metric = metrics
                .iter()
                .find(|metric| metric.as_str() == DEFAULT_MAP_METRIC)
                .or_else(|| metrics.first())
                .cloned();
        }
        filter
    }

    fn layout(&self, filter: &RowFilter, plot: PlotArea) -> ChartResult<MarkSet<Region>> {
        let rows = aggregate_filtered(
            self.dataset.rows(),
            filter,
            &GroupBy::single(Dimension::Jurisdiction),
        );
        let lookup = GeoLookup::from_aggregates(&rows);
        let metric = filter.metric.clone().unwrap_or_default();
        let scales = resolve_scales(ChartKind::Choropleth, &rows, plot, filter.metric.as_deref())?;

        let mut specs = Vec::with_capacity(self.features.len());
        let mut unresolved = 0;
        for (index, feature) in self.features.iter().enumerate() {
            let matched = self.resolver.resolve(feature, &lookup);
            let label = self.resolver.feature_label(feature);
            let key = self
                .resolver
                .feature_id(feature)
                .unwrap_or_else(|| format!("feature-{index}"));

            let fill = match (matched.value, &scales.color) {
                (Some(value), Some(color)) => color
                    .color_for(&DimensionValue::Text(label.clone()), value)
                    .unwrap_or(NO_DATA),
                _ => {
                    unresolved += 1;
                    NO_DATA
                }
            };

            let target = Attributes::new()
                .with("geometry", feature.shape.to_string())
                .with("fill", fill)
                .with("stroke", REGION_STROKE)
                .with("stroke-width", 1.2)
                .with("opacity", 1.0);
            let zero = target.clone().with("opacity", 0.0);
            specs.push(ElementSpec::new(
                key,
                ElementKind::Region,
                Region {
                    label,
                    metric: metric.clone(),
                    value: matched.value,
                    matched_property: matched.property,
                },
                target,
                zero,
            ));
        }

        if unresolved > 0 {
            debug!(unresolved, regions = specs.len(), "regions without data");
        }
        trace!(regions = specs.len(), stats = lookup.len(), "laid out choropleth");
        Ok(MarkSet {
            specs,
            scales: Some(scales),
            unresolved,
        })
    }
}
