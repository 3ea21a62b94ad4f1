use std::time::Duration;

use statchart::core::{
    ChartKind, Dataset, GeometryFeature, RawRecord, RowFilter, RowNormalizer, Viewport,
};
use statchart::interaction::SharedTooltip;
use statchart::render::{Attributes, ElementKind, RecordingSurface};
use statchart::{
    Chart, ChartConfig, ChoroplethChart, ChoroplethLayout, Dashboard, FilterChange,
    GroupedBarChart, GroupedBarLayout, LineChart, LineLayout, SingleBarChart, SingleBarLayout,
};
use statchart::api::point_key;

fn record(year: &str, jurisdiction: &str, metric: &str, value: &str) -> RawRecord {
    RawRecord::new()
        .with_field("YEAR", year)
        .with_field("JURISDICTION", jurisdiction)
        .with_field("METRIC", metric)
        .with_field("Sum(FINES)", value)
}

fn fines() -> Dataset {
    Dataset::from_records(
        &RowNormalizer::default(),
        &[
            record("2023", "NSW", "Speeding", "1200"),
            record("2023", "VIC", "Speeding", "800"),
            record("2023", "NSW", "Phone", "300"),
            record("2024", "NSW", "Speeding", "900"),
            record("2024", "VIC", "Seatbelt", "150"),
        ],
    )
}

fn bar_chart(tooltip: &SharedTooltip) -> SingleBarChart {
    SingleBarChart::with_defaults("fines", SingleBarLayout::new(fines()), tooltip.clone())
        .expect("bar chart")
}

fn line_chart(tooltip: &SharedTooltip) -> LineChart {
    LineChart::with_defaults("trend", LineLayout::new(fines()), tooltip.clone())
        .expect("line chart")
}

fn keys(surface: &RecordingSurface) -> Vec<String> {
    surface
        .elements()
        .iter()
        .map(|element| element.key.clone())
        .collect()
}

#[test]
fn single_bar_defaults_to_first_year() {
    let tooltip = SharedTooltip::new();
    let mut chart = bar_chart(&tooltip);
    let mut surface = RecordingSurface::new();

    let summary = chart
        .render(&mut surface, &RowFilter::all())
        .expect("render");
    chart.settle(&mut surface).expect("settle");

    assert_eq!(chart.filter().year, Some(2023));
    assert_eq!(summary.diff.entered, 2);
    let mut drawn = keys(&surface);
    drawn.sort();
    assert_eq!(drawn, ["Phone", "Speeding"]);

    let speeding = surface.element_by_key("Speeding").expect("bar");
    let phone = surface.element_by_key("Phone").expect("bar");
    let left = chart.plot_area().left;
    assert_eq!(speeding.attributes.number("x"), Some(left));
    assert!(
        speeding.attributes.number("width").expect("width")
            > phone.attributes.number("width").expect("width")
    );
}

#[test]
fn hover_round_trip_restores_the_element() {
    let tooltip = SharedTooltip::new();
    let mut chart = bar_chart(&tooltip);
    let mut surface = RecordingSurface::new();
    chart
        .render(&mut surface, &RowFilter::all())
        .expect("render");
    chart.settle(&mut surface).expect("settle");
    let before = surface
        .element_by_key("Phone")
        .expect("bar")
        .attributes
        .clone();

    chart
        .pointer_enter(&mut surface, "Phone", (100.0, 50.0))
        .expect("enter");
    {
        let state = tooltip.state();
        assert!(state.visible);
        assert_eq!((state.x, state.y), (115.0, 22.0));
        assert_eq!(state.content.title, "Phone");
        assert_eq!(state.content.lines, ["Fines: 300"]);
    }
    assert_eq!(keys(&surface).last().map(String::as_str), Some("Phone"));
    assert!(surface.element_by_key("Phone").expect("bar").attributes.get("stroke").is_some());

    chart
        .pointer_move(&mut surface, (120.0, 60.0))
        .expect("move");
    assert_eq!((tooltip.state().x, tooltip.state().y), (135.0, 32.0));

    chart.pointer_leave(&mut surface).expect("leave");
    assert!(!tooltip.is_visible());
    assert_eq!(tooltip.owner(), None);
    assert_eq!(surface.element_by_key("Phone").expect("bar").attributes, before);
}

#[test]
fn hover_during_enter_does_not_stall_the_transition() {
    let tooltip = SharedTooltip::new();
    let mut chart = bar_chart(&tooltip);
    let mut surface = RecordingSurface::new();
    chart
        .render(&mut surface, &RowFilter::all())
        .expect("render");
    chart
        .tick(&mut surface, Duration::from_millis(100))
        .expect("tick");

    chart
        .pointer_enter(&mut surface, "Speeding", (10.0, 10.0))
        .expect("enter");
    chart.pointer_leave(&mut surface).expect("leave");
    chart.settle(&mut surface).expect("settle");

    let element = chart.engine().element("Speeding").expect("bar");
    assert_eq!(element.displayed(), element.target());
}

#[test]
fn another_chart_taking_the_tooltip_reverts_the_highlight() {
    let tooltip = SharedTooltip::new();
    let mut bars = bar_chart(&tooltip);
    let mut trend = line_chart(&tooltip);
    let mut bar_surface = RecordingSurface::new();
    let mut trend_surface = RecordingSurface::new();
    bars.render(&mut bar_surface, &RowFilter::all())
        .expect("render bars");
    trend
        .render(&mut trend_surface, &RowFilter::all())
        .expect("render trend");
    bars.settle(&mut bar_surface).expect("settle");
    trend.settle(&mut trend_surface).expect("settle");

    bars.pointer_enter(&mut bar_surface, "Speeding", (0.0, 0.0))
        .expect("enter bar");
    trend
        .pointer_enter(&mut trend_surface, &point_key(2023), (0.0, 0.0))
        .expect("enter point");

    assert_eq!(tooltip.owner().map(|owner| owner.chart_id), Some("trend".to_owned()));
    assert!(bars.sync_hover(&mut bar_surface).expect("sync"));
    assert!(!bars.engine().element("Speeding").expect("bar").is_highlighted());

    bars.pointer_leave(&mut bar_surface).expect("leave bars");
    assert!(tooltip.is_visible());
}

#[test]
fn redraw_resets_hover_and_highlight() {
    let tooltip = SharedTooltip::new();
    let mut chart = bar_chart(&tooltip);
    let mut surface = RecordingSurface::new();
    chart
        .render(&mut surface, &RowFilter::all())
        .expect("render");
    chart
        .pointer_enter(&mut surface, "Speeding", (0.0, 0.0))
        .expect("enter");

    chart
        .render(&mut surface, &RowFilter::all().with_year(2024))
        .expect("redraw");

    assert!(!tooltip.is_visible());
    assert_eq!(chart.hover().hovered_key(), None);
    assert!(chart.engine().elements().all(|element| !element.is_highlighted()));
}

#[test]
fn year_without_data_draws_nothing() {
    let tooltip = SharedTooltip::new();
    let mut chart = bar_chart(&tooltip);
    let mut surface = RecordingSurface::new();
    chart
        .render(&mut surface, &RowFilter::all())
        .expect("render");

    let summary = chart
        .render(&mut surface, &RowFilter::all().with_year(1999))
        .expect("empty render");
    chart.settle(&mut surface).expect("settle");

    assert_eq!(summary.diff.exited, 2);
    assert!(surface.is_empty());
    assert!(chart.scales().is_none());
}

#[test]
fn line_chart_draws_path_and_points() {
    let tooltip = SharedTooltip::new();
    let mut chart = line_chart(&tooltip);
    let mut surface = RecordingSurface::new();
    chart
        .render(&mut surface, &RowFilter::all().with_metric("Speeding"))
        .expect("render");
    chart.settle(&mut surface).expect("settle");

    let path = surface.element_by_key("line").expect("line");
    assert_eq!(path.kind, ElementKind::Path);
    let points = path
        .attributes
        .get("points")
        .and_then(|value| value.as_points())
        .expect("vertices");
    assert_eq!(points.len(), 2);
    assert!(points[0].0 < points[1].0);

    let point = surface.element_by_key(&point_key(2024)).expect("point");
    assert_eq!(point.attributes.number("r"), Some(6.0));

    chart
        .pointer_enter(&mut surface, "line", (0.0, 0.0))
        .expect("enter");
    assert!(!tooltip.is_visible());
}

#[test]
fn grouped_bars_fill_missing_combinations() {
    let tooltip = SharedTooltip::new();
    let mut chart =
        GroupedBarChart::with_defaults("drugs", GroupedBarLayout::new(fines()), tooltip.clone())
            .expect("chart");
    let mut surface = RecordingSurface::new();
    chart
        .render(&mut surface, &RowFilter::all())
        .expect("render");
    chart.settle(&mut surface).expect("settle");

    let mut drawn = keys(&surface);
    drawn.sort();
    assert_eq!(drawn, ["NSW|Phone", "NSW|Speeding", "VIC|Phone", "VIC|Speeding"]);
    let missing = surface.element_by_key("VIC|Phone").expect("cell");
    assert_eq!(missing.attributes.number("height"), Some(0.0));

    chart
        .pointer_enter(&mut surface, "NSW|Speeding", (0.0, 0.0))
        .expect("enter");
    assert_eq!(tooltip.state().content.lines, ["1,200 detections"]);
}

#[test]
fn choropleth_counts_unmatched_regions() {
    let tooltip = SharedTooltip::new();
    let features = vec![
        GeometryFeature::default().with_property("STATE_NAME", "New South Wales"),
        GeometryFeature::default().with_property("STATE_NAME", "Victoria"),
        GeometryFeature::default().with_property("STATE_NAME", "Tasmania"),
    ];
    let mut chart = ChoroplethChart::with_defaults(
        "map",
        ChoroplethLayout::new(fines(), features),
        tooltip.clone(),
    )
    .expect("chart");
    let mut surface = RecordingSurface::new();

    let summary = chart
        .render(&mut surface, &RowFilter::all())
        .expect("render");
    chart.settle(&mut surface).expect("settle");

    assert_eq!(chart.filter().metric.as_deref(), Some("Phone"));
    assert_eq!(summary.unresolved, 2);
    assert_eq!(surface.len(), 3);

    chart
        .pointer_enter(&mut surface, "Tasmania", (0.0, 0.0))
        .expect("enter");
    assert_eq!(tooltip.state().content.lines, ["No data"]);

    chart
        .pointer_enter(&mut surface, "New South Wales", (0.0, 0.0))
        .expect("enter");
    assert_eq!(tooltip.state().content.title, "New South Wales");
    assert_eq!(tooltip.state().content.lines, ["Phone: 300"]);
}

#[test]
fn dashboard_routes_filters_to_the_active_chart() {
    let mut dashboard: Dashboard<RecordingSurface> = Dashboard::new();
    let tooltip = dashboard.tooltip();
    assert!(tooltip.same_as(&dashboard.tooltip()));

    dashboard.add_chart(Box::new(bar_chart(&tooltip)), RecordingSurface::new());
    dashboard.add_chart(Box::new(line_chart(&tooltip)), RecordingSurface::new());
    assert!(dashboard.apply_filter(&FilterChange::year(2024)).is_err());

    dashboard.activate(ChartKind::SingleBar).expect("activate");
    let summary = dashboard
        .apply_filter(&FilterChange::year(2024))
        .expect("filter");
    dashboard.settle().expect("settle");
    assert_eq!((summary.diff.entered, summary.diff.exited), (1, 1));
    assert_eq!(
        dashboard
            .chart(ChartKind::SingleBar)
            .expect("chart")
            .filter()
            .year,
        Some(2024)
    );

    dashboard
        .pointer_enter(ChartKind::SingleBar, "Speeding", (0.0, 0.0))
        .expect("hover");
    assert!(tooltip.is_visible());

    dashboard.activate(ChartKind::Line).expect("activate line");
    dashboard
        .apply_filter(&FilterChange::metric("Speeding"))
        .expect("metric");
    dashboard.settle().expect("settle");

    let line_surface = dashboard.surface(ChartKind::Line).expect("surface");
    assert_eq!(line_surface.len(), 3);
    assert!(dashboard.activate(ChartKind::Choropleth).is_err());
}

fn hover_dashboard() -> Dashboard<RecordingSurface> {
    let mut dashboard: Dashboard<RecordingSurface> = Dashboard::new();
    let tooltip = dashboard.tooltip();
    dashboard.add_chart(Box::new(bar_chart(&tooltip)), RecordingSurface::new());
    dashboard.add_chart(Box::new(line_chart(&tooltip)), RecordingSurface::new());
    dashboard.activate(ChartKind::Line).expect("activate line");
    dashboard.activate(ChartKind::SingleBar).expect("activate bars");
    dashboard.settle().expect("settle");
    dashboard
}

fn bar_attributes(dashboard: &Dashboard<RecordingSurface>) -> Attributes {
    dashboard
        .surface(ChartKind::SingleBar)
        .expect("surface")
        .element_by_key("Speeding")
        .expect("bar")
        .attributes
        .clone()
}

#[test]
fn switching_charts_hides_the_tooltip_and_the_old_highlight() {
    let mut dashboard = hover_dashboard();
    let tooltip = dashboard.tooltip();
    let before = bar_attributes(&dashboard);

    dashboard
        .pointer_enter(ChartKind::SingleBar, "Speeding", (0.0, 0.0))
        .expect("hover");
    assert!(tooltip.is_visible());
    assert_ne!(bar_attributes(&dashboard), before);

    dashboard.activate(ChartKind::Line).expect("activate line");
    dashboard.settle().expect("settle");

    assert!(!tooltip.is_visible());
    assert_eq!(tooltip.owner(), None);
    assert_eq!(bar_attributes(&dashboard), before);
}

#[test]
fn only_one_chart_keeps_a_highlight() {
    let mut dashboard = hover_dashboard();
    let tooltip = dashboard.tooltip();
    let before = bar_attributes(&dashboard);

    dashboard
        .pointer_enter(ChartKind::SingleBar, "Speeding", (0.0, 0.0))
        .expect("hover bar");
    dashboard
        .pointer_enter(ChartKind::Line, &point_key(2023), (0.0, 0.0))
        .expect("hover point");

    assert_eq!(tooltip.owner().map(|owner| owner.chart_id), Some("trend".to_owned()));
    assert_eq!(bar_attributes(&dashboard), before);
}

#[test]
fn config_round_trips_through_json() {
    let config = ChartConfig::for_kind(ChartKind::GroupedBar);
    let json = config.to_json_pretty().expect("serialize");
    let restored = ChartConfig::from_json_str(&json).expect("parse");
    assert_eq!(restored, config);

    let minimal =
        ChartConfig::from_json_str(r#"{ "viewport": { "width": 640, "height": 480 } }"#)
            .expect("defaults fill in");
    assert_eq!(minimal.viewport, Viewport::new(640, 480));
    assert_eq!(minimal.transitions, ChartConfig::default().transitions);

    let zero = r#"{ "viewport": { "width": 0, "height": 480 } }"#;
    assert!(ChartConfig::from_json_str(zero).is_err());
}
