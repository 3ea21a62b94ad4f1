use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;
use statchart::core::{
    ChartKind, Dataset, Dimension, GroupBy, LinearScale, NormalizedRow, PlotArea, RawRecord,
    RowFilter, RowNormalizer, aggregate, resolve_scales,
};
use statchart::interaction::SharedTooltip;
use statchart::render::{Attributes, ElementKind, ElementSpec, RecordingSurface, RenderDiffEngine};
use statchart::{SingleBarChart, SingleBarLayout};
use std::hint::black_box;
use std::time::Duration;

const JURISDICTIONS: [&str; 8] = ["NSW", "VIC", "QLD", "SA", "WA", "TAS", "NT", "ACT"];

fn plot() -> PlotArea {
    PlotArea {
        left: 150.0,
        top: 40.0,
        right: 770.0,
        bottom: 350.0,
    }
}

fn generated_rows(count: usize) -> Vec<NormalizedRow> {
    (0..count)
        .map(|i| {
            NormalizedRow::new(
                2008 + (i % 16) as i32,
                JURISDICTIONS[i % JURISDICTIONS.len()],
                format!("metric-{}", i % 12),
                Decimal::new((i as i64 * 37) % 100_000, 2),
            )
        })
        .collect()
}

fn bench_linear_scale_round_trip(c: &mut Criterion) {
    let scale = LinearScale::new((0.0, 10_000.0), (0.0, 1_920.0)).expect("valid scale");

    c.bench_function("linear_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale.map(black_box(4_321.123));
            let _ = scale.invert(px);
        })
    });
}

fn bench_normalize_10k(c: &mut Criterion) {
    let records: Vec<RawRecord> = (0..10_000)
        .map(|i| {
            RawRecord::new()
                .with_field("YEAR", (2008 + i % 16).to_string())
                .with_field("JURISDICTION", JURISDICTIONS[i % JURISDICTIONS.len()])
                .with_field("METRIC", format!("metric-{}", i % 12))
                .with_field("Sum(FINES)", format!("{},{:03}", i % 90 + 1, i % 1_000))
        })
        .collect();
    let normalizer = RowNormalizer::default();

    c.bench_function("normalize_10k", |b| {
        b.iter(|| {
            let _ = normalizer.normalize(black_box(&records));
        })
    });
}

fn bench_aggregate_100k(c: &mut Criterion) {
    let rows = generated_rows(100_000);
    let group_by =
        GroupBy::new(&[Dimension::Jurisdiction, Dimension::Metric]).expect("valid group by");

    c.bench_function("aggregate_100k", |b| {
        b.iter(|| {
            let grouped = aggregate(black_box(&rows), &group_by);
            let _ = resolve_scales(ChartKind::GroupedBar, &grouped, plot(), None)
                .expect("scales should resolve");
        })
    });
}

fn bench_render_diff_churn_2k(c: &mut Criterion) {
    let specs = |offset: usize| -> Vec<ElementSpec<usize>> {
        (offset..offset + 2_000)
            .map(|i| {
                ElementSpec::new(
                    format!("bar-{i}"),
                    ElementKind::Rect,
                    i,
                    Attributes::new().with("x", 0.0).with("width", i as f64),
                    Attributes::new().with("x", 0.0).with("width", 0.0),
                )
            })
            .collect()
    };

    c.bench_function("render_diff_churn_2k", |b| {
        b.iter(|| {
            let mut surface = RecordingSurface::new();
            let mut engine = RenderDiffEngine::default();
            engine.apply(&mut surface, specs(0)).expect("first draw");
            engine
                .tick(&mut surface, Duration::from_millis(200))
                .expect("tick");
            engine.apply(&mut surface, specs(500)).expect("second draw");
            engine.settle(&mut surface).expect("settle");
        })
    });
}

fn bench_single_bar_redraw(c: &mut Criterion) {
    let dataset = Dataset::from_rows(generated_rows(20_000));
    let mut chart = SingleBarChart::with_defaults(
        "fines",
        SingleBarLayout::new(dataset),
        SharedTooltip::new(),
    )
    .expect("chart init");
    let mut surface = RecordingSurface::new();
    let mut year = 2008;

    c.bench_function("single_bar_redraw", |b| {
        b.iter(|| {
            year = if year == 2023 { 2008 } else { year + 1 };
            chart
                .render(&mut surface, &RowFilter::all().with_year(year))
                .expect("render should succeed");
            chart.settle(&mut surface).expect("settle");
        })
    });
}

criterion_group!(
    benches,
    bench_linear_scale_round_trip,
    bench_normalize_10k,
    bench_aggregate_100k,
    bench_render_diff_churn_2k,
    bench_single_bar_redraw
);
criterion_main!(benches);
