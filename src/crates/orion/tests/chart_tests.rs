//! Integration tests for chart synthesis with the bitmap renderer

use std::sync::Arc;

use orion::chart::{ChartPlan, Dataset, PlotData, PlottersRenderer};
use orion::{ChartError, ChartKind, ChartSpec, ChartSynthesizer};

const SALES: &str = "Mes,Ventas,Costos,Region\nene,10,7,norte\nfeb,12,8,sur\nmar,9,,norte\nabr,14,9,este\n";

fn synthesizer() -> ChartSynthesizer {
    ChartSynthesizer::new(Arc::new(PlottersRenderer::new(400, 240, None)))
}

fn sales() -> Dataset {
    Dataset::from_reader(SALES.as_bytes()).unwrap()
}

fn is_png(path: &std::path::Path) -> bool {
    std::fs::read(path)
        .map(|bytes| bytes.starts_with(b"\x89PNG"))
        .unwrap_or(false)
}

#[test]
fn test_bar_with_two_series() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("bar.png");
    let spec = ChartSpec::new(ChartKind::Bar)
        .with_x("Mes")
        .with_y(["ventas", "COSTOS"])
        .with_title("Ventas y costos");

    let artifact = synthesizer().render(&sales(), &spec, &output).unwrap();

    assert!(is_png(&artifact.path));
    match &artifact.plan.data {
        PlotData::Categorical { labels, series, .. } => {
            assert_eq!(series.len(), 2);
            assert!(series.iter().all(|s| s.points.len() == labels.len()));
        }
        other => panic!("unexpected plan: {:?}", other),
    }
}

#[test]
fn test_line_with_gap_renders() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("line.png");
    let spec = ChartSpec::new(ChartKind::Line).with_y(["costos"]);

    synthesizer().render(&sales(), &spec, &output).unwrap();
    assert!(is_png(&output));
}

#[test]
fn test_pie_counts_first_y_column() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("pie.png");
    let spec = ChartSpec::new(ChartKind::Pie).with_y(["region"]);

    let artifact = synthesizer().render(&sales(), &spec, &output).unwrap();

    assert!(is_png(&output));
    match artifact.plan.data {
        PlotData::Pie { slices, .. } => {
            let labels: Vec<_> = slices.iter().map(|s| s.label.as_str()).collect();
            assert_eq!(labels, vec!["norte", "sur", "este"]);
            assert_eq!(slices[0].percent_label(), "50.0%");
        }
        other => panic!("unexpected plan: {:?}", other),
    }
}

#[test]
fn test_missing_y_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("none.png");
    let spec = ChartSpec::new(ChartKind::Bar).with_x("mes").with_y(["ganancia"]);

    let err = synthesizer().render(&sales(), &spec, &output).unwrap_err();

    assert!(matches!(err, ChartError::ColumnNotFound(ref c) if c == "ganancia"));
    assert!(!output.exists());
}

#[test]
fn test_rerender_overwrites_same_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("same.png");
    std::fs::write(&output, b"old").unwrap();

    let spec = ChartSpec::new(ChartKind::Bar);
    let first = synthesizer().render(&sales(), &spec, &output).unwrap();
    let second = synthesizer().render(&sales(), &spec, &output).unwrap();

    assert!(is_png(&output));
    assert_eq!(first.plan, second.plan);
    assert_eq!(first.plan, ChartPlan::build(&sales(), &spec).unwrap());
}

#[tokio::test]
async fn test_render_file_on_blocking_pool() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("ventas.csv");
    std::fs::write(&csv, SALES).unwrap();
    let output = dir.path().join("out").join("chart.png");

    let artifact = synthesizer()
        .render_file(csv, ChartSpec::new(ChartKind::Line), output.clone())
        .await
        .unwrap();

    assert_eq!(artifact.path, output);
    assert!(is_png(&output));
}

#[tokio::test]
async fn test_malformed_csv_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("roto.csv");
    std::fs::write(&csv, "a,b\n1,2\n3,4,5\n").unwrap();

    let err = synthesizer()
        .render_file(csv, ChartSpec::default(), dir.path().join("x.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, ChartError::Csv(_)));
}
