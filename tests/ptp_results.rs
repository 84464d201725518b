use std::fs;
use std::path::Path;

use radio_reduce::data::loader::{discover, load_results, ResultFileError};
use radio_reduce::data::model::{Measurement, Variant};
use radio_reduce::data::sample::{render_result_file, write_sample_results};
use radio_reduce::stats::report::Report;

fn write(dir: &Path, name: &str, slope: f64, slope_err: f64) {
    let m = Measurement {
        slope,
        slope_err,
        pearson: 0.5,
        pearson_err: 0.1,
        spearman: 0.25,
        spearman_err: 0.1,
    };
    fs::write(dir.join(name), render_result_file("x", Variant::Cb, 0, &m)).unwrap();
}

#[test]
fn discovery_matches_field_and_variant_exactly() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "a399results_cb_1.txt",
        "a399results_cb_0.txt",
        "a399results_rudnick_0.txt",
        "a399trailresults_cb_0.txt",
        "a399results_cb_0.log",
    ] {
        write(dir.path(), name, 1.0, 1.0);
    }

    let found = discover(dir.path(), "a399", Variant::Cb).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["a399results_cb_0.txt", "a399results_cb_1.txt"]);
}

#[test]
fn weighted_slopes_per_variant_and_total() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a399results_cb_0.txt", 1.0, 1.0);
    write(dir.path(), "a399results_cb_1.txt", 2.0, 1.0);
    write(dir.path(), "a399results_rudnick_0.txt", 4.0, 1.0);
    write(dir.path(), "a399results_rudnick_1.txt", 6.0, 1.0);

    let set = load_results(dir.path(), &["a399".to_string()]).unwrap();
    assert_eq!(set.len(), 4);

    let report = Report::build(&set);
    let uv = report.variants[0].fields[0].summary.unwrap();
    assert_eq!(report.variants[0].variant, Variant::Cb);
    assert!((uv.slope.value - 1.5).abs() < 1e-12);

    let total = report.total[0].summary.unwrap();
    assert_eq!(total.runs, 4);
    assert!((total.slope.value - 3.25).abs() < 1e-12);
    assert!((total.slope.error - 0.5).abs() < 1e-12);

    let text = report.to_string();
    assert!(text.starts_with("UV-Subtract:\nSlope A399: 1.5 +- "), "{text}");
    assert!(text.contains("\nRudnick:\nSlope A399: 5 +- "), "{text}");
    assert!(text.contains("\nTotal:\nSlope A399: 3.25 +- 0.5\n"), "{text}");
}

#[test]
fn malformed_file_aborts_collection() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bridgeresults_cb_0.txt", 1.0, 1.0);
    fs::write(dir.path().join("bridgeresults_cb_1.txt"), "only\nthree\nlines\n").unwrap();

    let err = load_results(dir.path(), &["bridge".to_string()]).unwrap_err();
    assert!(matches!(err, ResultFileError::TooShort { .. }));
    assert!(err.to_string().contains("bridgeresults_cb_1.txt"));
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_results(&dir.path().join("nope"), &["a401".to_string()]).unwrap_err();
    assert!(matches!(err, ResultFileError::Read { .. }));
}

#[test]
fn generated_sample_aggregates_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let fields: Vec<String> = ["a399", "a401", "bridge"].map(String::from).to_vec();
    let written = write_sample_results(dir.path(), &fields, 5, 7).unwrap();
    assert_eq!(written.len(), 3 * 2 * 5);

    let set = load_results(dir.path(), &fields).unwrap();
    assert_eq!(set.len(), written.len());

    let report = Report::build(&set);
    for entry in &report.total {
        let summary = entry.summary.expect("every field has runs");
        assert_eq!(summary.runs, 10);
        assert!(summary.slope.error > 0.0);
        assert!(summary.pearson.value > 0.5 && summary.pearson.value <= 1.0);
    }
}
