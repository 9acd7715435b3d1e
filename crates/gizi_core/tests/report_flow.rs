//! Report tests over the bundled reference dataset.

use gizi_core::report::{self, ReportOptions};
use gizi_core::{AppContext, ArtifactPaths};
use std::path::PathBuf;

fn artifact(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..").join(rel)
}

fn bundled_context() -> AppContext {
    let paths = ArtifactPaths {
        model: artifact("model/gizi_model.json"),
        label_encoders: artifact("model/label_encoders.json"),
        dataset: artifact("data/data_balita.csv"),
    };
    AppContext::load(&paths).expect("bundled artifacts load")
}

#[test]
fn test_evaluation_is_consistent_with_dataset() {
    let ctx = bundled_context();
    let report = report::build_report(&ctx, ReportOptions::default()).unwrap();
    let rows = report.descriptive.row_count;

    assert_eq!(rows, 40);
    assert!((0.0..=1.0).contains(&report.evaluation.accuracy));
    assert_eq!(report.evaluation.classification.total_support(), rows);
    assert_eq!(report.evaluation.confusion.total(), rows);
    assert_eq!(report.evaluation.roc_curves.len(), 4);
    for curve in &report.evaluation.roc_curves {
        if let Some(auc) = curve.auc {
            assert!((0.0..=1.0).contains(&auc));
        }
    }
}

#[test]
fn test_descriptive_totals() {
    let ctx = bundled_context();
    let report = report::build_report(&ctx, ReportOptions::default()).unwrap();
    let d = &report.descriptive;

    assert_eq!(d.preview.len(), 5);
    assert_eq!(d.status_distribution.iter().map(|s| s.count).sum::<usize>(), 40);
    assert_eq!(d.sex_status_counts.iter().map(|c| c.count).sum::<usize>(), 40);
    for histogram in &d.histograms {
        assert_eq!(histogram.bins.iter().map(|b| b.count).sum::<usize>(), 40);
    }
    let age = &d.summaries[0];
    assert_eq!(age.min, 0.0);
    assert_eq!(age.max, 60.0);
}

#[test]
fn test_unknown_dataset_label_fails_report() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("data.csv");
    std::fs::write(
        &csv,
        "age_months,sex,height_cm,status\n12,laki-laki,75.0,gizi lebih\n",
    )
    .unwrap();

    let ctx = bundled_context().with_dataset_path(&csv);
    assert!(report::build_report(&ctx, ReportOptions::default()).is_err());
}
