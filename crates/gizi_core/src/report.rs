//! Model and data exploration report
//!
//! Everything here is a read-only pass over the reference dataset. The
//! evaluation half encodes the dataset with the same label tables as the
//! single-record prediction path before scoring it.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

use crate::classifier::Classifier;
use crate::context::{check_columns, AppContext};
use crate::dataset::{DatasetRecord, NumericColumn, ReferenceDataset};
use crate::errors::{GiziError, Result};
use crate::label::LabelTables;
use crate::metrics::{macro_auc, ClassificationReport, ConfusionMatrix, RocCurve};
use crate::status::title_case;

/// Upper bound for [`ReportOptions::histogram_bins`].
pub const MAX_HISTOGRAM_BINS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub preview_rows: usize,
    pub histogram_bins: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            histogram_bins: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedCount {
    pub sex: String,
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two rows.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveReport {
    pub row_count: usize,
    pub preview: Vec<DatasetRecord>,
    pub status_distribution: Vec<CategoryShare>,
    pub sex_status_counts: Vec<GroupedCount>,
    pub summaries: Vec<SummaryStats>,
    pub histograms: Vec<Histogram>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub row_count: usize,
    pub accuracy: f64,
    pub classification: ClassificationReport,
    pub confusion: ConfusionMatrix,
    pub roc_curves: Vec<RocCurve>,
    pub macro_auc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataReport {
    pub descriptive: DescriptiveReport,
    pub evaluation: EvaluationReport,
}

/// Build the full report from the context's cached dataset.
pub fn build_report(ctx: &AppContext, options: ReportOptions) -> Result<DataReport> {
    let dataset = ctx.dataset()?;
    let descriptive = describe(&dataset, options)?;
    let evaluation = evaluate(ctx.classifier(), ctx.labels(), &dataset)?;
    Ok(DataReport {
        descriptive,
        evaluation,
    })
}

/// Descriptive statistics and chart data.
pub fn describe(dataset: &ReferenceDataset, options: ReportOptions) -> Result<DescriptiveReport> {
    if !(1..=MAX_HISTOGRAM_BINS).contains(&options.histogram_bins) {
        return Err(GiziError::InvalidInput(format!(
            "histogram bins must be between 1 and {MAX_HISTOGRAM_BINS}, got {}",
            options.histogram_bins
        )));
    }

    let summaries = NumericColumn::ALL
        .into_iter()
        .map(|column| summarize(column.header(), &dataset.column(column)))
        .collect::<Result<Vec<_>>>()?;

    let histograms = NumericColumn::ALL
        .into_iter()
        .map(|column| histogram(column.header(), &dataset.column(column), options.histogram_bins))
        .collect();

    Ok(DescriptiveReport {
        row_count: dataset.len(),
        preview: dataset.head(options.preview_rows).to_vec(),
        status_distribution: status_distribution(dataset),
        sex_status_counts: sex_status_counts(dataset),
        summaries,
        histograms,
    })
}

/// Score the classifier against the dataset.
///
/// Classes come from [`Classifier::predict_batch`], the same decision the
/// single-record flow makes. Probabilities only feed the ROC curves.
pub fn evaluate(
    classifier: &dyn Classifier,
    labels: &LabelTables,
    dataset: &ReferenceDataset,
) -> Result<EvaluationReport> {
    check_columns(classifier.feature_names())?;
    let rows = dataset.feature_rows(labels)?;
    let y_true = dataset.status_codes(labels)?;

    let y_pred = classifier.predict_batch(&rows)?;
    let proba = classifier.predict_proba_batch(&rows)?;

    let class_labels: Vec<String> = labels
        .status
        .classes()
        .iter()
        .map(|c| title_case(c))
        .collect();

    let classification = ClassificationReport::compute(&y_true, &y_pred, &class_labels)?;
    let confusion = ConfusionMatrix::compute(&y_true, &y_pred, &class_labels)?;
    let roc_curves = RocCurve::one_vs_rest(&y_true, &proba, &class_labels)?;
    let macro_auc = macro_auc(&roc_curves);

    info!(
        "Evaluated {} rows: accuracy {:.4}, macro AUC {:?}",
        dataset.len(),
        classification.accuracy,
        macro_auc
    );

    Ok(EvaluationReport {
        row_count: dataset.len(),
        accuracy: classification.accuracy,
        classification,
        confusion,
        roc_curves,
        macro_auc,
    })
}

/// Status counts and percentages, most frequent first. Labels are
/// title-cased to match the evaluation tables.
pub fn status_distribution(dataset: &ReferenceDataset) -> Vec<CategoryShare> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in dataset.records() {
        *counts.entry(title_case(&record.status)).or_default() += 1;
    }

    let total = dataset.len().max(1) as f64;
    let mut shares: Vec<CategoryShare> = counts
        .into_iter()
        .map(|(label, count)| CategoryShare {
            label,
            count,
            percentage: count as f64 * 100.0 / total,
        })
        .collect();
    // BTreeMap order already breaks count ties by label.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// Row counts per (sex, status) pair, ordered by sex then status.
pub fn sex_status_counts(dataset: &ReferenceDataset) -> Vec<GroupedCount> {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
    for record in dataset.records() {
        *counts
            .entry((title_case(&record.sex), title_case(&record.status)))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((sex, status), count)| GroupedCount { sex, status, count })
        .collect()
}

/// Count, mean, sample std, min, quartiles and max of a column.
pub fn summarize(column: &str, values: &[f64]) -> Result<SummaryStats> {
    if values.is_empty() {
        return Err(GiziError::Dataset(format!("column '{column}' is empty")));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = (n > 1).then(|| {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        var.sqrt()
    });

    Ok(SummaryStats {
        column: column.to_string(),
        count: n,
        mean,
        std,
        min: sorted[0],
        q25: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q75: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

/// Linear-interpolation quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Equal-width histogram between the column's min and max. The last bin
/// is closed on both ends. `bins` is clamped to `1..=MAX_HISTOGRAM_BINS`.
pub fn histogram(column: &str, values: &[f64], bins: usize) -> Histogram {
    let bins = bins.clamp(1, MAX_HISTOGRAM_BINS);
    if values.is_empty() {
        return Histogram {
            column: column.to_string(),
            bins: Vec::new(),
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        column: column.to_string(),
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: lo + width * i as f64,
                upper: lo + width * (i + 1) as f64,
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelError;
    use crate::features::FEATURE_COLUMNS;
    use crate::label::{LabelTable, SEX_TABLE, STATUS_TABLE};

    fn record(age: f64, sex: &str, height: f64, status: &str) -> DatasetRecord {
        DatasetRecord {
            age_months: age,
            sex: sex.to_string(),
            height_cm: height,
            status: status.to_string(),
        }
    }

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::new(vec![
            record(0.0, "laki-laki", 44.0, "stunted"),
            record(12.0, "perempuan", 74.0, "normal"),
            record(24.0, "laki-laki", 86.0, "normal"),
            record(36.0, "perempuan", 80.0, "stunted"),
            record(48.0, "laki-laki", 110.0, "tinggi"),
        ])
    }

    #[test]
    fn test_status_distribution_ordering() {
        let shares = status_distribution(&dataset());
        let labels: Vec<&str> = shares.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Normal", "Stunted", "Tinggi"]);
        assert_eq!(shares[0].count, 2);
        assert!((shares[0].percentage - 40.0).abs() < 1e-9);
        let total: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sex_status_counts() {
        let counts = sex_status_counts(&dataset());
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 5);
        assert_eq!(
            counts[0],
            GroupedCount {
                sex: "Laki-Laki".to_string(),
                status: "Normal".to_string(),
                count: 1,
            }
        );
    }

    #[test]
    fn test_summarize_matches_linear_quantiles() {
        let stats = summarize("x", &[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q25, 1.75);
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.q75, 3.25);
        assert_eq!(stats.max, 4.0);
        let std = stats.std.unwrap();
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);

        assert_eq!(summarize("x", &[7.0]).unwrap().std, None);
        assert!(summarize("x", &[]).is_err());
    }

    #[test]
    fn test_histogram_covers_all_values() {
        let values = [0.0, 12.0, 24.0, 36.0, 48.0, 60.0];
        let hist = histogram("age", &values, 4);
        assert_eq!(hist.bins.len(), 4);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(hist.bins[3].upper, 60.0);
        assert_eq!(hist.bins[3].count, 2);
    }

    #[test]
    fn test_histogram_clamps_bin_count() {
        let hist = histogram("age", &[1.0, 2.0, 3.0], usize::MAX);
        assert_eq!(hist.bins.len(), MAX_HISTOGRAM_BINS);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn test_histogram_single_value() {
        let hist = histogram("h", &[5.0, 5.0], 3);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    /// Predicts from height alone: short is stunted, tall is tinggi.
    struct HeightRule {
        names: Vec<String>,
    }

    impl Classifier for HeightRule {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn n_classes(&self) -> usize {
            4
        }

        fn predict_proba(&self, row: &[f64]) -> std::result::Result<Vec<f64>, ModelError> {
            let class = match row[2] {
                h if h < 80.0 => 2,
                h if h > 100.0 => 3,
                _ => 0,
            };
            let mut proba = vec![0.0; 4];
            proba[class] = 1.0;
            Ok(proba)
        }
    }

    fn tables() -> LabelTables {
        LabelTables::new(
            LabelTable::new(
                SEX_TABLE,
                vec!["laki-laki".to_string(), "perempuan".to_string()],
            )
            .unwrap(),
            LabelTable::new(
                STATUS_TABLE,
                ["normal", "severely stunted", "stunted", "tinggi"]
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_evaluate_with_stub_classifier() {
        let model = HeightRule {
            names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        let report = evaluate(&model, &tables(), &dataset()).unwrap();

        assert_eq!(report.row_count, 5);
        assert!((report.accuracy - 0.6).abs() < 1e-12);
        assert_eq!(report.classification.total_support(), 5);
        assert_eq!(report.confusion.total(), 5);
        assert_eq!(report.roc_curves.len(), 4);

        let severe = &report.roc_curves[1];
        assert_eq!(severe.label, "Severely Stunted");
        assert_eq!(severe.auc, None);
        assert!(report.macro_auc.is_some());
    }

    /// Votes for class 1 even though class 0 is more probable.
    struct OverriddenVote {
        names: Vec<String>,
    }

    impl Classifier for OverriddenVote {
        fn feature_names(&self) -> &[String] {
            &self.names
        }

        fn n_classes(&self) -> usize {
            4
        }

        fn predict_proba(&self, _row: &[f64]) -> std::result::Result<Vec<f64>, ModelError> {
            Ok(vec![0.6, 0.4, 0.0, 0.0])
        }

        fn predict(&self, _row: &[f64]) -> std::result::Result<usize, ModelError> {
            Ok(1)
        }
    }

    #[test]
    fn test_evaluate_scores_classifier_predict() {
        let model = OverriddenVote {
            names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        let dataset = ReferenceDataset::new(vec![record(6.0, "laki-laki", 55.0, "severely stunted")]);
        let report = evaluate(&model, &tables(), &dataset).unwrap();

        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.confusion.counts[1][1], 1);
        assert_eq!(report.roc_curves.len(), 4);
    }

    #[test]
    fn test_evaluate_rejects_reordered_columns() {
        let model = HeightRule {
            names: ["Jenis Kelamin", "Umur (bulan)", "Tinggi Badan (cm)"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        };
        assert!(matches!(
            evaluate(&model, &tables(), &dataset()),
            Err(GiziError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_evaluate_rejects_unknown_label() {
        let model = HeightRule {
            names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        let dataset = ReferenceDataset::new(vec![record(6.0, "laki-laki", 60.0, "gizi buruk")]);
        assert!(matches!(
            evaluate(&model, &tables(), &dataset),
            Err(GiziError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_describe() {
        let report = describe(&dataset(), ReportOptions::default()).unwrap();
        assert_eq!(report.row_count, 5);
        assert_eq!(report.preview.len(), 5);
        assert_eq!(report.summaries.len(), 2);
        assert_eq!(report.histograms[0].bins.len(), 10);

        let zero_bins = ReportOptions {
            preview_rows: 5,
            histogram_bins: 0,
        };
        assert!(describe(&dataset(), zero_bins).is_err());
    }

    #[test]
    fn test_describe_caps_histogram_bins() {
        let at_cap = ReportOptions {
            preview_rows: 5,
            histogram_bins: MAX_HISTOGRAM_BINS,
        };
        let report = describe(&dataset(), at_cap).unwrap();
        assert_eq!(report.histograms[0].bins.len(), MAX_HISTOGRAM_BINS);

        for bins in [MAX_HISTOGRAM_BINS + 1, usize::MAX] {
            let options = ReportOptions {
                preview_rows: 5,
                histogram_bins: bins,
            };
            assert!(matches!(
                describe(&dataset(), options),
                Err(GiziError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_descriptive_labels_match_evaluation_labels() {
        let model = HeightRule {
            names: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };
        let evaluation = evaluate(&model, &tables(), &dataset()).unwrap();
        for share in status_distribution(&dataset()) {
            assert!(evaluation.confusion.labels.contains(&share.label));
        }
    }
}
