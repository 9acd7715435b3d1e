//! Classification quality metrics
//!
//! Precision, recall and F1 are 0 where their denominator is 0. ROC curves
//! are one-vs-rest: for each class, that class is positive and every other
//! class negative, scored by the predicted probability of that class.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::errors::{GiziError, Result};

/// Fraction of predictions equal to the truth, in `[0, 1]`.
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> Result<f64> {
    check_lengths(y_true.len(), y_pred.len())?;
    if y_true.is_empty() {
        return Ok(0.0);
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

/// Row = true class, column = predicted class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn compute(y_true: &[usize], y_pred: &[usize], labels: &[String]) -> Result<Self> {
        check_lengths(y_true.len(), y_pred.len())?;
        let n = labels.len();
        let mut counts = vec![vec![0usize; n]; n];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            if t >= n || p >= n {
                return Err(GiziError::InvalidInput(format!(
                    "class index {} outside {} labels",
                    t.max(p),
                    n
                )));
            }
            counts[t][p] += 1;
        }
        Ok(Self {
            labels: labels.to_vec(),
            counts,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall, F1 and support plus averages.
///
/// Rows cover every class that occurs in either the truth or the
/// predictions, in class-index order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn compute(y_true: &[usize], y_pred: &[usize], labels: &[String]) -> Result<Self> {
        let matrix = ConfusionMatrix::compute(y_true, y_pred, labels)?;
        let present: BTreeSet<usize> = y_true.iter().chain(y_pred).copied().collect();

        let classes: Vec<ClassMetrics> = present
            .into_iter()
            .map(|class| {
                let tp = matrix.counts[class][class];
                let support: usize = matrix.counts[class].iter().sum();
                let predicted: usize = matrix.counts.iter().map(|row| row[class]).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                ClassMetrics {
                    label: labels[class].clone(),
                    precision,
                    recall,
                    f1: f1(precision, recall),
                    support,
                }
            })
            .collect();

        let total_support: usize = classes.iter().map(|c| c.support).sum();
        let n_classes = classes.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            label: "macro avg".to_string(),
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n_classes,
            support: total_support,
        };

        let weight = |value: fn(&ClassMetrics) -> f64| -> f64 {
            if total_support == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| value(c) * c.support as f64)
                .sum::<f64>()
                / total_support as f64
        };
        let weighted_avg = ClassMetrics {
            label: "weighted avg".to_string(),
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
            support: total_support,
        };

        Ok(Self {
            accuracy: accuracy(y_true, y_pred)?,
            classes,
            macro_avg,
            weighted_avg,
        })
    }

    pub fn total_support(&self) -> usize {
        self.classes.iter().map(|c| c.support).sum()
    }
}

/// One ROC operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    /// Score threshold; infinite for the leading `(0, 0)` point.
    #[serde(serialize_with = "serialize_threshold")]
    pub threshold: f64,
}

fn serialize_threshold<S: serde::Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        s.serialize_f64(*value)
    } else {
        s.serialize_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub label: String,
    pub points: Vec<RocPoint>,
    /// `None` when the class has no positives or no negatives.
    pub auc: Option<f64>,
}

impl RocCurve {
    /// ROC curve of binary `positives` scored by `scores`.
    ///
    /// Points are emitted at every distinct score, highest first, starting
    /// from `(0, 0)`.
    pub fn compute(label: impl Into<String>, positives: &[bool], scores: &[f64]) -> Result<Self> {
        check_lengths(positives.len(), scores.len())?;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let total_pos = positives.iter().filter(|p| **p).count();
        let total_neg = positives.len() - total_pos;

        let mut points = vec![RocPoint {
            fpr: 0.0,
            tpr: 0.0,
            threshold: f64::INFINITY,
        }];
        let (mut tp, mut fp) = (0usize, 0usize);
        for (pos, &idx) in order.iter().enumerate() {
            if positives[idx] {
                tp += 1;
            } else {
                fp += 1;
            }
            let last_of_score = order
                .get(pos + 1)
                .map_or(true, |&next| scores[next] != scores[idx]);
            if last_of_score {
                points.push(RocPoint {
                    fpr: ratio(fp, total_neg),
                    tpr: ratio(tp, total_pos),
                    threshold: scores[idx],
                });
            }
        }

        let auc = (total_pos > 0 && total_neg > 0).then(|| trapezoid_auc(&points));
        Ok(Self {
            label: label.into(),
            points,
            auc,
        })
    }

    /// One curve per class from a probability matrix.
    pub fn one_vs_rest(y_true: &[usize], proba: &[Vec<f64>], labels: &[String]) -> Result<Vec<Self>> {
        check_lengths(y_true.len(), proba.len())?;
        labels
            .iter()
            .enumerate()
            .map(|(class, label)| {
                let positives: Vec<bool> = y_true.iter().map(|&t| t == class).collect();
                let scores = proba
                    .iter()
                    .map(|row| {
                        row.get(class).copied().ok_or_else(|| {
                            GiziError::InvalidInput(format!(
                                "probability row has {} columns, need {}",
                                row.len(),
                                labels.len()
                            ))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()?;
                Self::compute(label.clone(), &positives, &scores)
            })
            .collect()
    }
}

/// Unweighted mean of the defined per-class AUCs.
pub fn macro_auc(curves: &[RocCurve]) -> Option<f64> {
    let defined: Vec<f64> = curves.iter().filter_map(|c| c.auc).collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

fn trapezoid_auc(points: &[RocPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum()
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn check_lengths(a: usize, b: usize) -> Result<()> {
    if a == b {
        Ok(())
    } else {
        Err(GiziError::ShapeMismatch {
            expected: format!("{a} rows"),
            got: format!("{b} rows"),
        })
    }
}
