//! Single-record prediction flow: encode, predict, decode, explain.

use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::context::{check_columns, AppContext};
use crate::errors::Result;
use crate::features::{EncodedFeatures, FeatureRecord};
use crate::status::{explain, title_case, NutritionStatus};

/// Outcome of one prediction, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub record: FeatureRecord,
    pub encoded: EncodedFeatures,
    pub class_index: usize,
    /// Label exactly as stored in the status table.
    pub raw_label: String,
    /// Title-cased label shown to the user.
    pub label: String,
    /// `None` if the label is not one of the four known categories.
    pub status: Option<NutritionStatus>,
    pub explanation: &'static str,
    /// Probability of each class, in status-table order.
    pub probabilities: Vec<f64>,
}

/// Run the classifier on an encoded record.
///
/// The classifier must take exactly the trained columns in trained order.
pub fn predict(features: &EncodedFeatures, model: &dyn Classifier) -> Result<usize> {
    check_columns(model.feature_names())?;
    Ok(model.predict(&features.to_row())?)
}

/// Full flow for one submitted record.
pub fn run(ctx: &AppContext, record: &FeatureRecord) -> Result<Prediction> {
    let labels = ctx.labels();
    let encoded = record.encode(labels)?;
    debug!("Encoded features: {:?}", encoded.to_row());

    let model = ctx.classifier();
    check_columns(model.feature_names())?;
    let (class_index, probabilities) = model.predict_with_proba(&encoded.to_row())?;

    let raw_label = labels.status.decode(class_index)?.to_string();
    let label = title_case(&raw_label);
    let status = NutritionStatus::from_label(&label);
    let explanation = explain(&label);

    info!(
        "Predicted '{}' for age {} months, sex {}, height {} cm",
        label,
        record.age_months(),
        record.sex().raw_label(),
        record.height_cm()
    );

    Ok(Prediction {
        record: *record,
        encoded,
        class_index,
        raw_label,
        label,
        status,
        explanation,
        probabilities,
    })
}
