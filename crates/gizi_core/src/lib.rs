//! Child nutritional status prediction core
//!
//! Loads a pre-trained tree-ensemble classifier and its fitted label tables,
//! runs the encode → predict → decode → explain flow for a single record,
//! and builds the descriptive and evaluation report over the reference
//! dataset.

pub mod classifier;
pub mod context;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod label;
pub mod metrics;
pub mod predictor;
pub mod report;
pub mod status;

pub use classifier::{Classifier, ModelError, TreeEnsemble};
pub use context::{AppContext, ArtifactPaths};
pub use dataset::{DatasetRecord, ReferenceDataset};
pub use errors::{GiziError, Result};
pub use features::{EncodedFeatures, FeatureRecord, Sex, FEATURE_COLUMNS};
pub use label::{LabelTable, LabelTables};
pub use predictor::Prediction;
pub use report::{DataReport, ReportOptions};
pub use status::{explain, NutritionStatus, EXPLANATION_UNAVAILABLE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
