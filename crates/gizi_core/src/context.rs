//! Immutable runtime context
//!
//! Artifacts are loaded once by [`AppContext::load`] and shared read-only by
//! every request. The reference dataset is loaded on first use and kept for
//! the life of the process.

use once_cell::sync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::classifier::{Classifier, TreeEnsemble};
use crate::dataset::ReferenceDataset;
use crate::errors::{GiziError, Result};
use crate::features::FEATURE_COLUMNS;
use crate::label::LabelTables;

/// Locations of the artifacts the dashboard consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub label_encoders: PathBuf,
    pub dataset: PathBuf,
}

pub struct AppContext {
    classifier: Arc<dyn Classifier>,
    labels: LabelTables,
    model_fingerprint: Option<String>,
    dataset_path: Option<PathBuf>,
    dataset: OnceCell<Arc<ReferenceDataset>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("feature_names", &self.classifier.feature_names())
            .field("n_classes", &self.classifier.n_classes())
            .field("labels", &self.labels)
            .field("model_fingerprint", &self.model_fingerprint)
            .field("dataset_path", &self.dataset_path)
            .field("dataset_loaded", &self.dataset.get().is_some())
            .finish()
    }
}

impl AppContext {
    /// Pair a classifier with the label tables it was trained with.
    ///
    /// Fails unless the classifier takes exactly the trained columns in
    /// trained order and has one class per status label.
    pub fn new(classifier: Arc<dyn Classifier>, labels: LabelTables) -> Result<Self> {
        check_columns(classifier.feature_names())?;

        if classifier.n_classes() != labels.status.len() {
            return Err(GiziError::ShapeMismatch {
                expected: format!("{} classes from the status table", labels.status.len()),
                got: format!("{} classes in the model", classifier.n_classes()),
            });
        }

        Ok(Self {
            classifier,
            labels,
            model_fingerprint: None,
            dataset_path: None,
            dataset: OnceCell::new(),
        })
    }

    /// Load the model and label tables; the dataset is read lazily.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        info!("Loading model from: {}", paths.model.display());
        let model = TreeEnsemble::load_json(&paths.model)?;
        let fingerprint = model.fingerprint()?;
        info!(
            "Model loaded: {} trees, {} classes, max depth {}, fingerprint {}",
            model.num_trees(),
            model.n_classes,
            model.max_depth(),
            fingerprint
        );

        info!(
            "Loading label encoders from: {}",
            paths.label_encoders.display()
        );
        let labels = LabelTables::load_json(&paths.label_encoders)?;
        info!(
            "Label tables loaded: sex {:?}, status {:?}",
            labels.sex.classes(),
            labels.status.classes()
        );

        let mut ctx = Self::new(Arc::new(model), labels)?;
        ctx.model_fingerprint = Some(fingerprint);
        ctx.dataset_path = Some(paths.dataset.clone());
        Ok(ctx)
    }

    /// Read the reference dataset from `path` on first use.
    pub fn with_dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(path.into());
        self
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelTables {
        &self.labels
    }

    pub fn model_fingerprint(&self) -> Option<&str> {
        self.model_fingerprint.as_deref()
    }

    /// The reference dataset, read from disk once and cached.
    pub fn dataset(&self) -> Result<Arc<ReferenceDataset>> {
        self.dataset
            .get_or_try_init(|| {
                let path = self.dataset_path.as_ref().ok_or_else(|| {
                    GiziError::Dataset("no reference dataset configured".to_string())
                })?;
                info!("Loading reference dataset from: {}", path.display());
                let dataset = ReferenceDataset::from_csv(path)?;
                info!("Reference dataset loaded: {} rows", dataset.len());
                Ok(Arc::new(dataset))
            })
            .map(Arc::clone)
    }
}

/// Fails unless `names` are exactly the trained columns in trained order.
pub(crate) fn check_columns(names: &[String]) -> Result<()> {
    let matches = names.len() == FEATURE_COLUMNS.len()
        && names.iter().zip(FEATURE_COLUMNS).all(|(a, b)| a == b);
    if matches {
        Ok(())
    } else {
        Err(GiziError::ShapeMismatch {
            expected: format!("{:?}", FEATURE_COLUMNS),
            got: format!("{:?}", names),
        })
    }
}
