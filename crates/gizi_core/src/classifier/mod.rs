//! Classifier abstraction and the tree-ensemble implementation
//!
//! The rest of the crate only talks to [`Classifier`], so the prediction and
//! report flows run unchanged against a stub in tests.
//!
//! # Usage
//!
//! ```rust,no_run
//! use gizi_core::classifier::{Classifier, TreeEnsemble};
//!
//! let model = TreeEnsemble::load_json("model/gizi_model.json").unwrap();
//! let class_index = model.predict(&[24.0, 0.0, 85.0]).unwrap();
//! ```

pub mod model;
pub mod tree;

pub use model::{ModelError, TreeEnsemble, MODEL_VERSION};
pub use tree::{Node, Tree};

/// A fitted multi-class classifier over fixed-width `f64` rows.
///
/// Implementations must be deterministic: the same row always yields the
/// same probabilities.
pub trait Classifier: Send + Sync {
    /// Trained column names, in the order rows must follow.
    fn feature_names(&self) -> &[String];

    /// Number of output classes.
    fn n_classes(&self) -> usize;

    /// Class probabilities for one row, `n_classes()` long.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;

    /// Most probable class index. The lowest index wins ties.
    fn predict(&self, row: &[f64]) -> Result<usize, ModelError> {
        let proba = self.predict_proba(row)?;
        Ok(argmax(&proba))
    }

    /// Class index and probabilities for one row. The class always agrees
    /// with [`Classifier::predict`]; implementations whose `predict` is the
    /// argmax of `predict_proba` can override this to score the row once.
    fn predict_with_proba(&self, row: &[f64]) -> Result<(usize, Vec<f64>), ModelError> {
        Ok((self.predict(row)?, self.predict_proba(row)?))
    }

    /// Class index per row, through [`Classifier::predict`].
    fn predict_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, ModelError> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    fn predict_proba_batch(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        rows.iter().map(|row| self.predict_proba(row)).collect()
    }
}

/// Index of the first maximum; 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
