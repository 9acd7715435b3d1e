//! Tree-ensemble classifier loaded from a JSON artifact
//!
//! Class probabilities are the mean of each tree's normalized leaf
//! distribution. A single-tree ensemble behaves as a plain decision tree.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::tree::Tree;
use super::{argmax, Classifier};

/// Classifier model errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("Expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Tree {0} did not reach a leaf")]
    Traversal(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Supported artifact format version.
pub const MODEL_VERSION: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeEnsemble {
    /// Model format version
    pub version: i32,

    /// Trained column names, in trained order
    pub feature_names: Vec<String>,

    /// Number of output classes
    pub n_classes: usize,

    /// Trees in the ensemble
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn new(feature_names: Vec<String>, n_classes: usize, trees: Vec<Tree>) -> Self {
        Self {
            version: MODEL_VERSION,
            feature_names,
            n_classes,
            trees,
        }
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != MODEL_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.feature_names.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Model declares no feature columns".to_string(),
            ));
        }

        if self.n_classes == 0 {
            return Err(ModelError::ValidationFailed(
                "Model declares no classes".to_string(),
            ));
        }

        if self.trees.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Model has no trees".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len(), self.n_classes)
                .map_err(|e| {
                    ModelError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
                })?;
        }

        Ok(())
    }

    /// Parse and validate a model from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ModelError> {
        let model: TreeEnsemble = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Load model from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Save model as pretty-printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Blake3 hash of the compact JSON form, hex encoded.
    ///
    /// Every field is a struct field or a `Vec`, so serialization order is
    /// fixed and the hash does not depend on how the file was formatted.
    pub fn fingerprint(&self) -> Result<String, ModelError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::depth).max().unwrap_or(0)
    }
}

impl Classifier for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.feature_names.len() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_names.len(),
                got: row.len(),
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for (i, tree) in self.trees.iter().enumerate() {
            let dist = tree
                .class_distribution(row)
                .ok_or(ModelError::Traversal(i))?;
            for (acc, p) in proba.iter_mut().zip(dist) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        Ok(proba)
    }

    // `predict` is the argmax of `predict_proba` here, so one walk serves both.
    fn predict_with_proba(&self, row: &[f64]) -> Result<(usize, Vec<f64>), ModelError> {
        let proba = self.predict_proba(row)?;
        Ok((argmax(&proba), proba))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tree::Node;
    use crate::features::FEATURE_COLUMNS;

    fn columns() -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn two_tree_model() -> TreeEnsemble {
        let by_height = Tree::new(vec![
            Node::internal(0, 2, 80.0, 1, 2),
            Node::leaf(1, vec![0.0, 4.0, 0.0]),
            Node::leaf(2, vec![2.0, 0.0, 2.0]),
        ]);
        let by_age = Tree::new(vec![
            Node::internal(0, 0, 24.0, 1, 2),
            Node::leaf(1, vec![0.0, 1.0, 0.0]),
            Node::leaf(2, vec![0.0, 0.0, 1.0]),
        ]);
        TreeEnsemble::new(columns(), 3, vec![by_height, by_age])
    }

    #[test]
    fn test_predict_proba_averages_trees() {
        let model = two_tree_model();
        let proba = model.predict_proba(&[30.0, 0.0, 90.0]).unwrap();
        assert_eq!(proba, vec![0.25, 0.0, 0.75]);
        assert_eq!(model.predict(&[30.0, 0.0, 90.0]).unwrap(), 2);
        assert_eq!(model.predict(&[12.0, 1.0, 70.0]).unwrap(), 1);
    }

    #[test]
    fn test_wrong_width_rejected() {
        let model = two_tree_model();
        assert!(matches!(
            model.predict_proba(&[1.0, 2.0]),
            Err(ModelError::FeatureCount { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn test_validation() {
        assert!(two_tree_model().validate().is_ok());

        let mut model = two_tree_model();
        model.version = 2;
        assert!(model.validate().is_err());

        let mut model = two_tree_model();
        model.n_classes = 4;
        assert!(model.validate().is_err());

        let mut model = two_tree_model();
        model.trees.clear();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let original = two_tree_model();
        original.save_json(&path).unwrap();
        let restored = TreeEnsemble::load_json(&path).unwrap();

        assert_eq!(original, restored);
        assert_eq!(
            original.fingerprint().unwrap(),
            restored.fingerprint().unwrap()
        );
    }

    #[test]
    fn test_fingerprint_ignores_file_formatting() {
        let model = two_tree_model();
        let compact = serde_json::to_string(&model).unwrap();
        let pretty = serde_json::to_string_pretty(&model).unwrap();

        let from_compact = TreeEnsemble::from_json_str(&compact).unwrap();
        let from_pretty = TreeEnsemble::from_json_str(&pretty).unwrap();
        let fingerprint = from_compact.fingerprint().unwrap();
        assert_eq!(fingerprint, from_pretty.fingerprint().unwrap());
        assert_eq!(fingerprint.len(), 64);

        let mut other = two_tree_model();
        other.trees.pop();
        assert_ne!(other.fingerprint().unwrap(), fingerprint);
    }

    #[test]
    fn test_predict_with_proba_matches_separate_calls() {
        let model = two_tree_model();
        for row in [[30.0, 0.0, 90.0], [12.0, 1.0, 70.0], [24.0, 0.0, 80.0]] {
            let (class, proba) = model.predict_with_proba(&row).unwrap();
            assert_eq!(class, model.predict(&row).unwrap());
            assert_eq!(proba, model.predict_proba(&row).unwrap());
        }
    }

    #[test]
    fn test_accepts_feature_alias() {
        let json = r#"{
            "version": 1,
            "feature_names": ["Umur (bulan)", "Jenis Kelamin", "Tinggi Badan (cm)"],
            "n_classes": 2,
            "trees": [{"nodes": [
                {"id": 0, "feature": 0, "threshold": 6.5, "left": 1, "right": 2, "value": null},
                {"id": 1, "feature": -1, "threshold": 0.0, "left": -1, "right": -1, "value": [1, 0]},
                {"id": 2, "feature": -1, "threshold": 0.0, "left": -1, "right": -1, "value": [0, 1]}
            ]}]
        }"#;
        let model = TreeEnsemble::from_json_str(json).unwrap();
        assert_eq!(model.predict(&[3.0, 0.0, 55.0]).unwrap(), 0);
        assert_eq!(model.predict(&[7.0, 0.0, 55.0]).unwrap(), 1);
        assert_eq!(model.max_depth(), 2);
    }
}
