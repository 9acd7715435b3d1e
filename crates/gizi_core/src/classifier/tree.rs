//! Decision tree structures for ensemble classification
//!
//! Nodes live in a flat array with node 0 as the root. Traversal goes left
//! when `feature <= threshold`.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes:
/// - `feature_idx >= 0`: index into the feature row
/// - `left` and `right` point to child node indices
/// - `value` is `None`
///
/// For leaf nodes:
/// - `feature_idx == -1`
/// - `value` holds one weight per class
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node ID (for reference, not used in traversal)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    #[serde(rename = "feature_idx", alias = "feature")]
    pub feature_idx: i32,

    /// Split threshold
    pub threshold: f64,

    /// Per-class weights for leaf nodes
    pub value: Option<Vec<f64>>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(id: i32, feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            value: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(id: i32, class_weights: Vec<f64>) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            value: Some(class_weights),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx < 0 || self.value.is_some()
    }
}

/// A single classification tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Walk from the root to a leaf and return its class weights.
    ///
    /// The tree must have passed [`Tree::validate`] and the row must be at
    /// least as wide as the largest feature index.
    pub fn leaf_weights(&self, row: &[f64]) -> Option<&[f64]> {
        let mut idx = 0usize;

        // A validated tree reaches a leaf in at most `nodes.len()` steps.
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx)?;

            if let Some(value) = node.value.as_deref() {
                return Some(value);
            }

            let feature_value = *row.get(usize::try_from(node.feature_idx).ok()?)?;
            let next = if feature_value <= node.threshold {
                node.left
            } else {
                node.right
            };
            idx = usize::try_from(next).ok()?;
        }

        None
    }

    /// Normalized class distribution at the leaf reached by `row`.
    pub fn class_distribution(&self, row: &[f64]) -> Option<Vec<f64>> {
        let weights = self.leaf_weights(row)?;
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Some(vec![0.0; weights.len()]);
        }
        Some(weights.iter().map(|w| w / total).collect())
    }

    /// Number of levels on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        fn walk(tree: &Tree, idx: usize, level: usize) -> usize {
            match tree.nodes.get(idx) {
                Some(node) if !node.is_leaf() => {
                    let left = usize::try_from(node.left).map_or(level, |l| walk(tree, l, level + 1));
                    let right =
                        usize::try_from(node.right).map_or(level, |r| walk(tree, r, level + 1));
                    left.max(right)
                }
                Some(_) => level,
                None => level.saturating_sub(1),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(self, 0, 1)
        }
    }

    /// Validate tree structure against the model's feature and class counts.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                let Some(weights) = node.value.as_ref() else {
                    return Err(format!("Leaf node {i} has no class weights"));
                };
                if weights.len() != n_classes {
                    return Err(format!(
                        "Leaf node {} has {} class weights, expected {}",
                        i,
                        weights.len(),
                        n_classes
                    ));
                }
                if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(format!("Leaf node {i} has a negative or non-finite weight"));
                }
                continue;
            }

            // Children must point forward so traversal cannot cycle.
            for (side, child) in [("left", node.left), ("right", node.right)] {
                if child <= i as i32 || child as usize >= self.nodes.len() {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                return Err(format!(
                    "Internal node {} has invalid feature index: {}",
                    i, node.feature_idx
                ));
            }

            if !node.threshold.is_finite() {
                return Err(format!("Internal node {i} has a non-finite threshold"));
            }
        }

        Ok(())
    }
}
