use std::collections::BTreeMap;

use ndarray::{Array2, ArrayView1};

use super::{check_training_set, majority_label, Classifier};
use crate::error::AnalysisError;

#[derive(Debug)]
enum TreeNode {
    Leaf { label: u32 },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Arbre CART (impureté de Gini), sans élagage par défaut. Toutes les
/// caractéristiques sont évaluées à chaque nœud, le résultat est déterministe.
#[derive(Debug, Default)]
pub struct DecisionTreeClassifier {
    max_depth: Option<usize>,
    root: Option<TreeNode>,
}

impl DecisionTreeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth: Some(max_depth), root: None }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map(walk).unwrap_or(0)
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &str {
        "DecisionTree"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &[u32]) -> Result<(), AnalysisError> {
        check_training_set(x, y)?;
        let rows: Vec<ArrayView1<f64>> = x.outer_iter().collect();
        let indices: Vec<usize> = (0..rows.len()).collect();
        self.root = Some(build_tree(&rows, y, &indices, self.max_depth));
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u32>, AnalysisError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| AnalysisError::Model("arbre non entraîné".into()))?;
        Ok(x.outer_iter().map(|row| predict_tree(root, row)).collect())
    }
}

fn gini_impurity<I: IntoIterator<Item = u32>>(labels: I) -> f64 {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    let mut n = 0usize;
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
        n += 1;
    }
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.values().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

fn build_tree(
    rows: &[ArrayView1<f64>],
    labels: &[u32],
    indices: &[usize],
    max_depth: Option<usize>,
) -> TreeNode {
    let leaf = || TreeNode::Leaf {
        label: majority_label(indices.iter().map(|&i| labels[i])).unwrap_or_default(),
    };

    if indices.len() < 2 || max_depth == Some(0) {
        return leaf();
    }

    // Nœud pur
    let first = labels[indices[0]];
    if indices.iter().all(|&i| labels[i] == first) {
        return leaf();
    }

    let parent_gini = gini_impurity(indices.iter().map(|&i| labels[i]));
    let n = indices.len() as f64;
    let n_features = rows[indices[0]].len();

    let mut best: Option<(f64, usize, f64)> = None;

    for feat_idx in 0..n_features {
        let mut values: Vec<f64> = indices.iter().map(|&i| rows[i][feat_idx]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) =
                indices.iter().partition(|&&i| rows[i][feat_idx] <= threshold);

            let weighted = (left.len() as f64 / n) * gini_impurity(left.iter().map(|&i| labels[i]))
                + (right.len() as f64 / n) * gini_impurity(right.iter().map(|&i| labels[i]));

            if best.map_or(true, |(g, _, _)| weighted < g) {
                best = Some((weighted, feat_idx, threshold));
            }
        }
    }

    let Some((best_gini, feature_idx, threshold)) = best else {
        return leaf();
    };
    if best_gini >= parent_gini {
        return leaf();
    }

    let (left, right): (Vec<usize>, Vec<usize>) =
        indices.iter().partition(|&&i| rows[i][feature_idx] <= threshold);

    let next_depth = max_depth.map(|d| d - 1);
    TreeNode::Split {
        feature_idx,
        threshold,
        left: Box::new(build_tree(rows, labels, &left, next_depth)),
        right: Box::new(build_tree(rows, labels, &right, next_depth)),
    }
}

fn predict_tree(node: &TreeNode, features: ArrayView1<f64>) -> u32 {
    match node {
        TreeNode::Leaf { label } => *label,
        TreeNode::Split { feature_idx, threshold, left, right } => {
            if features[*feature_idx] <= *threshold {
                predict_tree(left, features)
            } else {
                predict_tree(right, features)
            }
        }
    }
}
