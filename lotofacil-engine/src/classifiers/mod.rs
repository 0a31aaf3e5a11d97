pub mod decision_tree;
pub mod knn;

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::error::AnalysisError;

pub use decision_tree::DecisionTreeClassifier;
pub use knn::KNeighborsClassifier;

/// Classifieur supervisé sur une matrice de caractéristiques (une ligne par échantillon).
pub trait Classifier {
    fn name(&self) -> &str;
    fn fit(&mut self, x: &Array2<f64>, y: &[u32]) -> Result<(), AnalysisError>;
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u32>, AnalysisError>;
}

pub(crate) fn check_training_set(x: &Array2<f64>, y: &[u32]) -> Result<(), AnalysisError> {
    if x.nrows() == 0 {
        return Err(AnalysisError::InsufficientData { needed: 1, got: 0 });
    }
    if x.nrows() != y.len() {
        return Err(AnalysisError::Model(format!(
            "{} lignes pour {} étiquettes",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}

/// Étiquette majoritaire ; à égalité, la plus petite.
pub(crate) fn majority_label<I: IntoIterator<Item = u32>>(labels: I) -> Option<u32> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut best: Option<(u32, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_label() {
        assert_eq!(majority_label([1, 2, 2, 3]), Some(2));
        assert_eq!(majority_label([3, 1, 3, 1]), Some(1));
        assert_eq!(majority_label(Vec::new()), None);
    }

    #[test]
    fn test_check_training_set_mismatch() {
        let x = Array2::<f64>::zeros((3, 2));
        assert!(check_training_set(&x, &[1, 1]).is_err());
        assert!(check_training_set(&x, &[1, 1, 1]).is_ok());
    }
}
