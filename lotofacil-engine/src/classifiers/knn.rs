use ndarray::{Array2, ArrayView1};

use super::{check_training_set, majority_label, Classifier};
use crate::error::AnalysisError;

/// K plus proches voisins, distance euclidienne, vote majoritaire.
pub struct KNeighborsClassifier {
    k: usize,
    train_x: Option<Array2<f64>>,
    train_y: Vec<u32>,
}

impl KNeighborsClassifier {
    pub fn new(k: usize) -> Self {
        Self { k, train_x: None, train_y: Vec::new() }
    }
}

fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

impl Classifier for KNeighborsClassifier {
    fn name(&self) -> &str {
        "KNN"
    }

    fn fit(&mut self, x: &Array2<f64>, y: &[u32]) -> Result<(), AnalysisError> {
        check_training_set(x, y)?;
        if self.k == 0 {
            return Err(AnalysisError::Model("k doit être strictement positif".into()));
        }
        self.train_x = Some(x.clone());
        self.train_y = y.to_vec();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u32>, AnalysisError> {
        let train_x = self
            .train_x
            .as_ref()
            .ok_or_else(|| AnalysisError::Model("KNN non entraîné".into()))?;
        if self.k > train_x.nrows() {
            return Err(AnalysisError::InsufficientData {
                needed: self.k,
                got: train_x.nrows(),
            });
        }

        let predictions = x
            .outer_iter()
            .map(|query| {
                let mut distances: Vec<(usize, f64)> = train_x
                    .outer_iter()
                    .enumerate()
                    .map(|(i, row)| (i, euclidean_distance(row, query)))
                    .collect();
                distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
                distances.truncate(self.k);
                majority_label(distances.iter().map(|&(i, _)| self.train_y[i])).unwrap_or_default()
            })
            .collect();

        Ok(predictions)
    }
}
