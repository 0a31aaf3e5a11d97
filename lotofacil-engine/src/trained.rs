//! Combinaisons « entraînées ».
//!
//! Chaque ligne de la matrice est un tirage (ses 15 numéros en entiers) et
//! toutes les lignes portent la même étiquette. Les classifieurs n'apprennent
//! donc rien d'utile : les combinaisons produites sont les premières lignes du
//! jeu de test, c'est-à-dire des tirages passés, réordonnées. Ce comportement
//! est reproduit tel quel ; ce n'est pas une prévision.

use ndarray::{Array2, Axis};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use lotofacil_db::models::DrawRecord;

use crate::classifiers::{Classifier, DecisionTreeClassifier, KNeighborsClassifier};
use crate::error::{degrade, AnalysisError};
use crate::heuristic::Combination;

/// Étiquette unique attribuée à chaque tirage.
const PLACEHOLDER_LABEL: u32 = 1;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub test_fraction: f64,
    pub seed: u64,
    pub knn_k: usize,
    pub max_predictions: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            knn_k: 3,
            max_predictions: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainedPredictions {
    #[serde(rename = "DecisionTree")]
    pub decision_tree: Vec<Combination>,
    #[serde(rename = "KNN")]
    pub knn: Vec<Combination>,
}

#[derive(Debug)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Vec<u32>,
}

/// Une ligne par tirage possédant des dezenas, dans l'ordre de l'historique.
pub fn build_feature_matrix(draws: &[DrawRecord]) -> Result<Array2<f64>, AnalysisError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for draw in draws {
        let Some(dezenas) = &draw.dezenas else {
            continue;
        };
        let row = dezenas
            .iter()
            .map(|d| {
                d.parse::<u32>()
                    .map(f64::from)
                    .map_err(|_| AnalysisError::InvalidNumber(d.clone()))
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    let Some(width) = rows.first().map(Vec::len) else {
        return Err(AnalysisError::InsufficientData { needed: 1, got: 0 });
    };
    for (i, row) in rows.iter().enumerate() {
        if row.len() != width {
            return Err(AnalysisError::RaggedFeatures { row: i, expected: width, got: row.len() });
        }
    }

    let n_rows = rows.len();
    Array2::from_shape_vec((n_rows, width), rows.into_iter().flatten().collect())
        .map_err(|e| AnalysisError::Model(e.to_string()))
}

/// Mélange les indices avec une graine fixe ; la taille du test est arrondie
/// au supérieur. Il faut au moins une ligne de chaque côté.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &[u32],
    test_fraction: f64,
    seed: u64,
) -> Result<Split, AnalysisError> {
    let n = x.nrows();
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(AnalysisError::InsufficientData { needed: 2, got: n });
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(Split {
        x_train: x.select(Axis(0), train_idx),
        x_test: x.select(Axis(0), test_idx),
        y_train: train_idx.iter().map(|&i| y[i]).collect(),
    })
}

fn row_to_combination(row: ndarray::ArrayView1<f64>) -> Combination {
    let mut combination: Combination = row.iter().map(|&v| format!("{:02}", v as u32)).collect();
    combination.sort();
    combination
}

/// Entraîne le modèle puis retourne les lignes de test prédites, réinterprétées
/// comme combinaisons. L'étiquette prédite elle-même n'est pas utilisée.
fn predict_with(
    model: &mut dyn Classifier,
    split: &Split,
    max_predictions: usize,
) -> Result<Vec<Combination>, AnalysisError> {
    model.fit(&split.x_train, &split.y_train)?;

    let head = split.x_test.nrows().min(max_predictions);
    let x_head = split.x_test.slice(ndarray::s![..head, ..]).to_owned();
    let predictions = model.predict(&x_head)?;
    tracing::debug!(model = model.name(), predicted = predictions.len(), "prédictions calculées");

    Ok((0..predictions.len())
        .map(|i| row_to_combination(x_head.row(i)))
        .collect())
}

pub fn train_and_predict_combinations(draws: &[DrawRecord], config: &ModelConfig) -> TrainedPredictions {
    let split = build_feature_matrix(draws).and_then(|x| {
        let y = vec![PLACEHOLDER_LABEL; x.nrows()];
        train_test_split(&x, &y, config.test_fraction, config.seed)
    });
    let split = match split {
        Ok(split) => split,
        Err(e) => {
            tracing::error!(error = %e, "préparation des données d'entraînement impossible");
            return TrainedPredictions::default();
        }
    };
    tracing::info!(
        train = split.x_train.nrows(),
        test = split.x_test.nrows(),
        "jeu d'entraînement prêt"
    );

    let mut tree = DecisionTreeClassifier::new();
    let mut knn = KNeighborsClassifier::new(config.knn_k);

    TrainedPredictions {
        decision_tree: degrade("DecisionTree", predict_with(&mut tree, &split, config.max_predictions)),
        knn: degrade("KNN", predict_with(&mut knn, &split, config.max_predictions)),
    }
}
