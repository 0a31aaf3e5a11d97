use thiserror::Error;

/// Échec d'une étape d'analyse. Une étape en échec produit un résultat vide,
/// elle n'interrompt jamais le rapport.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("données insuffisantes : {needed} requis, {got} disponibles")]
    InsufficientData { needed: usize, got: usize },

    #[error("ligne {row} : {got} caractéristiques au lieu de {expected}")]
    RaggedFeatures { row: usize, expected: usize, got: usize },

    #[error("numéro invalide : {0:?}")]
    InvalidNumber(String),

    #[error("modèle : {0}")]
    Model(String),
}

/// Échec global de la génération du rapport.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("aucun tirage trouvé dans l'historique")]
    NoData,

    #[error("lecture de l'historique impossible : {0:#}")]
    Source(#[source] anyhow::Error),
}

/// Ramène une étape en échec à son résultat vide, en journalisant la cause.
pub fn degrade<T: Default>(stage: &str, result: Result<T, AnalysisError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(stage, error = %e, "étape dégradée en résultat vide");
            T::default()
        }
    }
}
