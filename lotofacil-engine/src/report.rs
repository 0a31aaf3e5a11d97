use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use lotofacil_db::models::DrawRecord;
use lotofacil_db::source::DrawSource;

use crate::companions::{find_most_frequent_companions, CompanionProfile, MAX_ANALYZED};
use crate::error::{degrade, ReportError};
use crate::frequency::{count_number_frequencies, NumberFrequency};
use crate::gaps::{calculate_average_gap, GapStat};
use crate::heuristic::{predict_next_combinations, seeded_rng, Combination, DEFAULT_COMBINATIONS};
use crate::trained::{train_and_predict_combinations, ModelConfig, TrainedPredictions};

/// Rapport complet transmis à l'API. Les noms de champs font partie du contrat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub frequency_stats: Vec<NumberFrequency>,
    pub companion_stats: Vec<CompanionProfile>,
    pub last_result: Option<DrawRecord>,
    pub average_gap_stats: Vec<GapStat>,
    pub simple_predictions: Vec<Combination>,
    pub trained_predictions: TrainedPredictions,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub companion_limit: usize,
    pub heuristic_count: usize,
    pub model: ModelConfig,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            companion_limit: MAX_ANALYZED,
            heuristic_count: DEFAULT_COMBINATIONS,
            model: ModelConfig::default(),
        }
    }
}

/// Tirage au numéro de concours le plus élevé (le premier rencontré à égalité).
pub fn latest_draw(draws: &[DrawRecord]) -> Option<&DrawRecord> {
    let mut latest: Option<&DrawRecord> = None;
    for draw in draws {
        let contest = draw.contest_number.unwrap_or(0);
        if latest.map_or(true, |l| contest > l.contest_number.unwrap_or(0)) {
            latest = Some(draw);
        }
    }
    latest
}

/// Enchaîne toutes les étapes sur un historique déjà chargé.
pub fn assemble_report(draws: &[DrawRecord], settings: &ReportSettings, rng: &mut StdRng) -> Report {
    let frequency_stats = count_number_frequencies(draws);
    let companion_stats = degrade(
        "companions",
        find_most_frequent_companions(draws, &frequency_stats, settings.companion_limit),
    );
    let average_gap_stats = calculate_average_gap(draws);
    let simple_predictions = predict_next_combinations(
        &frequency_stats,
        &companion_stats,
        &average_gap_stats,
        settings.heuristic_count,
        rng,
    );
    let trained_predictions = train_and_predict_combinations(draws, &settings.model);

    Report {
        frequency_stats,
        companion_stats,
        last_result: latest_draw(draws).cloned(),
        average_gap_stats,
        simple_predictions,
        trained_predictions,
    }
}

pub fn generate_report(
    source: &dyn DrawSource,
    settings: &ReportSettings,
    rng: &mut StdRng,
) -> Result<Report, ReportError> {
    let draws = source.fetch_draws().map_err(ReportError::Source)?;
    tracing::info!(draws = draws.len(), "historique chargé");
    if draws.is_empty() {
        return Err(ReportError::NoData);
    }
    Ok(assemble_report(&draws, settings, rng))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportBody {
    Report(Box<Report>),
    Error { error: String },
}

/// Enveloppe de réponse : 200 avec le rapport, 500 avec un message d'erreur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ReportBody,
}

impl ReportResponse {
    pub fn success(report: Report) -> Self {
        Self { status_code: 200, body: ReportBody::Report(Box::new(report)) }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { status_code: 500, body: ReportBody::Error { error: message.into() } }
    }

    pub fn report(&self) -> Option<&Report> {
        match &self.body {
            ReportBody::Report(report) => Some(&**report),
            ReportBody::Error { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.report().is_some()
    }
}

/// Point d'entrée de haut niveau : ne panique pas et ne propage aucune erreur.
pub fn run_report(source: &dyn DrawSource, settings: &ReportSettings, seed: Option<u64>) -> ReportResponse {
    let mut rng = seeded_rng(seed);
    match generate_report(source, settings, &mut rng) {
        Ok(report) => ReportResponse::success(report),
        Err(e) => {
            tracing::error!(error = %e, "génération du rapport impossible");
            ReportResponse::failure(e.to_string())
        }
    }
}
