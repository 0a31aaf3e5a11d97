use std::collections::BTreeSet;

use rand::prelude::*;
use rand::rngs::StdRng;

use lotofacil_db::models::{format_dezena, parse_dezena, DRAW_SIZE, UNIVERSE_SIZE};

use crate::companions::CompanionProfile;
use crate::frequency::NumberFrequency;
use crate::gaps::GapStat;

/// Combinaison candidate : 15 dezenas distinctes, triées.
pub type Combination = Vec<String>;

pub const TOP_FREQUENT: usize = 10;
pub const TOP_LOWEST_GAP: usize = 5;
pub const DEFAULT_COMBINATIONS: usize = 10;

/// Graine pour la reproductibilité, sinon tirée du générateur du thread.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Union des 10 numéros les plus fréquents et des 5 plus petits écarts moyens.
pub fn seed_numbers(frequency: &[NumberFrequency], gaps: &[GapStat]) -> BTreeSet<u8> {
    let mut by_gap: Vec<&GapStat> = gaps.iter().collect();
    by_gap.sort_by(|a, b| a.avg_gap.partial_cmp(&b.avg_gap).unwrap_or(std::cmp::Ordering::Equal));

    frequency
        .iter()
        .take(TOP_FREQUENT)
        .map(|f| f.number.as_str())
        .chain(by_gap.iter().take(TOP_LOWEST_GAP).map(|g| g.number.as_str()))
        .filter_map(parse_dezena)
        .collect()
}

fn companions_of(number: u8, companions: &[CompanionProfile]) -> Vec<u8> {
    companions
        .iter()
        .find(|p| parse_dezena(&p.number) == Some(number))
        .map(|p| p.companion_numbers().collect())
        .unwrap_or_default()
}

/// Génère `count` combinaisons : numéros de départ, compagnons tirés au hasard
/// sans remise, puis complément uniforme sur 01-25 jusqu'à 15 numéros.
pub fn predict_next_combinations(
    frequency: &[NumberFrequency],
    companions: &[CompanionProfile],
    gaps: &[GapStat],
    count: usize,
    rng: &mut StdRng,
) -> Vec<Combination> {
    let seeds = seed_numbers(frequency, gaps);
    let mut combinations = Vec::with_capacity(count);

    for _ in 0..count {
        let mut combination: BTreeSet<u8> = seeds.clone();

        for &number in &seeds {
            let mut available = companions_of(number, companions);
            while combination.len() < DRAW_SIZE && !available.is_empty() {
                let idx = rng.random_range(0..available.len());
                combination.insert(available.remove(idx));
            }
        }

        while combination.len() < DRAW_SIZE {
            combination.insert(rng.random_range(1..=UNIVERSE_SIZE));
        }

        combinations.push(combination.into_iter().map(format_dezena).collect());
    }

    combinations
}
