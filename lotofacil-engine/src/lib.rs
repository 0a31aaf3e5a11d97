//! Statistiques descriptives et combinaisons candidates sur l'historique
//! Lotofácil (15 numéros tirés parmi 01-25).

pub mod classifiers;
pub mod companions;
pub mod error;
pub mod frequency;
pub mod gaps;
pub mod heuristic;
pub mod report;
pub mod trained;

use lotofacil_db::models::{DrawRecord, DRAW_SIZE, UNIVERSE_SIZE};

/// Historique synthétique : le concours `i + 1` contient 15 numéros consécutifs
/// (modulo 25) à partir d'un décalage qui varie d'un tirage à l'autre.
pub fn make_test_draws(n: usize) -> Vec<DrawRecord> {
    (0..n)
        .map(|i| {
            let start = (i * 7) % UNIVERSE_SIZE as usize;
            let numbers: Vec<u8> = (0..DRAW_SIZE)
                .map(|j| ((start + j) % UNIVERSE_SIZE as usize) as u8 + 1)
                .collect();
            DrawRecord::new(i as u32 + 1, &numbers)
        })
        .collect()
}
