use serde::{Deserialize, Serialize};

use lotofacil_db::models::{format_dezena, DrawRecord, UNIVERSE_SIZE};

/// Écarts (en numéros de concours) entre apparitions consécutives d'un numéro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapStat {
    pub number: String,
    pub avg_gap: f64,
    pub median_gap: f64,
    pub min_gap: u32,
    pub max_gap: u32,
    /// `len(gaps) + 1` si le numéro est apparu au moins une fois, sinon 0.
    pub total_appearances: u32,
}

/// Listes d'écarts par numéro (index 0 = numéro 01), plus un indicateur
/// « déjà vu » par numéro. Les tirages sans concours ou sans dezenas sont ignorés.
pub fn gap_lists(draws: &[DrawRecord]) -> (Vec<Vec<u32>>, Vec<bool>) {
    let mut ordered: Vec<(u32, &DrawRecord)> = Vec::with_capacity(draws.len());
    for draw in draws {
        match (draw.contest_number, &draw.dezenas) {
            (Some(contest), Some(_)) => ordered.push((contest, draw)),
            _ => tracing::warn!(
                contest = ?draw.contest_number,
                has_dezenas = draw.dezenas.is_some(),
                "tirage sans dezenas ou sans concours ignoré"
            ),
        }
    }
    ordered.sort_by_key(|(contest, _)| *contest);

    let size = UNIVERSE_SIZE as usize;
    let mut last_seen: Vec<Option<u32>> = vec![None; size];
    let mut gaps: Vec<Vec<u32>> = vec![Vec::new(); size];

    for (contest, draw) in ordered {
        for n in 1..=UNIVERSE_SIZE {
            if !draw.contains(n) {
                continue;
            }
            let idx = (n - 1) as usize;
            if let Some(prev) = last_seen[idx] {
                gaps[idx].push(contest - prev);
            }
            last_seen[idx] = Some(contest);
        }
    }

    let seen = last_seen.iter().map(Option::is_some).collect();
    (gaps, seen)
}

/// Arrondi à deux décimales, demi au pair (2.125 → 2.12).
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

fn median(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    }
}

/// Statistiques d'écart pour les 25 numéros, triées par écart moyen croissant :
/// les numéros qui « reviennent vite » apparaissent en premier.
pub fn calculate_average_gap(draws: &[DrawRecord]) -> Vec<GapStat> {
    let (gaps, seen) = gap_lists(draws);

    let mut stats: Vec<GapStat> = (1..=UNIVERSE_SIZE)
        .map(|n| {
            let idx = (n - 1) as usize;
            let list = &gaps[idx];
            let avg_gap = if list.is_empty() {
                0.0
            } else {
                round2(list.iter().map(|&g| g as f64).sum::<f64>() / list.len() as f64)
            };
            GapStat {
                number: format_dezena(n),
                avg_gap,
                median_gap: median(list),
                min_gap: list.iter().copied().min().unwrap_or(0),
                max_gap: list.iter().copied().max().unwrap_or(0),
                total_appearances: if seen[idx] { list.len() as u32 + 1 } else { 0 },
            }
        })
        .collect();

    stats.sort_by(|a, b| a.avg_gap.partial_cmp(&b.avg_gap).unwrap_or(std::cmp::Ordering::Equal));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_draws;

    fn stat_for<'a>(stats: &'a [GapStat], number: &str) -> &'a GapStat {
        stats.iter().find(|s| s.number == number).unwrap()
    }

    #[test]
    fn test_single_gap() {
        let draws = vec![DrawRecord::new(105, &[5]), DrawRecord::new(100, &[5])];
        let stats = calculate_average_gap(&draws);
        let s = stat_for(&stats, "05");
        assert_eq!(s.avg_gap, 5.0);
        assert_eq!(s.median_gap, 5.0);
        assert_eq!(s.min_gap, 5);
        assert_eq!(s.max_gap, 5);
        assert_eq!(s.total_appearances, 2);

        let (gaps, _) = gap_lists(&draws);
        assert_eq!(gaps[4], vec![5]);
    }

    #[test]
    fn test_missing_dezenas_skipped() {
        let mut broken = DrawRecord::new(103, &[]);
        broken.dezenas = None;
        let draws = vec![DrawRecord::new(100, &[5]), broken, DrawRecord::new(105, &[5])];
        let (gaps, _) = gap_lists(&draws);
        assert_eq!(gaps[4], vec![5]);
    }

    #[test]
    fn test_missing_contest_skipped() {
        let mut broken = DrawRecord::new(0, &[5]);
        broken.contest_number = None;
        let draws = vec![DrawRecord::new(100, &[5]), broken, DrawRecord::new(110, &[5])];
        let (gaps, _) = gap_lists(&draws);
        assert_eq!(gaps[4], vec![10]);
    }

    #[test]
    fn test_never_seen_and_seen_once() {
        let draws = vec![DrawRecord::new(1, &[1])];
        let stats = calculate_average_gap(&draws);

        let once = stat_for(&stats, "01");
        assert_eq!(once.avg_gap, 0.0);
        assert_eq!(once.total_appearances, 1);

        let never = stat_for(&stats, "02");
        assert_eq!(never.avg_gap, 0.0);
        assert_eq!(never.median_gap, 0.0);
        assert_eq!(never.total_appearances, 0);
    }

    #[test]
    fn test_gap_list_length_matches_appearances() {
        let draws = make_test_draws(60);
        let (gaps, _) = gap_lists(&draws);
        for n in 1..=25u8 {
            let appearances = draws.iter().filter(|d| d.contains(n)).count();
            assert_eq!(gaps[(n - 1) as usize].len(), appearances.saturating_sub(1));
        }
    }

    #[test]
    fn test_avg_rounded_and_even_median() {
        // écarts [1, 2, 4] puis [1, 2] : moyennes 2.33 et 1.5
        let draws = vec![
            DrawRecord::new(1, &[1, 2]),
            DrawRecord::new(2, &[1, 2]),
            DrawRecord::new(4, &[1, 2]),
            DrawRecord::new(8, &[1]),
        ];
        let stats = calculate_average_gap(&draws);
        let one = stat_for(&stats, "01");
        assert_eq!(one.avg_gap, 2.33);
        assert_eq!(one.median_gap, 2.0);
        assert_eq!(one.min_gap, 1);
        assert_eq!(one.max_gap, 4);

        let two = stat_for(&stats, "02");
        assert_eq!(two.avg_gap, 1.5);
        assert_eq!(two.median_gap, 1.5);
    }

    #[test]
    fn test_avg_half_rounds_to_even() {
        // écarts [2, 2, 2, 2, 2, 2, 2, 3] : moyenne exacte 2.125
        let draws: Vec<DrawRecord> = [1, 3, 5, 7, 9, 11, 13, 15, 18]
            .iter()
            .map(|&c| DrawRecord::new(c, &[1]))
            .collect();
        let stats = calculate_average_gap(&draws);
        let one = stat_for(&stats, "01");
        assert_eq!(one.avg_gap, 2.12);
        assert_eq!(one.median_gap, 2.0);
        assert_eq!(one.total_appearances, 9);
    }

    #[test]
    fn test_sorted_by_avg_gap() {
        let stats = calculate_average_gap(&make_test_draws(50));
        assert_eq!(stats.len(), 25);
        assert!(stats.windows(2).all(|w| w[0].avg_gap <= w[1].avg_gap));
    }

    #[test]
    fn test_idempotent() {
        let draws = make_test_draws(30);
        assert_eq!(calculate_average_gap(&draws), calculate_average_gap(&draws));
    }
}
