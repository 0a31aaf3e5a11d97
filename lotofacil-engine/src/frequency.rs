use serde::{Deserialize, Serialize};

use lotofacil_db::models::{format_dezena, DrawRecord, UNIVERSE_SIZE};

/// Un numéro et son nombre d'occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFrequency {
    pub number: String,
    pub quantity: u32,
}

/// Occurrences de chaque numéro 01-25 sur tout l'historique, triées par
/// fréquence décroissante. À égalité, l'ordre croissant des numéros est
/// conservé (tri stable sur l'univers).
pub fn count_number_frequencies(draws: &[DrawRecord]) -> Vec<NumberFrequency> {
    let mut counts = vec![0u32; UNIVERSE_SIZE as usize];

    for draw in draws {
        for n in draw.numbers() {
            counts[(n - 1) as usize] += 1;
        }
    }

    let mut stats: Vec<NumberFrequency> = (1..=UNIVERSE_SIZE)
        .map(|n| NumberFrequency {
            number: format_dezena(n),
            quantity: counts[(n - 1) as usize],
        })
        .collect();

    stats.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    tracing::debug!(draws = draws.len(), "fréquences calculées");
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::make_test_draws;

    fn scenario_draws() -> Vec<DrawRecord> {
        vec![
            DrawRecord::new(1, &[1, 3, 5, 7, 9]),
            DrawRecord::new(2, &[1, 3, 6, 8, 9]),
            DrawRecord::new(3, &[2, 4, 6, 8, 10]),
        ]
    }

    #[test]
    fn test_top_three_tied() {
        let stats = count_number_frequencies(&scenario_draws());
        let top: Vec<&str> = stats.iter().take(5).map(|s| s.number.as_str()).collect();
        // 01, 03, 06, 08, 09 ont tous 2 occurrences, dans l'ordre croissant
        assert_eq!(top, vec!["01", "03", "06", "08", "09"]);
        assert!(stats.iter().take(5).all(|s| s.quantity == 2));
        assert!(stats.iter().skip(5).all(|s| s.quantity <= 1));
    }

    #[test]
    fn test_covers_universe() {
        let stats = count_number_frequencies(&make_test_draws(40));
        assert_eq!(stats.len(), 25);
        let mut numbers: Vec<&str> = stats.iter().map(|s| s.number.as_str()).collect();
        numbers.sort();
        let expected: Vec<String> = (1..=25).map(format_dezena).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn test_counts_sum_to_draw_size() {
        let draws = make_test_draws(40);
        let stats = count_number_frequencies(&draws);
        let total: u32 = stats.iter().map(|s| s.quantity).sum();
        assert_eq!(total, 15 * 40);
    }

    #[test]
    fn test_sorted_descending() {
        let stats = count_number_frequencies(&make_test_draws(33));
        assert!(stats.windows(2).all(|w| w[0].quantity >= w[1].quantity));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut draw = DrawRecord::new(1, &[1, 2]);
        if let Some(d) = draw.dezenas.as_mut() {
            d.push("26".into());
            d.push("00".into());
        }
        let stats = count_number_frequencies(&[draw]);
        let total: u32 = stats.iter().map(|s| s.quantity).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_empty_history_zero_counts() {
        let stats = count_number_frequencies(&[]);
        assert_eq!(stats.len(), 25);
        assert_eq!(stats[0].number, "01");
        assert!(stats.iter().all(|s| s.quantity == 0));
    }

    #[test]
    fn test_idempotent() {
        let draws = make_test_draws(25);
        assert_eq!(count_number_frequencies(&draws), count_number_frequencies(&draws));
    }
}
