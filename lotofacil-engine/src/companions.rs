use serde::{Deserialize, Serialize};

use lotofacil_db::models::{
    format_dezena, normalize_dezena, parse_dezena, DrawRecord, DRAW_SIZE, UNIVERSE_SIZE,
};

use crate::error::AnalysisError;
use crate::frequency::NumberFrequency;

/// Nombre maximum de numéros du classement analysés.
pub const MAX_ANALYZED: usize = 15;
/// Un tirage de 15 numéros a au plus 14 compagnons distincts.
pub const MAX_COMPANIONS: usize = DRAW_SIZE - 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionProfile {
    pub number: String,
    #[serde(rename = "most_frequent")]
    pub companions: Vec<NumberFrequency>,
}

impl CompanionProfile {
    pub fn companion_numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.companions.iter().filter_map(|c| parse_dezena(&c.number))
    }
}

/// Pour les `limit` premiers numéros du classement (au plus 15), compte
/// combien de fois chaque autre numéro est sorti dans le même tirage.
pub fn find_most_frequent_companions(
    draws: &[DrawRecord],
    ranking: &[NumberFrequency],
    limit: usize,
) -> Result<Vec<CompanionProfile>, AnalysisError> {
    let take = limit.min(MAX_ANALYZED).min(ranking.len());
    let mut profiles = Vec::with_capacity(take);

    for entry in &ranking[..take] {
        let normalized = normalize_dezena(&entry.number);
        let number = parse_dezena(&normalized)
            .ok_or_else(|| AnalysisError::InvalidNumber(entry.number.clone()))?;

        let mut counts = vec![0u32; UNIVERSE_SIZE as usize];
        for draw in draws.iter().filter(|d| d.contains(number)) {
            for other in draw.numbers().filter(|&o| o != number) {
                counts[(other - 1) as usize] += 1;
            }
        }

        let mut companions: Vec<NumberFrequency> = (1..=UNIVERSE_SIZE)
            .filter(|&n| counts[(n - 1) as usize] > 0)
            .map(|n| NumberFrequency {
                number: format_dezena(n),
                quantity: counts[(n - 1) as usize],
            })
            .collect();
        companions.sort_by(|a, b| b.quantity.cmp(&a.quantity));
        companions.truncate(MAX_COMPANIONS);

        profiles.push(CompanionProfile { number: normalized, companions });
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::count_number_frequencies;
    use crate::make_test_draws;

    fn scenario_draws() -> Vec<DrawRecord> {
        vec![
            DrawRecord::new(1, &[1, 3, 5, 7, 9]),
            DrawRecord::new(2, &[1, 3, 6, 8, 9]),
            DrawRecord::new(3, &[2, 4, 6, 8, 10]),
        ]
    }

    #[test]
    fn test_companions_of_01() {
        let draws = scenario_draws();
        let ranking = count_number_frequencies(&draws);
        let profiles = find_most_frequent_companions(&draws, &ranking[..5], 15).unwrap();

        let p01 = profiles.iter().find(|p| p.number == "01").unwrap();
        let first_two: Vec<(&str, u32)> = p01
            .companions
            .iter()
            .take(2)
            .map(|c| (c.number.as_str(), c.quantity))
            .collect();
        assert_eq!(first_two, vec![("03", 2), ("09", 2)]);
        assert_eq!(p01.companions.len(), 6);
    }

    #[test]
    fn test_self_excluded_and_bounded() {
        let draws = make_test_draws(80);
        let ranking = count_number_frequencies(&draws);
        let profiles = find_most_frequent_companions(&draws, &ranking, 15).unwrap();

        assert_eq!(profiles.len(), 15);
        for p in &profiles {
            assert!(p.companions.iter().all(|c| c.number != p.number));
            assert!(p.companions.len() <= MAX_COMPANIONS);
            assert!(p.companions.iter().all(|c| c.quantity > 0));
            assert!(p.companions.windows(2).all(|w| w[0].quantity >= w[1].quantity));
        }
    }

    #[test]
    fn test_follows_ranking_order() {
        let draws = make_test_draws(20);
        let ranking = count_number_frequencies(&draws);
        let profiles = find_most_frequent_companions(&draws, &ranking, 15).unwrap();
        let order: Vec<&str> = profiles.iter().map(|p| p.number.as_str()).collect();
        let expected: Vec<&str> = ranking.iter().take(15).map(|r| r.number.as_str()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_single_char_number_padded() {
        let draws = scenario_draws();
        let ranking = vec![NumberFrequency { number: "1".into(), quantity: 2 }];
        let profiles = find_most_frequent_companions(&draws, &ranking, 15).unwrap();
        assert_eq!(profiles[0].number, "01");
        assert!(!profiles[0].companions.is_empty());
    }

    #[test]
    fn test_unpadded_dezenas_counted() {
        let mut draw = DrawRecord::new(1, &[]);
        draw.dezenas = Some(vec!["7".to_string(), "02".to_string()]);
        let draws = vec![draw];

        let ranking = count_number_frequencies(&draws);
        let seven = ranking.iter().find(|f| f.number == "07").unwrap();
        assert_eq!(seven.quantity, 1);

        let two = vec![NumberFrequency { number: "02".into(), quantity: 1 }];
        let profiles = find_most_frequent_companions(&draws, &two, 15).unwrap();
        let companions: Vec<&str> = profiles[0].companions.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(companions, vec!["07"]);
    }

    #[test]
    fn test_invalid_number_is_error() {
        let ranking = vec![NumberFrequency { number: "42".into(), quantity: 1 }];
        let result = find_most_frequent_companions(&scenario_draws(), &ranking, 15);
        assert!(matches!(result, Err(AnalysisError::InvalidNumber(_))));
    }

    #[test]
    fn test_unseen_number_has_no_companions() {
        let ranking = vec![NumberFrequency { number: "25".into(), quantity: 0 }];
        let profiles = find_most_frequent_companions(&scenario_draws(), &ranking, 15).unwrap();
        assert!(profiles[0].companions.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let draws = make_test_draws(30);
        let ranking = count_number_frequencies(&draws);
        assert_eq!(
            find_most_frequent_companions(&draws, &ranking, 15).unwrap(),
            find_most_frequent_companions(&draws, &ranking, 15).unwrap()
        );
    }
}
