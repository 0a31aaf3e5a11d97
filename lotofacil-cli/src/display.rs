use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use lotofacil_db::models::DrawRecord;
use lotofacil_engine::companions::CompanionProfile;
use lotofacil_engine::frequency::NumberFrequency;
use lotofacil_engine::gaps::GapStat;
use lotofacil_engine::heuristic::Combination;
use lotofacil_engine::trained::TrainedPredictions;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn join_numbers<S: AsRef<str>>(numbers: &[S]) -> String {
    numbers
        .iter()
        .map(|n| n.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Concours", "Date", "Dezenas", "Gagnants 15", "Gains 15", "Cumulé"]);

    for draw in draws {
        let mut sorted = draw.dezenas.clone().unwrap_or_default();
        sorted.sort();

        let prize = &draw.prize_tiers.quinze;
        let prize_str = if prize.premio > 0.0 {
            format!("R$ {:.2}", prize.premio)
        } else {
            "-".to_string()
        };

        table.add_row(vec![
            Cell::new(draw.contest_number.map(|c| c.to_string()).unwrap_or_default()),
            Cell::new(&draw.draw_date),
            Cell::new(join_numbers(&sorted)),
            Cell::new(prize.vencedores),
            Cell::new(prize_str),
            Cell::new(if draw.accumulated { "oui" } else { "non" }),
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total enregistrements lus : {}", result.total_records);
    println!("  Insérés                   : {}", result.inserted);
    println!("  Remplacés                 : {}", result.replaced);
    if result.non_conforming > 0 {
        println!("  Non conformes             : {}", result.non_conforming);
    }
    if result.errors > 0 {
        println!("  Erreurs                   : {}", result.errors);
    }
}

pub fn display_frequencies(frequencies: &[NumberFrequency], draw_count: usize) {
    println!("\n📊 Fréquences sur {} tirages\n", draw_count);

    let mut table = new_table(vec!["Rang", "Numéro", "Sorties", "Taux"]);
    let last = frequencies.len().saturating_sub(1);

    for (i, freq) in frequencies.iter().enumerate() {
        let rate = if draw_count > 0 {
            freq.quantity as f64 / draw_count as f64
        } else {
            0.0
        };
        let color = if i < 5 {
            Color::Green
        } else if i + 5 > last {
            Color::Red
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&freq.number).fg(color),
            Cell::new(freq.quantity),
            Cell::new(format!("{:.1}%", rate * 100.0)),
        ]);
    }
    println!("{table}");
}

pub fn display_gaps(gaps: &[GapStat]) {
    println!("\n⏱  Écarts entre apparitions\n");

    let mut table = new_table(vec!["Numéro", "Moyen", "Médian", "Min", "Max", "Apparitions"]);
    for gap in gaps {
        table.add_row(vec![
            Cell::new(&gap.number),
            Cell::new(format!("{:.2}", gap.avg_gap)),
            Cell::new(format!("{:.1}", gap.median_gap)),
            Cell::new(gap.min_gap),
            Cell::new(gap.max_gap),
            Cell::new(gap.total_appearances),
        ]);
    }
    println!("{table}");
}

pub fn display_companions(profiles: &[CompanionProfile], top: usize) {
    println!("\n🤝 Compagnons les plus fréquents\n");

    let mut table = new_table(vec!["Numéro", "Compagnons (co-sorties)"]);
    for profile in profiles.iter().take(top) {
        let companions = profile
            .companions
            .iter()
            .map(|c| format!("{}({})", c.number, c.quantity))
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![Cell::new(&profile.number), Cell::new(companions)]);
    }
    println!("{table}");
}

pub fn display_combinations(title: &str, combinations: &[Combination]) {
    println!("\n🎲 {title}\n");

    if combinations.is_empty() {
        println!("Aucune combinaison.");
        return;
    }

    let mut table = new_table(vec!["#", "Dezenas"]);
    for (i, combination) in combinations.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(join_numbers(combination))]);
    }
    println!("{table}");
}

pub fn display_trained(predictions: &TrainedPredictions) {
    display_combinations("Arbre de décision", &predictions.decision_tree);
    display_combinations("KNN", &predictions.knn);
}

pub fn display_check(db_path: &std::path::Path, count: u32, first: Option<&serde_json::Value>) {
    println!("Base : {}", db_path.display());
    println!("Tirages stockés : {}", count);

    let Some(first) = first else {
        println!("⚠️  La base existe mais ne contient aucun tirage.");
        return;
    };

    let mut table = new_table(vec!["Champ", "Présent", "Valeur"]);
    if let Some(object) = first.as_object() {
        for key in ["concurso", "data", "dezenas"] {
            let (present, value) = match object.get(key) {
                Some(v) => (Cell::new("oui").fg(Color::Green), v.to_string()),
                None => (Cell::new("non").fg(Color::Red), String::new()),
            };
            table.add_row(vec![Cell::new(key), present, Cell::new(value)]);
        }
        let others = object
            .keys()
            .filter(|k| !["concurso", "data", "dezenas"].contains(&k.as_str()))
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        println!("Autres champs : {}", others);
    }
    println!("{table}");
}
