use anyhow::{Context, Result};
use lotofacil_db::rusqlite::Connection;
use std::path::Path;

use lotofacil_db::db::upsert_draw;
use lotofacil_db::models::{normalize_dezenas, validate_draw, DrawRecord, DRAW_SIZE};

/// Index de la première boule dans le CSV `concurso;data;bola1..bola15`.
const FIRST_BALL_COLUMN: usize = 2;

fn parse_record(record: &csv::StringRecord) -> Result<DrawRecord> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let raw_contest = get(0)?;
    let contest_number: u32 = raw_contest
        .parse()
        .with_context(|| format!("Numéro de concours invalide : '{}'", raw_contest))?;
    let draw_date = get(1)?;

    let balls = (FIRST_BALL_COLUMN..FIRST_BALL_COLUMN + DRAW_SIZE)
        .map(get)
        .collect::<Result<Vec<String>>>()?;

    Ok(DrawRecord {
        contest_number: Some(contest_number),
        draw_date,
        dezenas: Some(normalize_dezenas(balls)),
        ..Default::default()
    })
}

fn read_csv(path: &Path, result: &mut ImportResult) -> Result<Vec<DrawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let mut draws = Vec::new();
    for (line, record_result) in reader.records().enumerate() {
        result.total_records += 1;
        match record_result.map_err(anyhow::Error::from).and_then(|r| parse_record(&r)) {
            Ok(draw) => draws.push(draw),
            Err(e) => {
                tracing::warn!(line = line + 2, error = %e, "ligne CSV ignorée");
                result.errors += 1;
            }
        }
    }
    Ok(draws)
}

fn read_json(path: &Path, result: &mut ImportResult) -> Result<Vec<DrawRecord>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    let draws: Vec<DrawRecord> = serde_json::from_str(&contents)
        .with_context(|| format!("JSON invalide dans {:?}", path))?;
    result.total_records += draws.len() as u32;
    Ok(draws)
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub replaced: u32,
    pub non_conforming: u32,
    pub errors: u32,
}

/// Importe un fichier `.json` (tableau de tirages) ou CSV. Un concours déjà
/// présent est remplacé : la dernière version lue l'emporte.
pub fn import_file(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut result = ImportResult::default();

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let draws = if is_json {
        read_json(path, &mut result)?
    } else {
        read_csv(path, &mut result)?
    };

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    for draw in &draws {
        if let Err(e) = validate_draw(draw) {
            tracing::warn!(error = %e, "tirage non conforme importé tel quel");
            result.non_conforming += 1;
        }
        match upsert_draw(&tx, draw) {
            Ok(false) => result.inserted += 1,
            Ok(true) => result.replaced += 1,
            Err(e) => {
                tracing::error!(contest = ?draw.contest_number, error = %e, "insertion impossible");
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    tracing::info!(?result, "import terminé");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotofacil_db::db::{count_draws, fetch_all_draws, migrate};
    use std::io::Write;

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const HEADER: &str = "concurso;data;b1;b2;b3;b4;b5;b6;b7;b8;b9;b10;b11;b12;b13;b14;b15\n";

    #[test]
    fn test_import_csv() {
        let csv = format!(
            "{HEADER}1;29/09/2003;2;3;5;6;9;10;11;13;14;16;18;20;23;24;25\n\
             2;06/10/2003;1;4;5;6;7;9;11;12;13;15;16;19;20;23;24\n\
             x;bad;1\n"
        );
        let file = write_temp(".csv", &csv);
        let conn = memory_db();

        let result = import_file(&conn, file.path()).unwrap();
        assert_eq!(result.total_records, 3);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.errors, 1);
        assert_eq!(result.non_conforming, 0);

        let draws = fetch_all_draws(&conn).unwrap();
        assert_eq!(draws[0].dezenas.as_ref().unwrap()[0], "02");
        assert_eq!(draws[1].draw_date, "06/10/2003");
    }

    #[test]
    fn test_import_json_last_wins() {
        let json = r#"[
            {"concurso": 10, "dezenas": ["01","02"]},
            {"concurso": 10, "dezenas": [3, 4]},
            {"concurso": 11, "dezenas": ["05"]}
        ]"#;
        let file = write_temp(".json", json);
        let conn = memory_db();

        let result = import_file(&conn, file.path()).unwrap();
        assert_eq!(result.total_records, 3);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.replaced, 1);
        assert_eq!(result.non_conforming, 3);
        assert_eq!(count_draws(&conn).unwrap(), 2);

        let draws = fetch_all_draws(&conn).unwrap();
        assert_eq!(draws[0].dezenas, Some(vec!["03".to_string(), "04".to_string()]));
    }

    #[test]
    fn test_json_without_contest_is_error() {
        let file = write_temp(".json", r#"[{"dezenas": ["01"]}]"#);
        let conn = memory_db();
        let result = import_file(&conn, file.path()).unwrap();
        assert_eq!(result.errors, 1);
        assert_eq!(count_draws(&conn).unwrap(), 0);
    }

    #[test]
    fn test_missing_file() {
        let conn = memory_db();
        assert!(import_file(&conn, Path::new("/nonexistent/draws.csv")).is_err());
    }
}
