use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::models::DrawRecord;
use crate::source::dedup_by_contest;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    contest_number INTEGER PRIMARY KEY,
    draw_date      TEXT NOT NULL DEFAULT '',
    payload        TEXT NOT NULL
);
";

/// Taille d'une page lors du parcours complet de la table.
pub const PAGE_SIZE: u32 = 500;

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotofacil.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

/// Insère ou remplace un tirage. Retourne `true` si le concours existait déjà.
pub fn upsert_draw(conn: &Connection, draw: &DrawRecord) -> Result<bool> {
    let contest = draw
        .contest_number
        .context("Impossible de stocker un tirage sans numéro de concours")?;
    let payload = serde_json::to_string(draw)
        .with_context(|| format!("Sérialisation du concours {} impossible", contest))?;

    let existed = conn
        .query_row(
            "SELECT 1 FROM draws WHERE contest_number = ?1",
            [contest],
            |_| Ok(()),
        )
        .optional()?
        .is_some();

    conn.execute(
        "INSERT OR REPLACE INTO draws (contest_number, draw_date, payload) VALUES (?1, ?2, ?3)",
        rusqlite::params![contest, draw.draw_date, payload],
    ).context("Échec de l'insertion")?;
    Ok(existed)
}

fn decode_payload(contest: u32, payload: &str) -> Result<DrawRecord> {
    serde_json::from_str(payload)
        .with_context(|| format!("Payload illisible pour le concours {}", contest))
}

fn fetch_page(conn: &Connection, after: Option<u32>, limit: u32) -> Result<Vec<(u32, String)>> {
    let mut stmt = conn.prepare(
        "SELECT contest_number, payload FROM draws
         WHERE ?1 IS NULL OR contest_number > ?1
         ORDER BY contest_number ASC LIMIT ?2"
    )?;
    let rows = stmt
        .query_map(rusqlite::params![after, limit], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Parcourt toute la table page par page (ordre croissant de concours),
/// puis dédoublonne par numéro de concours.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<DrawRecord>> {
    let mut items = Vec::new();
    let mut cursor: Option<u32> = None;

    loop {
        let page = fetch_page(conn, cursor, PAGE_SIZE)?;
        let fetched = page.len();
        tracing::debug!(fetched, after = ?cursor, "page de tirages lue");

        for (contest, payload) in page {
            items.push(decode_payload(contest, &payload)?);
            cursor = Some(contest);
        }

        if fetched < PAGE_SIZE as usize {
            break;
        }
    }

    Ok(dedup_by_contest(items))
}

pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(
        "SELECT contest_number, payload FROM draws ORDER BY contest_number DESC LIMIT ?1"
    )?;
    let rows = stmt
        .query_map([limit], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    rows.iter()
        .map(|(contest, payload)| decode_payload(*contest, payload))
        .collect()
}

/// Payload JSON brut du plus petit concours stocké, tel qu'enregistré.
pub fn fetch_first_payload(conn: &Connection) -> Result<Option<String>> {
    let payload = conn
        .query_row(
            "SELECT payload FROM draws ORDER BY contest_number ASC LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(payload)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
