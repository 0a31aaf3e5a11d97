use std::collections::HashMap;

use anyhow::Result;
use rusqlite::Connection;

use crate::db::fetch_all_draws;
use crate::models::DrawRecord;

/// Accès à l'historique des tirages, passé explicitement au générateur de rapport.
pub trait DrawSource {
    fn fetch_draws(&self) -> Result<Vec<DrawRecord>>;
}

/// Historique stocké dans SQLite.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl DrawSource for SqliteStore<'_> {
    fn fetch_draws(&self) -> Result<Vec<DrawRecord>> {
        fetch_all_draws(self.conn)
    }
}

impl DrawSource for Vec<DrawRecord> {
    fn fetch_draws(&self) -> Result<Vec<DrawRecord>> {
        Ok(dedup_by_contest(self.clone()))
    }
}

/// Un seul enregistrement par concours, le dernier vu l'emporte. Les
/// enregistrements sans numéro de concours sont conservés tels quels.
pub fn dedup_by_contest(items: Vec<DrawRecord>) -> Vec<DrawRecord> {
    let mut position: HashMap<u32, usize> = HashMap::new();
    let mut out: Vec<DrawRecord> = Vec::with_capacity(items.len());

    for item in items {
        match item.contest_number {
            Some(contest) => match position.get(&contest) {
                Some(&idx) => out[idx] = item,
                None => {
                    position.insert(contest, out.len());
                    out.push(item);
                }
            },
            None => out.push(item),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrate, upsert_draw};

    #[test]
    fn test_dedup_last_wins() {
        let items = vec![
            DrawRecord::new(1, &[1, 2]),
            DrawRecord::new(2, &[3, 4]),
            DrawRecord::new(1, &[5, 6]),
        ];
        let out = dedup_by_contest(items);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].contest_number, Some(1));
        assert_eq!(out[0].numbers().collect::<Vec<_>>(), vec![5, 6]);
        assert_eq!(out[1].contest_number, Some(2));
    }

    #[test]
    fn test_dedup_keeps_records_without_contest() {
        let mut orphan = DrawRecord::new(0, &[1]);
        orphan.contest_number = None;
        let out = dedup_by_contest(vec![orphan.clone(), orphan]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_vec_source() {
        let source = vec![DrawRecord::new(7, &[1]), DrawRecord::new(7, &[2])];
        let draws = source.fetch_draws().unwrap();
        assert_eq!(draws.len(), 1);
        assert!(draws[0].contains(2));
    }

    #[test]
    fn test_sqlite_source() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        upsert_draw(&conn, &DrawRecord::new(10, &[1, 2, 3])).unwrap();

        let store = SqliteStore::new(&conn);
        let draws = store.fetch_draws().unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].contest_number, Some(10));
    }
}
