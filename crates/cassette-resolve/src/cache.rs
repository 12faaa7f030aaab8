//! Sqlite-backed sequence cache.
//!
//! The cache is an explicit dependency of resolution, never ambient
//! state: callers open one (on disk or in memory), pick a TTL, and pass
//! it in per invocation.

use cassette_core::module::{Perturbation, SequenceSource};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection};

use crate::ResolveError;

pub struct SequenceCache {
    conn: Connection,
    ttl: Duration,
}

impl SequenceCache {
    pub fn open(path: &str, ttl: Duration) -> Result<Self, ResolveError> {
        Self::init(Connection::open(path)?, ttl)
    }

    pub fn open_in_memory(ttl: Duration) -> Result<Self, ResolveError> {
        Self::init(Connection::open_in_memory()?, ttl)
    }

    fn init(conn: Connection, ttl: Duration) -> Result<Self, ResolveError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sequences (
                species    TEXT NOT NULL,
                symbol     TEXT NOT NULL,
                source     TEXT NOT NULL,
                sequence   TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                PRIMARY KEY (species, symbol, source)
            );",
        )?;
        Ok(Self { conn, ttl })
    }

    pub fn put(
        &self,
        species: &str,
        symbol: &str,
        source: SequenceSource,
        sequence: &str,
    ) -> Result<(), ResolveError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sequences (species, symbol, source, sequence, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![species, symbol, source.as_str(), sequence, timestamp(Utc::now())],
        )?;
        Ok(())
    }

    /// Freshest unexpired entry for the symbol whose source satisfies
    /// the perturbation.
    pub fn get(
        &self,
        species: &str,
        symbol: &str,
        perturbation: Perturbation,
    ) -> Result<Option<(String, SequenceSource)>, ResolveError> {
        let mut stmt = self.conn.prepare(
            "SELECT source, sequence, fetched_at FROM sequences
             WHERE species = ?1 AND symbol = ?2
             ORDER BY fetched_at DESC",
        )?;
        let rows = stmt.query_map(params![species, symbol], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let cutoff = Utc::now() - self.ttl;
        for row in rows {
            let (source_tag, sequence, fetched_at) = row?;
            let Some(source) = SequenceSource::from_str_tag(&source_tag) else {
                continue;
            };
            if !source.satisfies(perturbation) {
                continue;
            }
            let Ok(fetched_at) = DateTime::parse_from_rfc3339(&fetched_at) else {
                continue;
            };
            if fetched_at.with_timezone(&Utc) < cutoff {
                continue;
            }
            return Ok(Some((sequence, source)));
        }
        Ok(None)
    }

    /// Remove entries older than the TTL. Returns how many were swept.
    pub fn purge_expired(&self) -> Result<usize, ResolveError> {
        let cutoff = timestamp(Utc::now() - self.ttl);
        let removed = self.conn.execute(
            "DELETE FROM sequences WHERE fetched_at < ?1",
            params![cutoff],
        )?;
        Ok(removed)
    }
}

// Fixed-width UTC stamps so string comparison in SQL is chronological.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_cache() -> SequenceCache {
        SequenceCache::open_in_memory(Duration::hours(1)).unwrap()
    }

    #[test]
    fn test_put_get_roundtrip() {
        let cache = fresh_cache();
        cache
            .put("homo_sapiens", "PDCD1", SequenceSource::GuideRna, "ACGTACGT")
            .unwrap();
        let hit = cache
            .get("homo_sapiens", "PDCD1", Perturbation::Knockout)
            .unwrap();
        assert_eq!(
            hit,
            Some(("ACGTACGT".to_string(), SequenceSource::GuideRna))
        );
    }

    #[test]
    fn test_source_must_satisfy_perturbation() {
        let cache = fresh_cache();
        cache
            .put("homo_sapiens", "PDCD1", SequenceSource::GuideRna, "ACGTACGT")
            .unwrap();
        // A guide entry must not satisfy a knockdown request
        let miss = cache
            .get("homo_sapiens", "PDCD1", Perturbation::Knockdown)
            .unwrap();
        assert_eq!(miss, None);
    }

    #[test]
    fn test_expired_entries_ignored() {
        let cache = SequenceCache::open_in_memory(Duration::seconds(-1)).unwrap();
        cache
            .put("homo_sapiens", "BATF", SequenceSource::Grch38Cdna, "ATGGCC")
            .unwrap();
        let miss = cache
            .get("homo_sapiens", "BATF", Perturbation::Overexpression)
            .unwrap();
        assert_eq!(miss, None);
    }

    #[test]
    fn test_upsert_replaces() {
        let cache = fresh_cache();
        cache
            .put("homo_sapiens", "BATF", SequenceSource::Grch38Cdna, "AAAA")
            .unwrap();
        cache
            .put("homo_sapiens", "BATF", SequenceSource::Grch38Cdna, "CCCC")
            .unwrap();
        let hit = cache
            .get("homo_sapiens", "BATF", Perturbation::Overexpression)
            .unwrap();
        assert_eq!(hit.unwrap().0, "CCCC");
    }

    #[test]
    fn test_purge_expired() {
        let cache = SequenceCache::open_in_memory(Duration::seconds(-1)).unwrap();
        cache
            .put("homo_sapiens", "BATF", SequenceSource::Grch38Cdna, "ATGGCC")
            .unwrap();
        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.purge_expired().unwrap(), 0);
    }

    #[test]
    fn test_species_is_part_of_the_key() {
        let cache = fresh_cache();
        cache
            .put("mus_musculus", "Batf", SequenceSource::Grch38Cdna, "ATGGCC")
            .unwrap();
        let miss = cache
            .get("homo_sapiens", "Batf", Perturbation::Overexpression)
            .unwrap();
        assert_eq!(miss, None);
    }
}
