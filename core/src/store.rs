use crate::document::{Game, GameId};
use crate::error::SearchError;
use crate::index::{CorpusStats, InvertedIndex, PostingsList};
use std::collections::HashMap;
use std::path::Path;

/// Read/write contract the core consumes from the document store. Kept as a
/// trait so tests can run against a request-scoped store; the production
/// implementation is an embedded sled database.
pub trait DocumentStore {
    fn put(&self, game: &Game) -> Result<(), SearchError>;
    /// Batched lookup; ids absent from the store are simply not returned.
    fn find(&self, ids: &[GameId]) -> Result<Vec<Game>, SearchError>;
    fn count_all(&self) -> Result<u64, SearchError>;
    /// Full catalog scan, used for distinct platform/genre listings.
    fn games(&self) -> Result<Vec<Game>, SearchError>;

    fn save_postings(&self, term: &str, list: &PostingsList) -> Result<(), SearchError>;
    fn load_all_postings(&self) -> Result<HashMap<String, PostingsList>, SearchError>;
    fn save_stats(&self, stats: &CorpusStats) -> Result<(), SearchError>;
    fn load_stats(&self) -> Result<Option<CorpusStats>, SearchError>;

    /// Drop games, postings, and stats. Full rebuilds run this first.
    fn clear(&self) -> Result<(), SearchError>;

    fn persist_index(&self, index: &InvertedIndex) -> Result<(), SearchError> {
        for (term, list) in index.terms() {
            self.save_postings(term, list)?;
        }
        self.save_stats(&index.stats())
    }

    fn load_index(&self) -> Result<InvertedIndex, SearchError> {
        let terms = self.load_all_postings()?;
        let stats = self.load_stats()?.unwrap_or_default();
        Ok(InvertedIndex::from_parts(terms, stats))
    }
}

const TREE_GAMES: &str = "games";
const TREE_POSTINGS: &str = "postings";
const TREE_META: &str = "meta";
const KEY_STATS: &[u8] = b"corpus_stats";

/// Embedded document + postings store. Trees: `games` (id big-endian ->
/// bincode Game), `postings` (term bytes -> bincode PostingsList), `meta`
/// (corpus stats as JSON). Store failures surface as retryable
/// `SearchError::Store`.
pub struct SledStore {
    db: sled::Db,
    games: sled::Tree,
    postings: sled::Tree,
    meta: sled::Tree,
}

impl SledStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SearchError> {
        let db = sled::open(path)?;
        let games = db.open_tree(TREE_GAMES)?;
        let postings = db.open_tree(TREE_POSTINGS)?;
        let meta = db.open_tree(TREE_META)?;
        Ok(SledStore { db, games, postings, meta })
    }

    /// Flush pending writes; called on the explicit close path.
    pub fn close(&self) -> Result<(), SearchError> {
        self.db.flush()?;
        Ok(())
    }
}

impl DocumentStore for SledStore {
    fn put(&self, game: &Game) -> Result<(), SearchError> {
        let bytes = bincode::serialize(game)?;
        self.games.insert(game.id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn find(&self, ids: &[GameId]) -> Result<Vec<Game>, SearchError> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = self.games.get(id.to_be_bytes())? {
                out.push(bincode::deserialize(&bytes)?);
            }
        }
        Ok(out)
    }

    fn count_all(&self) -> Result<u64, SearchError> {
        Ok(self.games.len() as u64)
    }

    fn games(&self) -> Result<Vec<Game>, SearchError> {
        let mut out = Vec::new();
        for entry in self.games.iter() {
            let (_key, bytes) = entry?;
            out.push(bincode::deserialize(&bytes)?);
        }
        Ok(out)
    }

    fn save_postings(&self, term: &str, list: &PostingsList) -> Result<(), SearchError> {
        let bytes = bincode::serialize(list)?;
        self.postings.insert(term.as_bytes(), bytes)?;
        Ok(())
    }

    fn load_all_postings(&self) -> Result<HashMap<String, PostingsList>, SearchError> {
        let mut terms = HashMap::new();
        for entry in self.postings.iter() {
            let (key, bytes) = entry?;
            let term = String::from_utf8_lossy(&key).into_owned();
            terms.insert(term, bincode::deserialize(&bytes)?);
        }
        Ok(terms)
    }

    fn save_stats(&self, stats: &CorpusStats) -> Result<(), SearchError> {
        let json = serde_json::to_vec(stats)?;
        self.meta.insert(KEY_STATS, json)?;
        self.db.flush()?;
        Ok(())
    }

    fn load_stats(&self) -> Result<Option<CorpusStats>, SearchError> {
        match self.meta.get(KEY_STATS)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn clear(&self) -> Result<(), SearchError> {
        self.games.clear()?;
        self.postings.clear()?;
        self.meta.clear()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Platform;
    use tempfile::tempdir;

    fn sample() -> Game {
        let mut g = Game::new(42, "Doom");
        g.description = Some("Fast shooter".into());
        g.platforms.push(Platform { name: "PC".into() });
        g.rating = Some(4.4);
        g
    }

    #[test]
    fn put_find_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        store.put(&sample()).unwrap();
        let found = store.find(&[42, 999]).unwrap();
        // Missing ids are dropped, not errors.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], sample());
        assert_eq!(store.count_all().unwrap(), 1);
    }

    #[test]
    fn index_persistence_roundtrip() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();

        let mut idx = InvertedIndex::new();
        idx.index_game(&sample());
        idx.finalize();
        store.persist_index(&idx).unwrap();

        let loaded = store.load_index().unwrap();
        assert!(loaded.is_finalized());
        assert_eq!(loaded.stats(), idx.stats());
        assert_eq!(loaded.postings("doom"), idx.postings("doom"));
    }

    #[test]
    fn clear_empties_all_trees() {
        let dir = tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        store.put(&sample()).unwrap();
        let mut idx = InvertedIndex::new();
        idx.index_game(&sample());
        idx.finalize();
        store.persist_index(&idx).unwrap();

        store.clear().unwrap();
        assert_eq!(store.count_all().unwrap(), 0);
        assert!(store.load_all_postings().unwrap().is_empty());
        assert!(store.load_stats().unwrap().is_none());
    }
}
