use crate::document::{Game, GameId};
use crate::error::SearchError;
use crate::index::InvertedIndex;
use crate::normalize::distinct_terms;
use crate::rank::rank;
use crate::store::DocumentStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Optional query-time document filters, applied after ranking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Filters {
    pub platform: Option<String>,
    pub genre: Option<String>,
    pub min_rating: Option<f32>,
}

impl Filters {
    fn matches(&self, game: &Game) -> bool {
        if let Some(platform) = &self.platform {
            if !game.has_platform(platform) {
                return false;
            }
        }
        if let Some(genre) = &self.genre {
            if !game.has_genre(genre) {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            // A game with no rating cannot satisfy a rating floor.
            if game.rating.unwrap_or(0.0) < min {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Rating,
    ReleaseDate,
}

impl SortMode {
    /// Unknown sort names fall back to relevance with a log line, never an
    /// error.
    pub fn parse(name: &str) -> SortMode {
        match name {
            "relevance" => SortMode::Relevance,
            "rating" => SortMode::Rating,
            "release_date" => SortMode::ReleaseDate,
            other => {
                tracing::warn!(sort_by = other, "unknown sort mode, using relevance");
                SortMode::Relevance
            }
        }
    }
}

/// A ranked result joined back to its full document.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub game: Game,
    pub relevance_score: f32,
    pub matched_terms: Vec<String>,
}

/// Query pipeline over an injected store handle and an in-memory index.
///
/// The store is owned for the engine's lifetime; tests construct one per
/// request over a temp directory. Ingestion and finalize take `&mut self`,
/// which is the single-writer/barrier discipline: callers serialize writes
/// (the server holds a write lock), queries borrow immutably.
pub struct SearchEngine<S: DocumentStore> {
    store: S,
    index: InvertedIndex,
}

impl<S: DocumentStore> SearchEngine<S> {
    /// Engine over an empty index.
    pub fn new(store: S) -> Self {
        SearchEngine { store, index: InvertedIndex::new() }
    }

    /// Engine over the index persisted in the store.
    pub fn open(store: S) -> Result<Self, SearchError> {
        let index = store.load_index()?;
        tracing::info!(
            total_docs = index.stats().total_docs,
            num_terms = index.num_terms(),
            "loaded index"
        );
        Ok(SearchEngine { store, index })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Store and ingest one game. Weights stay provisional until
    /// `finalize_and_persist` runs.
    pub fn index_game(&mut self, game: &Game) -> Result<(), SearchError> {
        self.store.put(game)?;
        self.index.index_game(game);
        Ok(())
    }

    /// Second ingestion phase plus persistence of the stable index.
    pub fn finalize_and_persist(&mut self) -> Result<(), SearchError> {
        self.index.finalize();
        self.store.persist_index(&self.index)
    }

    /// Full rebuild: clear store and index, re-ingest, finalize, persist.
    pub fn rebuild<'a, I>(&mut self, games: I) -> Result<u64, SearchError>
    where
        I: IntoIterator<Item = &'a Game>,
    {
        self.store.clear()?;
        self.index.clear();
        let mut ingested = 0u64;
        for game in games {
            self.index_game(game)?;
            ingested += 1;
        }
        self.finalize_and_persist()?;
        Ok(ingested)
    }

    /// Rank the catalog against a free-text query, join ranked ids to full
    /// documents, filter, and apply the sort mode.
    ///
    /// "No results" is a successful empty Vec. Only store failures abort
    /// the request.
    pub fn search(
        &self,
        query: &str,
        filters: &Filters,
        sort: SortMode,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let terms = distinct_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let ranked = rank(&self.index, &terms);
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<GameId> = ranked.iter().map(|r| r.game_id).collect();
        let mut by_id: HashMap<GameId, Game> = self
            .store
            .find(&ids)?
            .into_iter()
            .map(|g| (g.id, g))
            .collect();

        // Join in ranked order; ids the store no longer has (index/store
        // drift) are dropped without failing the request.
        let mut hits: Vec<SearchHit> = Vec::with_capacity(ranked.len());
        for result in ranked {
            let Some(game) = by_id.remove(&result.game_id) else {
                tracing::warn!(game_id = result.game_id, "ranked id missing from store, dropped");
                continue;
            };
            if !filters.matches(&game) {
                continue;
            }
            hits.push(SearchHit {
                game,
                relevance_score: result.score,
                matched_terms: result.matched_terms,
            });
        }

        // Stable sorts so relevance order survives as the tie-break.
        match sort {
            SortMode::Relevance => {}
            SortMode::Rating => hits.sort_by(|a, b| {
                let ra = a.game.rating.unwrap_or(0.0);
                let rb = b.game.rating.unwrap_or(0.0);
                rb.total_cmp(&ra)
            }),
            SortMode::ReleaseDate => hits.sort_by(|a, b| {
                // ISO dates compare correctly as strings; missing sorts last.
                match (&a.game.released, &b.game.released) {
                    (Some(da), Some(db)) => db.cmp(da),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            }),
        }
        Ok(hits)
    }

    /// Sorted distinct platform names across the catalog.
    pub fn platforms(&self) -> Result<Vec<String>, SearchError> {
        let mut names: Vec<String> = self
            .store
            .games()?
            .into_iter()
            .flat_map(|g| g.platforms.into_iter().map(|p| p.name))
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Sorted distinct genres across the catalog.
    pub fn genres(&self) -> Result<Vec<String>, SearchError> {
        let mut genres: Vec<String> = self
            .store
            .games()?
            .into_iter()
            .flat_map(|g| g.genres)
            .collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }
}
