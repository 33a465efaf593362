use crate::document::{Game, GameId};
use crate::field::Field;
use crate::normalize::normalize;
use crate::score::tf_idf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One field-level occurrence record of a term in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub game_id: GameId,
    pub field: Field,
    pub tf: u32,
    /// Token positions in the normalized (pre-dedup) sequence of the field.
    pub positions: Vec<u32>,
    /// Field-weighted TF-IDF. Provisional until `finalize` runs.
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingsList {
    pub postings: Vec<Posting>,
    /// Count of postings referencing this term. Note: a game matching the
    /// term in two fields counts twice, per the index contract; this is not
    /// distinct-document frequency.
    pub document_frequency: u32,
    pub total_occurrences: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub total_docs: u64,
    /// Total postings across all terms.
    pub indexed_terms: u64,
}

impl CorpusStats {
    pub fn avg_terms_per_doc(&self) -> f64 {
        if self.total_docs == 0 {
            0.0
        } else {
            self.indexed_terms as f64 / self.total_docs as f64
        }
    }
}

/// In-memory inverted index over the game catalog.
///
/// Ingestion is two-phase. `index_game`/`index_field` append postings with
/// weights computed against the document frequencies seen *so far*, so
/// mid-ingestion weights reflect a partial corpus. `finalize` recomputes
/// every weight from the stable df and total_docs and must run before any
/// weight is consumed. Postings are append-only: re-ingesting a game id
/// without `clear` duplicates its postings.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    terms: HashMap<String, PostingsList>,
    stats: CorpusStats,
    finalized: bool,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted state.
    pub fn from_parts(terms: HashMap<String, PostingsList>, stats: CorpusStats) -> Self {
        InvertedIndex { terms, stats, finalized: true }
    }

    pub fn postings(&self, term: &str) -> Option<&PostingsList> {
        self.terms.get(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&String, &PostingsList)> {
        self.terms.iter()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn stats(&self) -> CorpusStats {
        self.stats
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Ingest one game across all indexed fields. Absent optional fields
    /// are skipped with a log line; they never fail the batch.
    pub fn index_game(&mut self, game: &Game) {
        self.stats.total_docs += 1;
        self.index_field(game.id, &game.name, Field::Name);
        match &game.description {
            Some(text) => self.index_field(game.id, text, Field::Description),
            None => tracing::debug!(game_id = game.id, "no description, field skipped"),
        }
        for tag in &game.tags {
            self.index_field(game.id, tag, Field::Tag);
        }
        for genre in &game.genres {
            self.index_field(game.id, genre, Field::Genre);
        }
        for platform in &game.platforms {
            self.index_field(game.id, &platform.name, Field::Platform);
        }
    }

    /// Ingest one field of one game: normalize, accumulate per-term tf and
    /// positions from the pre-dedup token sequence, then append one posting
    /// per distinct term.
    ///
    /// The df each weight is computed against is read *before* this call's
    /// own posting lands, so the first occurrence of a term scores 0 until
    /// `finalize` recomputes it.
    pub fn index_field(&mut self, game_id: GameId, text: &str, field: Field) {
        let tokens = normalize(text);
        if tokens.is_empty() {
            return;
        }

        // Term -> (tf, positions), preserving first-occurrence order.
        let mut order: Vec<String> = Vec::new();
        let mut freqs: HashMap<String, (u32, Vec<u32>)> = HashMap::new();
        for (term, pos) in tokens {
            let entry = freqs.entry(term.clone()).or_insert_with(|| {
                order.push(term);
                (0, Vec::new())
            });
            entry.0 += 1;
            entry.1.push(pos);
        }

        let total_docs = self.stats.total_docs;
        let field_weight = field.weight();
        for term in order {
            let (tf, positions) = freqs.remove(&term).unwrap_or_default();
            let list = self.terms.entry(term).or_default();
            let df_now = list.postings.len() as u32;
            let weight = tf_idf(tf, df_now, total_docs) * field_weight;
            list.postings.push(Posting { game_id, field, tf, positions, weight });
            list.document_frequency += 1;
            list.total_occurrences += tf as u64;
            self.stats.indexed_terms += 1;
        }
        self.finalized = false;
    }

    /// Second ingestion phase: recompute every posting's weight from the
    /// now-stable document frequencies and corpus size. Idempotent; running
    /// it twice with no ingestion in between changes nothing.
    pub fn finalize(&mut self) {
        let total_docs = self.stats.total_docs;
        for list in self.terms.values_mut() {
            let df = list.postings.len() as u32;
            list.document_frequency = df;
            for posting in &mut list.postings {
                posting.weight = tf_idf(posting.tf, df, total_docs) * posting.field.weight();
            }
        }
        self.finalized = true;
        tracing::debug!(total_docs, num_terms = self.terms.len(), "finalized corpus weights");
    }

    /// Drop all postings and statistics. Required before re-ingesting any
    /// game id; without it ingestion appends duplicate postings.
    pub fn clear(&mut self) {
        self.terms.clear();
        self.stats = CorpusStats::default();
        self.finalized = false;
    }
}
