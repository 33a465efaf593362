use crate::document::GameId;
use crate::index::InvertedIndex;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub game_id: GameId,
    /// Sum of the weights of every matching posting. A game matching one
    /// term in two fields accumulates both contributions; preserved as the
    /// literal scoring contract.
    pub score: f32,
    /// Distinct query terms that contributed, sorted.
    pub matched_terms: Vec<String>,
}

/// Resolve query terms against the index and merge per-game scores.
///
/// Terms with no postings contribute nothing; an empty term list or a query
/// matching nothing yields an empty Vec, never an error. Games with no
/// matching posting are absent from the output rather than present with a
/// zero score. Ordering is score descending with game id ascending as the
/// deterministic tie-break.
pub fn rank(index: &InvertedIndex, terms: &[String]) -> Vec<RankedResult> {
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scores: HashMap<GameId, f32> = HashMap::new();
    let mut matched: HashMap<GameId, BTreeSet<&str>> = HashMap::new();
    for term in terms {
        let Some(list) = index.postings(term) else { continue };
        for posting in &list.postings {
            *scores.entry(posting.game_id).or_insert(0.0) += posting.weight;
            matched.entry(posting.game_id).or_default().insert(term.as_str());
        }
    }

    let mut results: Vec<RankedResult> = scores
        .into_iter()
        .map(|(game_id, score)| RankedResult {
            game_id,
            score,
            matched_terms: matched
                .remove(&game_id)
                .unwrap_or_default()
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
        .collect();
    results.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.game_id.cmp(&b.game_id))
    });
    results
}
