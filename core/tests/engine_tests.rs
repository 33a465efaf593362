use gamedex_core::{DocumentStore, Filters, Game, Platform, SearchEngine, SledStore, SortMode};
use tempfile::tempdir;

fn catalog() -> Vec<Game> {
    let mut a = Game::new(1, "Racing Game");
    a.description = Some("High speed racing on city streets".into());
    a.genres.push("Racing".into());
    a.platforms.push(Platform { name: "PC".into() });
    a.rating = Some(4.5);
    a.released = Some("2020-03-14".into());

    let mut b = Game::new(2, "Racing Legends");
    b.genres.push("Racing".into());
    b.platforms.push(Platform { name: "PlayStation 5".into() });
    b.released = Some("2021-11-02".into());

    let mut c = Game::new(3, "Puzzle Game");
    c.genres.push("Puzzle".into());
    c.platforms.push(Platform { name: "PC".into() });
    c.rating = Some(3.9);

    vec![a, b, c]
}

// The TempDir must outlive the engine or sled loses its backing files.
fn engine() -> (tempfile::TempDir, SearchEngine<SledStore>) {
    let dir = tempdir().unwrap();
    let store = SledStore::open(dir.path()).unwrap();
    let mut engine = SearchEngine::new(store);
    let games = catalog();
    engine.rebuild(games.iter()).unwrap();
    (dir, engine)
}

#[test]
fn racing_query_ranks_racing_games_and_omits_puzzle() {
    let (_dir, engine) = engine();
    let hits = engine
        .search("racing", &Filters::default(), SortMode::Relevance)
        .unwrap();
    let ids: Vec<u64> = hits.iter().map(|h| h.game.id).collect();
    assert!(ids.contains(&1));
    assert!(ids.contains(&2));
    assert!(!ids.contains(&3), "non-matching game must be absent, not scored 0");
    assert!(hits.iter().all(|h| h.relevance_score > 0.0));
    assert!(hits.iter().all(|h| !h.matched_terms.is_empty()));
}

#[test]
fn empty_query_is_ok_and_empty() {
    let (_dir, engine) = engine();
    let hits = engine
        .search("", &Filters::default(), SortMode::Relevance)
        .unwrap();
    assert!(hits.is_empty());

    // Stopword-only queries normalize to nothing as well.
    let hits = engine
        .search("the and of", &Filters::default(), SortMode::Relevance)
        .unwrap();
    assert!(hits.is_empty());
}

#[test]
fn genre_filter_matching_nothing_is_empty_not_error() {
    let (_dir, engine) = engine();
    let filters = Filters { genre: Some("Horror".into()), ..Filters::default() };
    let hits = engine.search("racing", &filters, SortMode::Relevance).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn platform_filter_preserves_rank_order_of_survivors() {
    let (_dir, engine) = engine();
    let filters = Filters { platform: Some("PC".into()), ..Filters::default() };
    let hits = engine.search("game racing", &filters, SortMode::Relevance).unwrap();
    let ids: Vec<u64> = hits.iter().map(|h| h.game.id).collect();
    // Game 2 is PlayStation-only and filtered out; survivors keep order.
    assert!(!ids.contains(&2));
    let scores: Vec<f32> = hits.iter().map(|h| h.relevance_score).collect();
    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(scores, sorted);
}

#[test]
fn min_rating_filter_excludes_unrated_games() {
    let (_dir, engine) = engine();
    let filters = Filters { min_rating: Some(4.0), ..Filters::default() };
    let hits = engine.search("racing", &filters, SortMode::Relevance).unwrap();
    let ids: Vec<u64> = hits.iter().map(|h| h.game.id).collect();
    // Game 2 has no rating and cannot satisfy the floor.
    assert_eq!(ids, vec![1]);
}

#[test]
fn rating_sort_puts_unrated_last() {
    let (_dir, engine) = engine();
    let hits = engine
        .search("racing", &Filters::default(), SortMode::Rating)
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].game.id, 1); // rated 4.5
    assert_eq!(hits[1].game.id, 2); // unrated, treated as 0
}

#[test]
fn release_date_sort_is_descending() {
    let (_dir, engine) = engine();
    let hits = engine
        .search("racing", &Filters::default(), SortMode::ReleaseDate)
        .unwrap();
    let ids: Vec<u64> = hits.iter().map(|h| h.game.id).collect();
    assert_eq!(ids, vec![2, 1]); // 2021 before 2020
}

#[test]
fn unknown_sort_mode_falls_back_to_relevance() {
    assert_eq!(SortMode::parse("freshness"), SortMode::Relevance);
    assert_eq!(SortMode::parse("rating"), SortMode::Rating);
    assert_eq!(SortMode::parse("release_date"), SortMode::ReleaseDate);
}

#[test]
fn reopening_the_store_restores_the_index() {
    let dir = tempdir().unwrap();
    {
        let store = SledStore::open(dir.path()).unwrap();
        let mut engine = SearchEngine::new(store);
        let games = catalog();
        engine.rebuild(games.iter()).unwrap();
        engine.store().close().unwrap();
    }
    let store = SledStore::open(dir.path()).unwrap();
    let engine = SearchEngine::open(store).unwrap();
    assert!(engine.index().is_finalized());
    let hits = engine
        .search("puzzle", &Filters::default(), SortMode::Relevance)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].game.id, 3);
}

#[test]
fn catalog_listings_are_sorted_and_distinct() {
    let (_dir, engine) = engine();
    assert_eq!(engine.platforms().unwrap(), vec!["PC".to_string(), "PlayStation 5".to_string()]);
    assert_eq!(engine.genres().unwrap(), vec!["Puzzle".to_string(), "Racing".to_string()]);
}

#[test]
fn ranked_id_missing_from_store_is_dropped() {
    let dir = tempdir().unwrap();
    let store = SledStore::open(dir.path()).unwrap();
    let mut engine = SearchEngine::new(store);
    let games = catalog();
    engine.rebuild(games.iter()).unwrap();
    // Simulate index/store drift: wipe documents but keep the in-memory
    // index populated.
    engine.store().clear().unwrap();
    let hits = engine
        .search("racing", &Filters::default(), SortMode::Relevance)
        .unwrap();
    assert!(hits.is_empty());
}
