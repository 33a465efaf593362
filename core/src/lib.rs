pub mod document;
pub mod error;
pub mod field;
pub mod index;
pub mod normalize;
pub mod rank;
pub mod score;
pub mod search;
pub mod store;

pub use document::{Game, GameId, Platform};
pub use error::SearchError;
pub use field::Field;
pub use index::{CorpusStats, InvertedIndex, Posting, PostingsList};
pub use rank::RankedResult;
pub use search::{Filters, SearchEngine, SearchHit, SortMode};
pub use store::{DocumentStore, SledStore};
