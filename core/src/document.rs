use crate::error::SearchError;
use serde::{Deserialize, Serialize};

pub type GameId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
}

/// A catalog document. Optional fields are explicit `Option`s; ingestion
/// validates them once so the rest of the pipeline never re-checks.
/// Immutable once indexed, a changed game requires a rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub metacritic: Option<i32>,
    /// Release date as `YYYY-MM-DD`; validated at ingestion, an unparseable
    /// date is dropped to `None` there.
    #[serde(default)]
    pub released: Option<String>,
}

impl Game {
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        Game {
            id,
            name: name.into(),
            description: None,
            genres: Vec::new(),
            tags: Vec::new(),
            platforms: Vec::new(),
            rating: None,
            metacritic: None,
            released: None,
        }
    }

    /// Ingest-time validation. A failing game is skipped by its caller,
    /// never fatal to a batch.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.name.trim().is_empty() {
            return Err(SearchError::Validation(format!("game {}: empty name", self.id)));
        }
        Ok(())
    }

    pub fn has_platform(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p.name == platform)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_absent_optional_fields() {
        let game: Game = serde_json::from_str(r#"{"id": 7, "name": "Tetris"}"#).unwrap();
        assert_eq!(game.id, 7);
        assert_eq!(game.name, "Tetris");
        assert!(game.description.is_none());
        assert!(game.platforms.is_empty());
        assert!(game.rating.is_none());
    }

    #[test]
    fn empty_name_fails_validation() {
        let g = Game::new(1, "  ");
        assert!(g.validate().is_err());
        assert!(Game::new(1, "Halo").validate().is_ok());
    }

    #[test]
    fn platform_and_genre_membership() {
        let mut game = Game::new(1, "Halo");
        game.platforms.push(Platform { name: "Xbox".into() });
        game.genres.push("Shooter".into());
        assert!(game.has_platform("Xbox"));
        assert!(!game.has_platform("PC"));
        assert!(game.has_genre("Shooter"));
        assert!(!game.has_genre("Puzzle"));
    }
}
