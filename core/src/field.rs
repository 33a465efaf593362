use serde::{Deserialize, Serialize};

/// Indexed document fields. Each carries a static importance multiplier
/// applied on top of the raw TF-IDF score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Description,
    Tag,
    Genre,
    Platform,
}

pub const DEFAULT_WEIGHT: f32 = 1.0;

impl Field {
    /// Static weight table: game names dominate, descriptions follow,
    /// platform names contribute least.
    pub fn weight(self) -> f32 {
        match self {
            Field::Name => 2.0,
            Field::Description => 1.5,
            Field::Tag => 1.0,
            Field::Genre => 1.0,
            Field::Platform => 0.8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Tag => "tag",
            Field::Genre => "genre",
            Field::Platform => "platform",
        }
    }

    pub fn parse(name: &str) -> Option<Field> {
        match name {
            "name" => Some(Field::Name),
            "description" => Some(Field::Description),
            "tag" => Some(Field::Tag),
            "genre" => Some(Field::Genre),
            "platform" => Some(Field::Platform),
            _ => None,
        }
    }
}

/// Weight for a field named by string. Unknown names default to 1.0 with a
/// log line; a misconfigured field name is never fatal.
pub fn weight_for(name: &str) -> f32 {
    match Field::parse(name) {
        Some(field) => field.weight(),
        None => {
            tracing::warn!(field = name, "unknown field name, defaulting weight to 1.0");
            DEFAULT_WEIGHT
        }
    }
}
