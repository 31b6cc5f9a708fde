use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// How similarity between two movies is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterMethod {
    /// Cosine similarity over budget, popularity and vote columns
    #[serde(rename = "collaborative")]
    Collaborative,
    /// Cosine similarity over word counts of a text column
    #[serde(rename = "content-based")]
    ContentBased,
}

impl FilterMethod {
    pub const ALL: [FilterMethod; 2] = [FilterMethod::Collaborative, FilterMethod::ContentBased];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMethod::Collaborative => "collaborative",
            FilterMethod::ContentBased => "content-based",
        }
    }
}

impl Display for FilterMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text column vectorized for content-based filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentField {
    #[default]
    Genres,
    Overview,
}

/// Where rankings come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingSource {
    /// Computed from the in-memory feature set
    #[default]
    Live,
    /// Read from the loaded ranking model
    Model,
}

/// A catalog row and its similarity to some query row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub index: usize,
    pub score: f64,
}

/// A catalog title matched against user input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleMatch {
    pub index: usize,
    pub title: String,
    pub score: f64,
}

/// One recommended movie, `rank` starting at 1
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub rank: usize,
    pub index: usize,
    pub title: String,
    pub score: f64,
}

/// Result of a recommendation request
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationSet {
    /// Title as typed by the user
    pub query: String,
    /// Catalog title the query resolved to
    pub matched_title: String,
    pub method: FilterMethod,
    pub source: RankingSource,
    pub recommendations: Vec<Recommendation>,
}
