use serde::{Deserialize, Serialize};

/// One catalog row
///
/// Numeric cells that are blank or unparseable load as `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Movie {
    pub title: String,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub budget: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub popularity: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub vote_average: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub vote_count: Option<f64>,
    pub genres: String,
    pub overview: String,
}

/// Entry of the TMDB genre list, e.g. `{"id": 28, "name": "Action"}`
#[derive(Debug, Deserialize)]
struct GenreEntry {
    name: String,
}

impl Movie {
    /// Numeric features in a fixed order: budget, popularity, vote average, vote count
    ///
    /// Missing and non-finite values count as zero.
    pub fn numeric_features(&self) -> [f64; 4] {
        [
            self.budget,
            self.popularity,
            self.vote_average,
            self.vote_count,
        ]
        .map(|value| value.filter(|v| v.is_finite()).unwrap_or(0.0))
    }

    /// Genres as plain words
    ///
    /// TMDB exports genres as a JSON list of `{id, name}` objects; those are
    /// flattened to their names. Anything else is returned as-is.
    pub fn genre_text(&self) -> String {
        let raw = self.genres.trim();
        if raw.starts_with('[') {
            if let Ok(entries) = serde_json::from_str::<Vec<GenreEntry>>(raw) {
                return entries
                    .into_iter()
                    .map(|entry| entry.name)
                    .collect::<Vec<_>>()
                    .join(" ");
            }
        }
        raw.to_string()
    }

    pub fn votes(&self) -> f64 {
        self.vote_count.unwrap_or(0.0)
    }
}
