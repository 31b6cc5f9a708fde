use serde::Deserialize;

use crate::models::ContentField;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the movie catalog CSV
    #[serde(default = "default_data_path")]
    pub data_path: String,

    /// Path the ranking model is loaded from and saved to
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum similarity a catalog title needs to count as a match
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f64,

    /// Number of recommendations returned per query
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Text column used for content-based filtering
    #[serde(default)]
    pub content_field: ContentField,

    /// Collaborative filtering only recommends movies with at least this many votes
    #[serde(default)]
    pub min_vote_count: u64,
}

fn default_data_path() -> String {
    "data/movies.csv".to_string()
}

fn default_model_path() -> String {
    "movie_recommender_model.json".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_fuzzy_cutoff() -> f64 {
    0.6
}

fn default_top_n() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            model_path: default_model_path(),
            host: default_host(),
            port: default_port(),
            fuzzy_cutoff: default_fuzzy_cutoff(),
            top_n: default_top_n(),
            content_field: ContentField::default(),
            min_vote_count: 0,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Config = envy::from_iter(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        if !(0.0..=1.0).contains(&config.fuzzy_cutoff) {
            anyhow::bail!(
                "FUZZY_CUTOFF must be between 0 and 1, got {}",
                config.fuzzy_cutoff
            );
        }
        if config.top_n == 0 {
            anyhow::bail!("TOP_N must be at least 1");
        }

        Ok(config)
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
