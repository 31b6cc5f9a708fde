use crate::{
    config::Config,
    db::Catalog,
    error::{AppError, AppResult},
    models::{
        ContentField, FilterMethod, Neighbor, RankingSource, Recommendation, RecommendationSet,
        TitleMatch,
    },
    services::{
        features::{numeric_features, text_features},
        model::RankingModel,
        similarity::{rank_all, top_neighbors, FeatureMatrix},
        title_search::{close_matches, find_closest_match, DEFAULT_CUTOFF},
    },
};

/// Number of alternatives offered when a title has no match
const SUGGESTION_LIMIT: usize = 5;

/// Tunables for title matching and ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommenderSettings {
    pub fuzzy_cutoff: f64,
    pub top_n: usize,
    pub content_field: ContentField,
    pub min_vote_count: u64,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: DEFAULT_CUTOFF,
            top_n: 10,
            content_field: ContentField::Genres,
            min_vote_count: 0,
        }
    }
}

impl From<&Config> for RecommenderSettings {
    fn from(config: &Config) -> Self {
        Self {
            fuzzy_cutoff: config.fuzzy_cutoff,
            top_n: config.top_n,
            content_field: config.content_field,
            min_vote_count: config.min_vote_count,
        }
    }
}

/// Resolves user titles and ranks similar movies
///
/// Feature rows for both filtering methods are built once up front; each
/// request only computes the query row against the catalog.
pub struct Recommender {
    catalog: Catalog,
    settings: RecommenderSettings,
    numeric: FeatureMatrix,
    text: FeatureMatrix,
}

impl Recommender {
    pub fn new(catalog: Catalog, settings: RecommenderSettings) -> Self {
        let numeric = numeric_features(&catalog);
        let (vectorizer, text) = text_features(&catalog, settings.content_field);

        tracing::info!(
            movies = catalog.len(),
            vocabulary = vectorizer.vocabulary().len(),
            content_field = ?settings.content_field,
            "Built feature matrices"
        );

        Self {
            catalog,
            settings,
            numeric,
            text,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    fn features(&self, method: FilterMethod) -> &FeatureMatrix {
        match method {
            FilterMethod::Collaborative => &self.numeric,
            FilterMethod::ContentBased => &self.text,
        }
    }

    /// Whether `index` may be recommended under `method`
    ///
    /// Collaborative filtering only recommends movies with enough votes.
    pub fn is_eligible(&self, method: FilterMethod, index: usize) -> bool {
        match method {
            FilterMethod::Collaborative => self
                .catalog
                .get(index)
                .map(|movie| movie.votes() >= self.settings.min_vote_count as f64)
                .unwrap_or(false),
            FilterMethod::ContentBased => true,
        }
    }

    /// Matches user input to a catalog title
    pub fn resolve_title(&self, query: &str) -> AppResult<TitleMatch> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Please enter the title of a movie".to_string(),
            ));
        }

        match find_closest_match(query, self.catalog.titles(), self.settings.fuzzy_cutoff) {
            Some(found) => {
                tracing::debug!(query, matched = %found.title, score = found.score, "Closest match found");
                Ok(found)
            }
            None => {
                let suggestions = close_matches(query, self.catalog.titles(), SUGGESTION_LIMIT, 0.0)
                    .into_iter()
                    .map(|m| m.title)
                    .collect();
                Err(AppError::NoMatch {
                    query: query.to_string(),
                    suggestions,
                })
            }
        }
    }

    /// Every catalog row ranked against `index`, the row itself included
    pub fn ranked_with_self(&self, index: usize, method: FilterMethod) -> AppResult<Vec<Neighbor>> {
        let scores = self.features(method).similarity_row(index)?;
        Ok(rank_all(&scores))
    }

    /// Top neighbours of `index` computed from the feature rows
    pub fn neighbors(&self, index: usize, method: FilterMethod) -> AppResult<Vec<Neighbor>> {
        self.neighbors_limited(index, method, self.settings.top_n)
    }

    pub(crate) fn neighbors_limited(
        &self,
        index: usize,
        method: FilterMethod,
        limit: usize,
    ) -> AppResult<Vec<Neighbor>> {
        let scores = self.features(method).similarity_row(index)?;
        Ok(top_neighbors(&scores, index, limit, |candidate| {
            self.is_eligible(method, candidate)
        }))
    }

    /// Recommends movies similar to `query` using live similarity scores
    pub fn recommend(&self, query: &str, method: FilterMethod) -> AppResult<RecommendationSet> {
        let found = self.resolve_title(query)?;
        let neighbors = self.neighbors(found.index, method)?;
        self.to_recommendation_set(query, found, method, RankingSource::Live, &neighbors)
    }

    /// Recommends movies similar to `query` using a precomputed ranking model
    pub fn recommend_from_model(
        &self,
        query: &str,
        method: FilterMethod,
        model: &RankingModel,
    ) -> AppResult<RecommendationSet> {
        let found = self.resolve_title(query)?;
        let neighbors = model.neighbors(method, found.index)?;
        let limit = neighbors.len().min(self.settings.top_n);
        self.to_recommendation_set(
            query,
            found,
            method,
            RankingSource::Model,
            &neighbors[..limit],
        )
    }

    fn to_recommendation_set(
        &self,
        query: &str,
        found: TitleMatch,
        method: FilterMethod,
        source: RankingSource,
        neighbors: &[Neighbor],
    ) -> AppResult<RecommendationSet> {
        let recommendations = neighbors
            .iter()
            .enumerate()
            .map(|(position, neighbor)| -> AppResult<Recommendation> {
                let movie = self.catalog.get(neighbor.index).ok_or(AppError::IndexOutOfRange {
                    index: neighbor.index,
                    len: self.catalog.len(),
                })?;
                Ok(Recommendation {
                    rank: position + 1,
                    index: neighbor.index,
                    title: movie.title.clone(),
                    score: neighbor.score,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::info!(
            query,
            matched = %found.title,
            method = %method,
            source = ?source,
            results = recommendations.len(),
            "Recommendations ready"
        );

        Ok(RecommendationSet {
            query: query.to_string(),
            matched_title: found.title,
            method,
            source,
            recommendations,
        })
    }
}
