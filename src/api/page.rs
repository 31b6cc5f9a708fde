use minijinja::Environment;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{FilterMethod, RankingSource, RecommendationSet},
};

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("index.html", include_str!("../../templates/index.html"))
        .expect("index template parses");
    env
});

/// Everything the single-page form needs to render
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub movie_count: usize,
    pub titles: Vec<&'a str>,
    pub model_loaded: bool,
    pub query: &'a str,
    pub method: FilterMethod,
    pub source: RankingSource,
    pub result: Option<RecommendationSet>,
    pub error: Option<String>,
    pub suggestions: Vec<String>,
}

impl<'a> PageContext<'a> {
    /// Records a failed lookup so the page shows it inline
    pub fn with_error(mut self, error: AppError) -> Self {
        if let AppError::NoMatch { suggestions, .. } = &error {
            self.suggestions = suggestions.clone();
        }
        self.error = Some(error.to_string());
        self
    }
}

/// Renders the page; values are HTML-escaped by the template engine
pub fn render(context: &PageContext<'_>) -> AppResult<String> {
    TEMPLATES
        .get_template("index.html")
        .and_then(|template| template.render(context))
        .map_err(|e| AppError::Internal(format!("Failed to render page: {}", e)))
}
