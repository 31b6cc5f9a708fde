//! Feature extraction for the two filtering methods
use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    db::Catalog,
    models::{ContentField, Movie},
    services::similarity::{FeatureMatrix, SparseVector},
};

/// Runs of two or more word characters
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Lowercased tokens of `text` in order of appearance
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Bag-of-words vectorizer over a fixed vocabulary
///
/// Vocabulary terms are numbered in alphabetical order.
#[derive(Debug, Clone, Default)]
pub struct CountVectorizer {
    vocabulary: BTreeMap<String, usize>,
}

impl CountVectorizer {
    /// Learns the vocabulary of a corpus
    pub fn fit<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: BTreeSet<String> = documents
            .into_iter()
            .flat_map(|doc| tokenize(doc.as_ref()))
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Self { vocabulary }
    }

    /// Token counts of `document`; terms outside the vocabulary are dropped
    pub fn transform(&self, document: &str) -> SparseVector {
        SparseVector::from_pairs(
            tokenize(document)
                .iter()
                .filter_map(|token| self.vocabulary.get(token))
                .map(|&index| (index, 1.0)),
        )
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }
}

/// Text a movie contributes to content-based filtering
pub fn content_text(movie: &Movie, field: ContentField) -> String {
    match field {
        ContentField::Genres => movie.genre_text(),
        ContentField::Overview => movie.overview.clone(),
    }
}

/// Feature rows for collaborative filtering: raw numeric columns
pub fn numeric_features(catalog: &Catalog) -> FeatureMatrix {
    FeatureMatrix::new(
        catalog
            .movies()
            .iter()
            .map(|movie| SparseVector::from_dense(&movie.numeric_features()))
            .collect(),
    )
}

/// Feature rows for content-based filtering: word counts of one text column
pub fn text_features(catalog: &Catalog, field: ContentField) -> (CountVectorizer, FeatureMatrix) {
    let documents: Vec<String> = catalog
        .movies()
        .iter()
        .map(|movie| content_text(movie, field))
        .collect();

    let vectorizer = CountVectorizer::fit(&documents);
    let rows = documents
        .iter()
        .map(|doc| vectorizer.transform(doc))
        .collect();

    (vectorizer, FeatureMatrix::new(rows))
}
