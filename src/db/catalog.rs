use std::{fs::File, io::Read, path::Path};

use crate::{
    error::{AppError, AppResult},
    models::Movie,
};

/// Columns every catalog CSV must carry
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "title",
    "budget",
    "popularity",
    "vote_average",
    "vote_count",
    "genres",
    "overview",
];

/// In-memory movie catalog
///
/// Row position in the source file is the catalog index used everywhere else.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
}

impl Catalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// Loads the catalog from a CSV file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AppError::DataFileNotFound(path.display().to_string()));
        }

        let catalog = Self::from_reader(File::open(path)?)?;

        tracing::info!(
            path = %path.display(),
            movies = catalog.len(),
            "Loaded movie catalog"
        );

        Ok(catalog)
    }

    /// Parses catalog rows from any CSV source with a header line
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv.headers()?.clone();
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|header| header == **column))
        {
            return Err(AppError::MissingColumn(missing.to_string()));
        }

        let movies = csv
            .deserialize::<Movie>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { movies })
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.movies.iter().map(|movie| movie.title.as_str())
    }

    /// Index of the first row carrying exactly this title
    pub fn position(&self, title: &str) -> Option<usize> {
        self.movies.iter().position(|movie| movie.title == title)
    }
}
