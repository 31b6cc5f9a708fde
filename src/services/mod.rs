pub mod features;
pub mod model;
pub mod recommendations;
pub mod similarity;
pub mod title_search;

pub use model::{ModelSummary, RankingModel};
pub use recommendations::{Recommender, RecommenderSettings};
