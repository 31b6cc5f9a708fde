mod movie;
mod recommendation;

pub use movie::Movie;
pub use recommendation::{
    ContentField, FilterMethod, Neighbor, RankingSource, Recommendation, RecommendationSet,
    TitleMatch,
};
