pub mod fetcher;
pub mod types;

pub use fetcher::{FetchError, NewsClient};
pub use types::{Article, ArticleSource, Category, NewsPayload, OverallLabel, Sentiment, Summary};
