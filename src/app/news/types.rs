use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Business,
    Entertainment,
    #[default]
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    /// Selector order.
    pub const ALL: [Category; 7] = [
        Category::Business,
        Category::Entertainment,
        Category::General,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::General => "general",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::General => "General",
            Category::Health => "Health",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::Technology => "Technology",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|category| *category == self)
            .unwrap_or_default()
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| UnknownCategory(raw.to_string()))
    }
}

/// Per-article polarity label. Known labels match case-insensitively; anything
/// else is kept as sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Other(String),
}

impl Sentiment {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "POSITIVE" => Sentiment::Positive,
            "NEGATIVE" => Sentiment::Negative,
            "NEUTRAL" => Sentiment::Neutral,
            _ => Sentiment::Other(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Sentiment::Positive => "POSITIVE",
            Sentiment::Negative => "NEGATIVE",
            Sentiment::Neutral => "NEUTRAL",
            Sentiment::Other(raw) => raw,
        }
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Sentiment::parse(&raw))
    }
}

impl Serialize for Sentiment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(rename = "urlToImage", default)]
    pub url_to_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub source: Option<ArticleSource>,
}

impl Article {
    pub fn source_name(&self) -> Option<&str> {
        self.source
            .as_ref()
            .and_then(|source| source.name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }

    pub fn thumbnail(&self) -> Option<&str> {
        self.url_to_image
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum OverallLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl OverallLabel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "positive" => OverallLabel::Positive,
            "negative" => OverallLabel::Negative,
            _ => OverallLabel::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OverallLabel::Positive => "Positive",
            OverallLabel::Negative => "Negative",
            OverallLabel::Neutral => "Neutral",
        }
    }
}

impl<'de> Deserialize<'de> for OverallLabel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(OverallLabel::parse).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default)]
    pub overall_label: OverallLabel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_sentiment: f64,
    #[serde(default)]
    pub positive_count: Option<u32>,
    #[serde(default)]
    pub negative_count: Option<u32>,
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `GET /news`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsPayload {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub summary: Option<Summary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Sports".parse::<Category>(), Ok(Category::Sports));
        assert_eq!(" technology ".parse::<Category>(), Ok(Category::Technology));
        assert!("weather".parse::<Category>().is_err());
    }

    #[test]
    fn category_cycle_wraps_both_directions() {
        assert_eq!(Category::Technology.next(), Category::Business);
        assert_eq!(Category::Business.previous(), Category::Technology);
        assert_eq!(Category::default(), Category::General);
        assert_eq!(Category::General.index(), 2);
    }

    #[test]
    fn payload_with_missing_fields_uses_defaults() {
        let payload: NewsPayload = serde_json::from_str("{}").expect("empty object must decode");
        assert!(payload.articles.is_empty());
        assert!(payload.summary.is_none());

        let payload: NewsPayload =
            serde_json::from_str(r#"{"summary": null}"#).expect("null summary must decode");
        assert!(payload.summary.is_none());
    }

    #[test]
    fn article_reads_backend_fields() {
        let payload: NewsPayload = serde_json::from_str(
            r#"{
                "category": "science",
                "articles": [
                    {
                        "title": "Comet spotted",
                        "url": "https://example.com/comet",
                        "urlToImage": "https://example.com/comet.jpg",
                        "sentiment": "positive",
                        "score": 0.9731,
                        "sentiment_score": 0.9731,
                        "source": {"id": null, "name": "Example Times"}
                    },
                    {"title": "Bare", "url": "https://example.com/bare", "sentiment": "LABEL_9"}
                ],
                "summary": {
                    "category": "science",
                    "overall_label": "Positive",
                    "average_sentiment": 0.48655,
                    "positive_count": 1,
                    "negative_count": 0
                }
            }"#,
        )
        .expect("backend payload must decode");

        let first = &payload.articles[0];
        assert_eq!(first.sentiment, Some(Sentiment::Positive));
        assert_eq!(first.source_name(), Some("Example Times"));
        assert_eq!(first.thumbnail(), Some("https://example.com/comet.jpg"));

        let second = &payload.articles[1];
        assert_eq!(second.sentiment, Some(Sentiment::Other("LABEL_9".to_string())));
        assert_eq!(second.score, None);
        assert_eq!(second.source_name(), None);

        let summary = payload.summary.expect("summary must be present");
        assert_eq!(summary.overall_label, OverallLabel::Positive);
        assert_eq!(summary.positive_count, Some(1));
    }

    #[test]
    fn unknown_overall_label_is_neutral() {
        let summary: Summary =
            serde_json::from_str(r#"{"category": "health", "overall_label": "Mixed"}"#)
                .expect("summary must decode");
        assert_eq!(summary.overall_label, OverallLabel::Neutral);
        assert_eq!(summary.average_sentiment, 0.0);
    }

    #[test]
    fn explicit_nulls_do_not_reject_the_payload() {
        let payload: NewsPayload = serde_json::from_str(
            r#"{
                "articles": [
                    {"title": null, "url": null, "urlToImage": null, "sentiment": null},
                    {"title": "Kept", "url": "https://example.com/kept"}
                ],
                "summary": {
                    "category": null,
                    "overall_label": null,
                    "average_sentiment": null
                }
            }"#,
        )
        .expect("nulls must decode");

        assert_eq!(payload.articles.len(), 2);
        assert_eq!(payload.articles[0].title, "");
        assert_eq!(payload.articles[0].thumbnail(), None);
        assert_eq!(payload.articles[1].title, "Kept");

        let summary = payload.summary.expect("summary must be present");
        assert_eq!(summary.category, "");
        assert_eq!(summary.overall_label, OverallLabel::Neutral);
        assert_eq!(summary.average_sentiment, 0.0);
    }
}
