use ratatui::style::Color;

use crate::app::news::{Article, OverallLabel, Sentiment, Summary};

pub const LOADING_TEXT: &str = "Loading latest headlines...";
pub const EMPTY_TEXT: &str = "No headlines for this category yet.";
pub const THUMBNAIL_MARKER: &str = "[img]";

pub fn sentiment_color(sentiment: &Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Negative => Color::Red,
        Sentiment::Neutral | Sentiment::Other(_) => Color::Gray,
    }
}

pub fn overall_color(label: OverallLabel) -> Color {
    match label {
        OverallLabel::Positive => Color::Green,
        OverallLabel::Negative => Color::Red,
        OverallLabel::Neutral => Color::Gray,
    }
}

/// `97.3%` for a score of `0.973`.
pub fn score_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Label and confidence, e.g. `POSITIVE (97.3%)`. None when the article
/// carries no sentiment.
pub fn sentiment_text(article: &Article) -> Option<String> {
    let sentiment = article.sentiment.as_ref()?;
    Some(match article.score {
        Some(score) => format!("{} ({})", sentiment.label(), score_percent(score)),
        None => sentiment.label().to_string(),
    })
}

/// Heading of the summary banner, e.g. `TECHNOLOGY: Positive`.
pub fn summary_heading(summary: &Summary, fallback_category: &str) -> String {
    let category = if summary.category.trim().is_empty() {
        fallback_category
    } else {
        summary.category.as_str()
    };
    format!(
        "{}: {}",
        category.to_uppercase(),
        summary.overall_label.as_str()
    )
}

pub fn summary_detail(summary: &Summary) -> String {
    let mut detail = format!("Avg Sentiment: {:.4}", summary.average_sentiment);
    if let (Some(positive), Some(negative)) = (summary.positive_count, summary.negative_count) {
        detail.push_str(&format!("  ({positive} positive / {negative} negative)"));
    }
    detail
}

pub fn refresh_note(interval: std::time::Duration) -> String {
    let secs = interval.as_secs();
    let every = match secs {
        0 => format!("{} ms", interval.as_millis()),
        secs if secs % 3600 == 0 => plural(secs / 3600, "hour"),
        secs if secs % 60 == 0 => plural(secs / 60, "minute"),
        secs => plural(secs, "second"),
    };
    format!("Auto-refreshing every {every}")
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}
