use std::fmt::Write as _;
use std::time::Duration;

use super::format::{
    refresh_note, sentiment_text, summary_detail, summary_heading, EMPTY_TEXT, LOADING_TEXT,
    THUMBNAIL_MARKER,
};
use crate::app::news::Category;
use crate::app::view::ViewState;

/// Renders the view as plain text, in the same order as the terminal view.
pub fn render_plain(state: &ViewState, refresh_interval: Duration) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "NEWS FLASH!");
    let _ = writeln!(out, "Category: {}", category_bar(state.category));
    let _ = writeln!(out, "{}", refresh_note(refresh_interval));

    if let Some(error) = &state.error {
        let _ = writeln!(out, "\n! {error}");
    }
    if let Some(summary) = &state.summary {
        let _ = writeln!(out, "\n{}", summary_heading(summary, state.category.as_str()));
        let _ = writeln!(out, "{}", summary_detail(summary));
    }
    if state.loading {
        let _ = writeln!(out, "\n{LOADING_TEXT}");
    }

    let _ = writeln!(out);
    if state.articles.is_empty() {
        let _ = writeln!(out, "{EMPTY_TEXT}");
    }
    for (index, article) in state.articles.iter().enumerate() {
        let marker = if article.thumbnail().is_some() {
            format!("{THUMBNAIL_MARKER} ")
        } else {
            String::new()
        };
        let _ = writeln!(out, "{:>2}. {marker}{}", index + 1, article.title);
        let _ = writeln!(out, "    {}", article.url);
        if let Some(sentiment) = sentiment_text(article) {
            let _ = writeln!(out, "    Sentiment: {sentiment}");
        }
        if let Some(source) = article.source_name() {
            let _ = writeln!(out, "    - {source}");
        }
    }
    out
}

fn category_bar(selected: Category) -> String {
    Category::ALL
        .iter()
        .map(|category| {
            if *category == selected {
                format!("[{}]", category.title())
            } else {
                category.title().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
