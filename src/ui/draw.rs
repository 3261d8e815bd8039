use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

use super::format::{
    overall_color, refresh_note, score_percent, sentiment_color, summary_detail, summary_heading,
    EMPTY_TEXT, LOADING_TEXT, THUMBNAIL_MARKER,
};
use crate::app::news::{Article, Category};
use crate::app::view::ViewState;

const KEY_HINTS: &str = "←/→ category  1-7 jump  r refresh  ↑/↓ scroll  q quit";

/// Terminal-only state that survives between frames.
#[derive(Debug, Default)]
pub struct Screen {
    pub list: ListState,
    pub refresh_interval: Duration,
}

impl Screen {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            list: ListState::default(),
            refresh_interval,
        }
    }

    pub fn scroll_down(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let next = self.list.selected().map_or(0, |index| (index + 1).min(len - 1));
        self.list.select(Some(next));
    }

    pub fn scroll_up(&mut self) {
        let previous = self.list.selected().map_or(0, |index| index.saturating_sub(1));
        self.list.select(Some(previous));
    }

    pub fn reset_scroll(&mut self) {
        self.list = ListState::default();
    }

    /// Keeps the selection inside a list that may have been replaced.
    fn clamp(&mut self, len: usize) {
        match (self.list.selected(), len) {
            (_, 0) => self.list.select(None),
            (Some(index), len) if index >= len => self.list.select(Some(len - 1)),
            (None, _) => self.list.select(Some(0)),
            _ => {}
        }
    }
}

pub fn draw(f: &mut Frame, state: &ViewState, screen: &mut Screen) {
    let mut constraints = vec![Constraint::Length(3), Constraint::Length(1)];
    if state.error.is_some() {
        constraints.push(Constraint::Length(3));
    }
    if state.summary.is_some() {
        constraints.push(Constraint::Length(4));
    }
    if state.loading {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());
    let mut areas = chunks.iter().copied();
    let mut next_area = || areas.next().unwrap_or_default();

    render_categories(f, next_area(), state.category);
    render_note(f, next_area(), screen.refresh_interval);
    if let Some(error) = &state.error {
        render_error(f, next_area(), error);
    }
    if state.summary.is_some() {
        render_summary(f, next_area(), state);
    }
    if state.loading {
        let loading = Paragraph::new(Span::styled(
            LOADING_TEXT,
            Style::default().fg(Color::Yellow),
        ));
        f.render_widget(loading, next_area());
    }
    render_articles(f, next_area(), &state.articles, screen);
}

fn render_categories(f: &mut Frame, area: Rect, selected: Category) {
    let titles: Vec<&str> = Category::ALL.iter().map(|category| category.title()).collect();
    let tabs = Tabs::new(titles)
        .select(selected.index())
        .block(Block::default().borders(Borders::ALL).title(" NEWS FLASH! "))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );
    f.render_widget(tabs, area);
}

fn render_note(f: &mut Frame, area: Rect, refresh_interval: Duration) {
    let note = Line::from(vec![
        Span::styled(refresh_note(refresh_interval), Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(note), area);
}

fn render_error(f: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(Span::styled(
        error.to_string(),
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(banner, area);
}

fn render_summary(f: &mut Frame, area: Rect, state: &ViewState) {
    let Some(summary) = &state.summary else {
        return;
    };
    let color = overall_color(summary.overall_label);
    let text = Text::from(vec![
        Line::from(Span::styled(
            summary_heading(summary, state.category.as_str()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(summary_detail(summary)),
    ]);
    let banner = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(banner, area);
}

fn render_articles(f: &mut Frame, area: Rect, articles: &[Article], screen: &mut Screen) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} headlines ", articles.len()));

    if articles.is_empty() {
        screen.clamp(0);
        let empty = Paragraph::new(Span::styled(EMPTY_TEXT, Style::default().fg(Color::DarkGray)))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    screen.clamp(articles.len());
    let items: Vec<ListItem> = articles.iter().map(article_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_symbol("> ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut screen.list);
}

fn article_item(article: &Article) -> ListItem<'static> {
    let mut title = Vec::new();
    if article.thumbnail().is_some() {
        title.push(Span::styled(
            format!("{THUMBNAIL_MARKER} "),
            Style::default().fg(Color::Magenta),
        ));
    }
    title.push(Span::styled(
        article.title.clone(),
        Style::default().add_modifier(Modifier::UNDERLINED),
    ));

    let mut lines = vec![
        Line::from(title),
        Line::from(Span::styled(
            format!("  {}", article.url),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(sentiment) = &article.sentiment {
        let mut spans = vec![
            Span::raw("  Sentiment: "),
            Span::styled(
                sentiment.label().to_string(),
                Style::default()
                    .fg(sentiment_color(sentiment))
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(score) = article.score {
            spans.push(Span::raw(format!(" ({})", score_percent(score))));
        }
        lines.push(Line::from(spans));
    }
    if let Some(source) = article.source_name() {
        lines.push(Line::from(Span::styled(
            format!("  - {source}"),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::default());
    ListItem::new(Text::from(lines))
}
