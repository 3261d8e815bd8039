use super::news::{Article, Category, FetchError, NewsPayload, Summary};

/// Shown in the error banner for every kind of fetch failure.
pub const FETCH_ERROR_MESSAGE: &str = "Could not load the latest headlines. Will try again shortly.";

/// Identifies one outgoing request. Only the most recently issued ticket may
/// update the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub category: Category,
    pub articles: Vec<Article>,
    pub summary: Option<Summary>,
    pub loading: bool,
    pub error: Option<String>,
    issued: u64,
    in_flight: Option<FetchTicket>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Category::default())
    }
}

impl ViewState {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            articles: Vec::new(),
            summary: None,
            loading: false,
            error: None,
            issued: 0,
            in_flight: None,
        }
    }

    /// Switches category and drops the payload of the previous one. Returns
    /// false when `category` is already selected.
    pub fn select_category(&mut self, category: Category) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category;
        self.articles.clear();
        self.summary = None;
        true
    }

    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        let ticket = FetchTicket {
            id: self.issued,
            category: self.category,
        };
        self.in_flight = Some(ticket);
        self.loading = true;
        ticket
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<NewsPayload, FetchError>,
    ) -> FetchOutcome {
        if self.in_flight != Some(ticket) || ticket.category != self.category {
            return FetchOutcome::Superseded;
        }
        self.in_flight = None;
        self.loading = false;

        match result {
            Ok(payload) => {
                self.articles = payload.articles;
                self.summary = payload.summary;
                self.error = None;
                FetchOutcome::Applied
            }
            Err(_) => {
                self.error = Some(FETCH_ERROR_MESSAGE.to_string());
                FetchOutcome::Failed
            }
        }
    }
}
