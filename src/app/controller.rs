use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::news::{Category, FetchError, NewsClient, NewsPayload};
use super::view::{FetchOutcome, FetchTicket, ViewState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectCategory(Category),
    Refresh,
    Shutdown,
}

#[derive(Debug, thiserror::Error)]
#[error("news controller has stopped")]
pub struct ControllerClosed;

/// Front-end side of a running controller.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ViewState>,
}

impl ControllerHandle {
    pub async fn send(&self, command: Command) -> Result<(), ControllerClosed> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ControllerClosed)
    }

    /// For callers outside the runtime, such as the terminal loop.
    pub fn blocking_send(&self, command: Command) -> Result<(), ControllerClosed> {
        self.commands
            .blocking_send(command)
            .map_err(|_| ControllerClosed)
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }
}

struct FetchCompletion {
    ticket: FetchTicket,
    result: Result<NewsPayload, FetchError>,
}

pub struct NewsController {
    client: NewsClient,
    refresh_interval: Duration,
    state: ViewState,
    published: watch::Sender<ViewState>,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<FetchCompletion>,
}

impl NewsController {
    /// Starts the controller on the current runtime. The first fetch is issued
    /// immediately.
    pub fn spawn(
        client: NewsClient,
        category: Category,
        refresh_interval: Duration,
    ) -> (ControllerHandle, JoinHandle<()>) {
        let state = ViewState::new(category);
        let (published, state_rx) = watch::channel(state.clone());
        let (commands_tx, commands) = mpsc::channel(16);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let controller = Self {
            client,
            refresh_interval,
            state,
            published,
            commands,
            completions_tx,
            completions_rx,
        };
        let join_handle = tokio::spawn(controller.run());

        (
            ControllerHandle {
                commands: commands_tx,
                state: state_rx,
            },
            join_handle,
        )
    }

    async fn run(mut self) {
        info!(
            endpoint = %self.client.endpoint(),
            category = %self.state.category,
            "Starting news controller (refresh interval: {:?})",
            self.refresh_interval
        );
        self.start_fetch();
        let mut ticker = refresh_ticker(self.refresh_interval);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::SelectCategory(category)) => {
                        if self.state.select_category(category) {
                            info!(category = %category, "Category changed");
                            self.start_fetch();
                            ticker = refresh_ticker(self.refresh_interval);
                        }
                    }
                    Some(Command::Refresh) => self.start_fetch(),
                    Some(Command::Shutdown) | None => break,
                },
                _ = ticker.tick() => {
                    debug!(category = %self.state.category, "Scheduled refresh");
                    self.start_fetch();
                }
                Some(completion) = self.completions_rx.recv() => {
                    self.finish_fetch(completion);
                }
            }
        }

        info!("News controller stopped");
    }

    fn start_fetch(&mut self) {
        let ticket = self.state.begin_fetch();
        self.publish();

        let client = self.client.clone();
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = client.fetch_news(ticket.category).await;
            let _ = completions.send(FetchCompletion { ticket, result });
        });
    }

    fn finish_fetch(&mut self, completion: FetchCompletion) {
        let FetchCompletion { ticket, result } = completion;
        if let Err(err) = &result {
            warn!(category = %ticket.category, request = ticket.id, "Failed to fetch news: {err}");
        }

        match self.state.complete_fetch(ticket, result) {
            FetchOutcome::Applied => {
                info!(
                    category = %ticket.category,
                    articles = self.state.articles.len(),
                    "News updated"
                );
            }
            FetchOutcome::Failed => {}
            FetchOutcome::Superseded => {
                debug!(category = %ticket.category, request = ticket.id, "Dropping superseded response");
                return;
            }
        }
        self.publish();
    }

    fn publish(&self) {
        self.published.send_replace(self.state.clone());
    }
}

/// The first tick fires one full period from now; the immediate fetch is
/// issued separately.
fn refresh_ticker(period: Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::news::fetcher::tests::{spawn_mock_backend, Reply, SAMPLE_PAYLOAD};
    use crate::app::view::FETCH_ERROR_MESSAGE;

    const LONG_INTERVAL: Duration = Duration::from_secs(600);

    fn client(base_url: &str) -> NewsClient {
        NewsClient::new(base_url, Duration::from_secs(5)).expect("client builds")
    }

    /// Waits until the published state satisfies `predicate`.
    async fn wait_for<F>(handle: &ControllerHandle, predicate: F) -> ViewState
    where
        F: Fn(&ViewState) -> bool,
    {
        let mut receiver = handle.subscribe();
        let state = time::timeout(
            Duration::from_secs(5),
            receiver.wait_for(|state| predicate(state)),
        )
        .await
        .expect("state should settle in time")
        .expect("controller should be running")
        .clone();
        state
    }

    #[tokio::test]
    async fn fetches_once_on_start() {
        let (base_url, backend, server_task) =
            spawn_mock_backend(Reply::Json(SAMPLE_PAYLOAD.to_string())).await;
        let (handle, controller_task) =
            NewsController::spawn(client(&base_url), Category::Technology, LONG_INTERVAL);

        let state = wait_for(&handle, |state| !state.articles.is_empty()).await;
        assert!(!state.loading);
        assert_eq!(state.articles.len(), 2);
        assert!(state.summary.is_some());
        assert_eq!(backend.requested_categories(), vec!["technology".to_string()]);

        handle.send(Command::Shutdown).await.expect("shutdown sends");
        controller_task.await.expect("controller exits cleanly");
        server_task.abort();
    }

    #[tokio::test]
    async fn each_category_change_triggers_exactly_one_fetch() {
        let (base_url, backend, server_task) =
            spawn_mock_backend(Reply::Json(SAMPLE_PAYLOAD.to_string())).await;
        let (handle, controller_task) =
            NewsController::spawn(client(&base_url), Category::General, LONG_INTERVAL);
        wait_for(&handle, |state| !state.loading && state.summary.is_some()).await;

        let mut expected = vec!["general".to_string()];
        for category in Category::ALL {
            if category == Category::General {
                continue;
            }
            handle
                .send(Command::SelectCategory(category))
                .await
                .expect("command sends");
            wait_for(&handle, |state| {
                state.category == category && !state.loading && state.summary.is_some()
            })
            .await;
            expected.push(category.as_str().to_string());
        }

        handle
            .send(Command::SelectCategory(Category::Technology))
            .await
            .expect("command sends");
        handle.send(Command::Shutdown).await.expect("shutdown sends");
        controller_task.await.expect("controller exits cleanly");

        assert_eq!(backend.requested_categories(), expected);
        server_task.abort();
    }

    #[tokio::test]
    async fn refresh_timer_repeats_the_fetch() {
        let (base_url, backend, server_task) =
            spawn_mock_backend(Reply::Json(SAMPLE_PAYLOAD.to_string())).await;
        let (handle, controller_task) = NewsController::spawn(
            client(&base_url),
            Category::Science,
            Duration::from_millis(100),
        );

        time::timeout(Duration::from_secs(5), async {
            while backend.requested_categories().len() < 3 {
                time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("timer should keep fetching");

        handle.send(Command::Shutdown).await.expect("shutdown sends");
        controller_task.await.expect("controller exits cleanly");

        assert!(backend
            .requested_categories()
            .iter()
            .all(|category| category == "science"));
        server_task.abort();
    }

    #[tokio::test]
    async fn failed_fetch_keeps_articles_and_shows_error() {
        let (base_url, backend, server_task) =
            spawn_mock_backend(Reply::Json(SAMPLE_PAYLOAD.to_string())).await;
        let (handle, controller_task) =
            NewsController::spawn(client(&base_url), Category::General, LONG_INTERVAL);
        let before = wait_for(&handle, |state| !state.articles.is_empty()).await;

        backend.set_reply(Reply::Text("definitely not json".to_string()));
        handle.send(Command::Refresh).await.expect("refresh sends");

        let after = wait_for(&handle, |state| state.error.is_some()).await;
        assert!(!after.loading);
        assert_eq!(after.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert_eq!(after.articles, before.articles);
        assert_eq!(after.summary, before.summary);

        backend.set_reply(Reply::Json(r#"{"articles": []}"#.to_string()));
        handle.send(Command::Refresh).await.expect("refresh sends");
        let recovered = wait_for(&handle, |state| state.error.is_none() && !state.loading).await;
        assert!(recovered.articles.is_empty());
        assert!(recovered.summary.is_none());

        handle.send(Command::Shutdown).await.expect("shutdown sends");
        controller_task.await.expect("controller exits cleanly");
        server_task.abort();
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let address = listener.local_addr().expect("local addr should exist");
        drop(listener);

        let (handle, controller_task) = NewsController::spawn(
            client(&format!("http://{address}")),
            Category::Business,
            LONG_INTERVAL,
        );
        let state = wait_for(&handle, |state| state.error.is_some()).await;
        assert!(!state.loading);
        assert!(state.articles.is_empty());

        drop(handle);
        controller_task.await.expect("controller exits when handle drops");
    }

    #[tokio::test]
    async fn switching_category_mid_flight_does_not_crash() {
        let (base_url, backend, server_task) =
            spawn_mock_backend(Reply::Json(SAMPLE_PAYLOAD.to_string())).await;
        let (handle, controller_task) =
            NewsController::spawn(client(&base_url), Category::General, LONG_INTERVAL);

        handle
            .send(Command::SelectCategory(Category::Health))
            .await
            .expect("command sends");
        handle
            .send(Command::SelectCategory(Category::Sports))
            .await
            .expect("command sends");

        let state = wait_for(&handle, |state| {
            state.category == Category::Sports && !state.loading && state.summary.is_some()
        })
        .await;
        assert_eq!(state.articles.len(), 2);
        assert!(backend
            .requested_categories()
            .contains(&"sports".to_string()));

        handle.send(Command::Shutdown).await.expect("shutdown sends");
        controller_task.await.expect("controller exits cleanly");
        server_task.abort();
    }

    #[tokio::test]
    async fn late_response_for_previous_category_is_never_published() {
        let (base_url, backend, server_task) =
            spawn_mock_backend(Reply::Json(SAMPLE_PAYLOAD.to_string())).await;
        let stale_delay = Duration::from_millis(300);
        backend.set_slow_reply(
            Category::General,
            stale_delay,
            Reply::Json(
                r#"{"articles": [{"title": "Stale general story", "url": "https://example.com/stale"}]}"#
                    .to_string(),
            ),
        );

        let (handle, controller_task) =
            NewsController::spawn(client(&base_url), Category::General, LONG_INTERVAL);
        let mut published = handle.subscribe();
        let seen = tokio::spawn(async move {
            let mut titles = Vec::new();
            while published.changed().await.is_ok() {
                let state = published.borrow_and_update().clone();
                titles.extend(state.articles.into_iter().map(|article| article.title));
            }
            titles
        });

        handle
            .send(Command::SelectCategory(Category::Sports))
            .await
            .expect("command sends");
        let state = wait_for(&handle, |state| {
            state.category == Category::Sports && !state.loading && !state.articles.is_empty()
        })
        .await;
        assert_eq!(state.articles[0].title, "Chip sales climb");

        // Let the held-back general response arrive and be processed.
        time::sleep(stale_delay * 2).await;
        let state = handle.snapshot();
        assert_eq!(state.category, Category::Sports);
        assert!(!state.loading);
        assert_eq!(state.articles.len(), 2);
        let mut requested = backend.requested_categories();
        requested.sort();
        assert_eq!(requested, vec!["general".to_string(), "sports".to_string()]);

        handle.send(Command::Shutdown).await.expect("shutdown sends");
        controller_task.await.expect("controller exits cleanly");
        drop(handle);
        let titles = seen.await.expect("watcher task finishes");
        assert!(!titles.iter().any(|title| title == "Stale general story"));
        server_task.abort();
    }
}
