pub mod draw;
pub mod format;
pub mod plain;

use std::io;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::debug;

use crate::app::controller::{Command, ControllerHandle};
use crate::app::news::Category;
use crate::error::AppError;
use draw::Screen;

const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    Send(Command),
    ScrollUp,
    ScrollDown,
}

/// Owns the terminal until the user quits. Must run outside the async
/// runtime because commands are sent with `blocking_send`.
pub fn run_terminal(handle: &ControllerHandle, refresh_interval: Duration) -> Result<(), AppError> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut screen = Screen::new(refresh_interval);
    event_loop(&mut terminal, handle, &mut screen)
}

/// Raw mode and the alternate screen last exactly as long as this value,
/// including when setup fails halfway or drawing panics.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            debug!("Failed to leave raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show) {
            debug!("Failed to restore screen: {err}");
        }
    }
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    handle: &ControllerHandle,
    screen: &mut Screen,
) -> Result<(), AppError> {
    loop {
        let state = handle.snapshot();
        terminal.draw(|f| draw::draw(f, &state, screen))?;

        if !event::poll(TICK_RATE)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key_action(key, state.category) {
            Some(KeyAction::Quit) => return Ok(()),
            Some(KeyAction::Send(command)) => {
                debug!(?command, "Key command");
                if let Command::SelectCategory(category) = command {
                    if category != state.category {
                        screen.reset_scroll();
                    }
                }
                handle.blocking_send(command)?;
            }
            Some(KeyAction::ScrollUp) => screen.scroll_up(),
            Some(KeyAction::ScrollDown) => screen.scroll_down(state.articles.len()),
            None => {}
        }
    }
}

fn key_action(key: KeyEvent, current: Category) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(KeyAction::Quit);
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
            KeyAction::Send(Command::SelectCategory(current.next()))
        }
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
            KeyAction::Send(Command::SelectCategory(current.previous()))
        }
        KeyCode::Char(digit @ '1'..='7') => {
            let index = digit as usize - '1' as usize;
            KeyAction::Send(Command::SelectCategory(Category::ALL[index]))
        }
        KeyCode::Char('r') => KeyAction::Send(Command::Refresh),
        KeyCode::Down | KeyCode::Char('j') => KeyAction::ScrollDown,
        KeyCode::Up | KeyCode::Char('k') => KeyAction::ScrollUp,
        _ => return None,
    };
    Some(action)
}
